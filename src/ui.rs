pub mod history;
pub mod notes;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Widget},
    Frame,
};

use crate::app::{App, MessageKind, StatusMessage};
use crate::timer::{TimerMode, TimerStatus};
use crate::util::format_hms;

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

/// Draw whichever screen the app is on
pub fn draw(app: &App, f: &mut Frame) {
    screen::current_screen(&app.state).render(app, f);
}

fn status_label(status: TimerStatus) -> Span<'static> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match status {
        TimerStatus::Idle => Span::styled("IDLE", bold.fg(Color::Gray)),
        TimerStatus::Running => Span::styled("RUNNING", bold.fg(Color::Green)),
        TimerStatus::Paused => Span::styled("PAUSED", bold.fg(Color::Yellow)),
    }
}

fn legend(app: &App) -> &'static str {
    if app.editing_notes {
        return "(enter) newline  (backspace) delete  (esc/tab) done";
    }
    match app.controller.status() {
        TimerStatus::Idle => "(s) start  (m) mode  (n) notes  (h) history  (q) quit",
        TimerStatus::Running => "(p) pause  (x) stop  (m) mode  (n) notes  (q) quit",
        TimerStatus::Paused => "(r) resume  (x) stop  (m) mode  (n) notes  (q) quit",
    }
}

pub(crate) fn message_line(message: Option<&StatusMessage>) -> Paragraph<'static> {
    let Some(msg) = message else {
        return Paragraph::new("");
    };
    let style = match msg.kind {
        MessageKind::Info => Style::default().fg(Color::Cyan),
        MessageKind::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    };
    Paragraph::new(Span::styled(msg.text.clone(), style)).alignment(Alignment::Center)
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let controller = &self.controller;
        let reading = controller.reading();
        let status = controller.status();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // mode + status
                Constraint::Length(3), // clock
                Constraint::Length(1), // countdown progress
                Constraint::Min(3),    // notes
                Constraint::Length(1), // message
                Constraint::Length(1), // legend
            ])
            .split(area);

        let header = Line::from(vec![
            Span::styled(
                controller.mode().to_string().to_uppercase(),
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  ·  "),
            status_label(status),
        ]);
        Paragraph::new(header)
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        let clock_style = match status {
            TimerStatus::Running => Style::default().add_modifier(Modifier::BOLD),
            _ => Style::default()
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::DIM),
        };
        Paragraph::new(Span::styled(format_hms(reading.display_secs()), clock_style))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL))
            .render(chunks[1], buf);

        if controller.mode() == TimerMode::Countdown {
            let target = controller.state().target_secs;
            if target > 0.0 {
                let ratio = (reading.elapsed_secs / target).clamp(0.0, 1.0);
                Gauge::default()
                    .gauge_style(Style::default().fg(Color::Green))
                    .ratio(ratio)
                    .label(format!("of {}", format_hms(target)))
                    .render(chunks[2], buf);
            } else {
                Paragraph::new("press (s) to choose a length")
                    .alignment(Alignment::Center)
                    .style(Style::default().add_modifier(Modifier::ITALIC))
                    .render(chunks[2], buf);
            }
        }

        let notes_block = Block::default()
            .borders(Borders::ALL)
            .title("Notes")
            .border_style(if self.editing_notes {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            });
        let inner = notes_block.inner(chunks[3]);
        notes_block.render(chunks[3], buf);

        // Leave a column for the cursor
        let wrapped = notes::wrap_lines(controller.notes(), inner.width.saturating_sub(1).into());
        let visible = notes::tail(&wrapped, inner.height.into());
        let last = visible.len().saturating_sub(1);
        let lines: Vec<Line> = visible
            .iter()
            .enumerate()
            .map(|(i, l)| {
                let mut spans = vec![Span::raw(l.clone())];
                if self.editing_notes && i == last {
                    spans.push(Span::styled(
                        " ",
                        Style::default().add_modifier(Modifier::REVERSED),
                    ));
                }
                Line::from(spans)
            })
            .collect();
        Paragraph::new(lines).render(inner, buf);

        message_line(self.message.as_ref()).render(chunks[4], buf);

        Paragraph::new(legend(self))
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::DIM))
            .render(chunks[5], buf);
    }
}

/// Countdown length prompt drawn over the timer screen
pub fn render_duration_prompt(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());

    let limits = app.controller.limits();
    let popup = centered_rect(44, 6, f.area());
    let text = vec![
        Line::from(format!(
            "Minutes ({}-{}):",
            limits.min_minutes, limits.max_minutes
        )),
        Line::from(vec![
            Span::styled(
                app.prompt_input.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(" ", Style::default().add_modifier(Modifier::REVERSED)),
        ]),
        Line::from(Span::styled(
            "(enter) start  (esc) cancel",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Countdown length")
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        popup,
    );
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
