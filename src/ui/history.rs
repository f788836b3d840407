use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::app::App;
use crate::session::{display_timestamp, SessionSummary};
use crate::ui::message_line;
use crate::util::{format_hms, total_secs};

/// Pure presenter for a single history row
pub fn present_row(summary: &SessionSummary) -> Row<'static> {
    Row::new(vec![
        Cell::from(summary.id.to_string()).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(display_timestamp(&summary.start_time)),
        Cell::from(format_hms(summary.duration)),
    ])
}

/// Render the session history screen
pub fn render_history(app: &App, f: &mut Frame) {
    let summaries = &app.history.summaries;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Table
            Constraint::Length(1), // Message
            Constraint::Length(1), // Instructions
        ])
        .split(f.area());

    let total = total_secs(summaries.iter().map(|s| s.duration));
    let title = Paragraph::new(format!(
        "Total study time: {}  ({} sessions)",
        format_hms(total),
        summaries.len()
    ))
    .block(Block::default().borders(Borders::ALL).title("History"))
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    if summaries.is_empty() {
        let no_data = Paragraph::new("No sessions recorded yet.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(no_data, chunks[1]);
    } else {
        let header = Row::new(vec![
            Cell::from("ID"),
            Cell::from("Started"),
            Cell::from("Duration"),
        ])
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let widths = [
            Constraint::Length(8),
            Constraint::Length(21),
            Constraint::Min(10),
        ];

        let table = Table::new(summaries.iter().map(present_row), widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("Sessions"))
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ")
            .column_spacing(2);

        let mut state = TableState::default().with_selected(Some(app.history.selected));
        f.render_stateful_widget(table, chunks[1], &mut state);
    }

    f.render_widget(message_line(app.message.as_ref()), chunks[2]);

    let instructions = Paragraph::new("(↑/↓) select  (enter) details  (esc/b) back")
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::DIM));
    f.render_widget(instructions, chunks[3]);
}

/// Render the full record of one session
pub fn render_detail(app: &App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(6), // Fields
            Constraint::Min(3),    // Notes
            Constraint::Length(1), // Instructions
        ])
        .split(f.area());

    let Some(session) = app.detail.as_ref() else {
        f.render_widget(
            Paragraph::new("No session selected.").alignment(Alignment::Center),
            chunks[0],
        );
        return;
    };

    let label = Style::default().fg(Color::Yellow);
    let field = |name: &'static str, value: String| {
        Line::from(vec![Span::styled(format!("{name:<10}"), label), Span::raw(value)])
    };

    let fields = Paragraph::new(vec![
        field("Started", display_timestamp(&session.start_time)),
        field("Ended", display_timestamp(&session.end_time)),
        field(
            "Duration",
            format!("{} ({:.1}s)", format_hms(session.duration), session.duration),
        ),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Session {}", session.id)),
    );
    f.render_widget(fields, chunks[0]);

    let notes = if session.notes.is_empty() {
        Paragraph::new(Span::styled(
            "(no notes)",
            Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
        ))
    } else {
        Paragraph::new(session.notes.as_str()).wrap(Wrap { trim: false })
    };
    f.render_widget(
        notes.block(Block::default().borders(Borders::ALL).title("Notes")),
        chunks[1],
    );

    let instructions = Paragraph::new("(esc/b) back")
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::DIM));
    f.render_widget(instructions, chunks[2]);
}
