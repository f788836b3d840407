use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{error, warn};

use crate::error::StudyError;
use crate::runtime::AppEvent;
use crate::session::{Session, SessionSummary};
use crate::timer::{StartOutcome, StopOutcome, TickOutcome, TimerController, TimerMode};
use crate::util::format_hms;

const MAX_PROMPT_DIGITS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Timer,
    /// Asking for the countdown length before starting
    DurationPrompt,
    History,
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct HistoryState {
    pub summaries: Vec<SessionSummary>,
    pub selected: usize,
}

impl HistoryState {
    pub fn select_next(&mut self) {
        if self.selected + 1 < self.summaries.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_summary(&self) -> Option<&SessionSummary> {
        self.summaries.get(self.selected)
    }
}

pub struct App {
    pub controller: TimerController,
    pub state: AppState,
    pub editing_notes: bool,
    pub prompt_input: String,
    /// Countdown length pre-filled in the prompt
    pub default_minutes: u32,
    pub history: HistoryState,
    pub detail: Option<Session>,
    pub message: Option<StatusMessage>,
}

impl App {
    pub fn new(controller: TimerController, default_minutes: u32) -> Self {
        Self {
            controller,
            state: AppState::Timer,
            editing_notes: false,
            prompt_input: String::new(),
            default_minutes,
            history: HistoryState::default(),
            detail: None,
            message: None,
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Flow {
        match event {
            AppEvent::Tick => {
                self.on_tick();
                Flow::Continue
            }
            AppEvent::Resize => Flow::Continue,
            AppEvent::Key(key) => self.on_key(key),
        }
    }

    pub fn on_tick(&mut self) {
        match self.controller.tick() {
            Ok(TickOutcome::Completed(session)) => {
                self.message = Some(StatusMessage::info(format!(
                    "Countdown complete. Session of {} saved.",
                    format_hms(session.duration)
                )));
            }
            Ok(TickOutcome::Running(_)) | Ok(TickOutcome::Inactive) => {}
            Err(e) => self.report(e),
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return self.quit();
        }

        match self.state {
            AppState::Timer if self.editing_notes => {
                self.on_notes_key(key);
                Flow::Continue
            }
            AppState::Timer => self.on_timer_key(key),
            AppState::DurationPrompt => {
                self.on_prompt_key(key);
                Flow::Continue
            }
            AppState::History => {
                self.on_history_key(key);
                Flow::Continue
            }
            AppState::Detail => {
                if matches!(
                    key.code,
                    KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') | KeyCode::Char('q')
                ) {
                    self.detail = None;
                    self.state = AppState::History;
                }
                Flow::Continue
            }
        }
    }

    fn on_timer_key(&mut self, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::Char('s') => self.start(),
            KeyCode::Char('p') => {
                self.controller.pause();
            }
            KeyCode::Char('r') => {
                self.controller.resume();
            }
            KeyCode::Char('x') => self.stop(),
            KeyCode::Char('m') => self.toggle_mode(),
            KeyCode::Char('n') | KeyCode::Tab => self.editing_notes = true,
            KeyCode::Char('h') => self.open_history(),
            KeyCode::Char('q') | KeyCode::Esc => return self.quit(),
            _ => {}
        }
        Flow::Continue
    }

    fn on_notes_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Tab => self.editing_notes = false,
            KeyCode::Enter => self.controller.push_notes_char('\n'),
            KeyCode::Backspace => self.controller.pop_notes_char(),
            KeyCode::Char(c) => self.controller.push_notes_char(c),
            _ => {}
        }
    }

    fn on_prompt_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if self.prompt_input.len() < MAX_PROMPT_DIGITS {
                    self.prompt_input.push(c);
                }
            }
            KeyCode::Backspace => {
                self.prompt_input.pop();
            }
            KeyCode::Enter => self.confirm_prompt(),
            KeyCode::Esc => self.cancel_prompt(),
            _ => {}
        }
    }

    fn on_history_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.history.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.history.select_next(),
            KeyCode::Home => self.history.selected = 0,
            KeyCode::Enter => self.open_detail(),
            KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('q') => {
                self.state = AppState::Timer;
            }
            _ => {}
        }
    }

    fn start(&mut self) {
        match self.controller.mode() {
            TimerMode::Stopwatch => {
                if let Err(e) = self.controller.start(None) {
                    self.report(e);
                }
            }
            TimerMode::Countdown => {
                if self.controller.state().is_open() {
                    return;
                }
                self.prompt_input = self.default_minutes.to_string();
                self.state = AppState::DurationPrompt;
            }
        }
    }

    fn confirm_prompt(&mut self) {
        let minutes = match self.prompt_input.parse::<u32>() {
            Ok(m) => m,
            Err(_) => {
                self.message = Some(StatusMessage::error("Enter a whole number of minutes."));
                return;
            }
        };

        match self.controller.start(Some(minutes)) {
            Ok(_) => {
                self.message = None;
                self.state = AppState::Timer;
            }
            // Stay on the prompt so the user can correct the value
            Err(e @ StudyError::InvalidDuration { .. }) => {
                self.message = Some(StatusMessage::error(e.to_string()));
            }
            Err(e) => {
                self.report(e);
                self.state = AppState::Timer;
            }
        }
    }

    fn cancel_prompt(&mut self) {
        if let Ok(StartOutcome::Cancelled) = self.controller.start(None) {
            self.message = None;
        }
        self.prompt_input.clear();
        self.state = AppState::Timer;
    }

    fn stop(&mut self) {
        match self.controller.stop() {
            Ok(StopOutcome::Saved(session)) => {
                self.message = Some(StatusMessage::info(format!(
                    "Session of {} saved.",
                    format_hms(session.duration)
                )));
            }
            Ok(StopOutcome::NothingToStop) => {
                self.message = Some(StatusMessage::info("No active session to stop."));
            }
            Err(e) => self.report(e),
        }
    }

    fn toggle_mode(&mut self) {
        let next = self.controller.mode().toggled();
        match self.controller.set_mode(next) {
            Ok(Some(session)) => {
                self.message = Some(StatusMessage::info(format!(
                    "Switched to {next}. Session of {} saved.",
                    format_hms(session.duration)
                )));
            }
            Ok(None) => {
                self.message = Some(StatusMessage::info(format!("Switched to {next}.")));
            }
            Err(e) => self.report(e),
        }
    }

    pub fn open_history(&mut self) {
        match self.controller.store().list_summaries() {
            Ok(summaries) => {
                self.history = HistoryState {
                    summaries,
                    selected: 0,
                };
                self.state = AppState::History;
            }
            Err(e) => self.report(e),
        }
    }

    fn open_detail(&mut self) {
        let Some(id) = self.history.selected_summary().map(|s| s.id) else {
            return;
        };

        match self.controller.store().get(id) {
            Ok(Some(session)) => {
                self.detail = Some(session);
                self.state = AppState::Detail;
            }
            Ok(None) => {
                self.message = Some(StatusMessage::error(format!("Session {id} not found.")));
            }
            Err(e) => self.report(e),
        }
    }

    fn quit(&mut self) -> Flow {
        if self.controller.state().is_open() {
            warn!(
                "discarding open session ({:.1}s) on quit",
                self.controller.reading().elapsed_secs
            );
        }
        Flow::Quit
    }

    fn report(&mut self, e: StudyError) {
        error!("{e}");
        self.message = Some(StatusMessage::error(format!("Error: {e}")));
    }
}
