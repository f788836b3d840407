use ratatui::Frame;

use crate::app::{App, AppState};
use crate::ui::history::{render_detail, render_history};
use crate::ui::render_duration_prompt;

/// A UI Screen boundary: responsible for rendering one app state
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Timer screen - renders the App widget
pub struct TimerScreen;

impl Screen for TimerScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

pub struct DurationPromptScreen;

impl Screen for DurationPromptScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_duration_prompt(app, f);
    }
}

pub struct HistoryScreen;

impl Screen for HistoryScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_history(app, f);
    }
}

pub struct DetailScreen;

impl Screen for DetailScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_detail(app, f);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Timer => Box::new(TimerScreen),
        AppState::DurationPrompt => Box::new(DurationPromptScreen),
        AppState::History => Box::new(HistoryScreen),
        AppState::Detail => Box::new(DetailScreen),
    }
}
