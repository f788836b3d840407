//! Session timing: the Idle / Running / Paused state machine for stopwatch
//! and countdown sessions, plus the hand-off of finished sessions to the store.

use chrono::NaiveDateTime;
use clap::ValueEnum;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::clock::{secs_between, Clock};
use crate::error::{Result, StudyError};
use crate::session::{NewSession, Session};
use crate::store::SessionStore;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TimerMode {
    #[default]
    Stopwatch,
    Countdown,
}

impl TimerMode {
    pub fn toggled(self) -> Self {
        match self {
            TimerMode::Stopwatch => TimerMode::Countdown,
            TimerMode::Countdown => TimerMode::Stopwatch,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
}

/// Allowed countdown lengths in whole minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationLimits {
    pub min_minutes: u32,
    pub max_minutes: u32,
}

impl Default for DurationLimits {
    fn default() -> Self {
        Self {
            min_minutes: 1,
            max_minutes: 180,
        }
    }
}

impl DurationLimits {
    pub fn check(&self, minutes: u32) -> Result<u32> {
        if minutes < self.min_minutes || minutes > self.max_minutes {
            return Err(StudyError::InvalidDuration {
                minutes,
                min: self.min_minutes,
                max: self.max_minutes,
            });
        }
        Ok(minutes)
    }
}

/// Transient state of the session being timed; never persisted
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimerState {
    pub mode: TimerMode,
    pub running: bool,
    /// Start of the current run segment; `None` unless running
    pub segment_start: Option<NaiveDateTime>,
    /// First Start of the open session
    pub session_start: Option<NaiveDateTime>,
    /// Running time from earlier segments of the open session
    pub accumulated_secs: f64,
    pub target_secs: f64,
}

impl TimerState {
    pub fn status(&self) -> TimerStatus {
        if self.running {
            TimerStatus::Running
        } else if self.session_start.is_some() || self.accumulated_secs > 0.0 {
            TimerStatus::Paused
        } else {
            TimerStatus::Idle
        }
    }

    pub fn is_open(&self) -> bool {
        self.status() != TimerStatus::Idle
    }

    /// Accumulated time plus the live segment, if any
    pub fn elapsed_at(&self, now: NaiveDateTime) -> f64 {
        let live = match (self.running, self.segment_start) {
            (true, Some(start)) => secs_between(start, now),
            _ => 0.0,
        };
        self.accumulated_secs + live
    }

    pub fn remaining_at(&self, now: NaiveDateTime) -> Option<f64> {
        match self.mode {
            TimerMode::Countdown => Some((self.target_secs - self.elapsed_at(now)).max(0.0)),
            TimerMode::Stopwatch => None,
        }
    }

    /// Duration to record for a Stop at `now`; a countdown that reached its
    /// target records the target, not the polled elapsed time
    pub fn recorded_duration_at(&self, now: NaiveDateTime) -> f64 {
        let total = self.elapsed_at(now);
        if self.mode == TimerMode::Countdown && total >= self.target_secs {
            self.target_secs
        } else {
            total
        }
    }

    fn reset(&mut self) {
        *self = Self {
            mode: self.mode,
            ..Self::default()
        };
    }
}

/// Snapshot of the displayed time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub mode: TimerMode,
    pub elapsed_secs: f64,
    /// `Some` in countdown mode
    pub remaining_secs: Option<f64>,
}

impl Reading {
    /// Elapsed for a stopwatch, remaining for a countdown
    pub fn display_secs(&self) -> f64 {
        self.remaining_secs.unwrap_or(self.elapsed_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// The countdown length prompt was dismissed
    Cancelled,
    /// A session is already open
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StopOutcome {
    Saved(Session),
    NothingToStop,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Not running; nothing to refresh
    Inactive,
    Running(Reading),
    /// The countdown hit zero and the session was saved
    Completed(Session),
}

/// Owns the open session, the notes buffer, the clock and the session store
pub struct TimerController {
    state: TimerState,
    notes: String,
    limits: DurationLimits,
    /// Set when saving a finished countdown failed; ticks stop retrying
    /// until the user stops the session
    completion_failed: bool,
    clock: Box<dyn Clock>,
    store: Box<dyn SessionStore>,
}

impl TimerController {
    pub fn new(
        mode: TimerMode,
        limits: DurationLimits,
        clock: Box<dyn Clock>,
        store: Box<dyn SessionStore>,
    ) -> Self {
        Self {
            state: TimerState {
                mode,
                ..TimerState::default()
            },
            notes: String::new(),
            limits,
            completion_failed: false,
            clock,
            store,
        }
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn status(&self) -> TimerStatus {
        self.state.status()
    }

    pub fn mode(&self) -> TimerMode {
        self.state.mode
    }

    pub fn limits(&self) -> DurationLimits {
        self.limits
    }

    pub fn store(&self) -> &dyn SessionStore {
        self.store.as_ref()
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn push_notes_char(&mut self, c: char) {
        self.notes.push(c);
    }

    pub fn pop_notes_char(&mut self) {
        self.notes.pop();
    }

    pub fn reading(&self) -> Reading {
        let now = self.clock.now();
        Reading {
            mode: self.state.mode,
            elapsed_secs: self.state.elapsed_at(now),
            remaining_secs: self.state.remaining_at(now),
        }
    }

    /// Begin a session. `minutes` is the answer to the countdown length
    /// prompt (`None` when dismissed) and is ignored for a stopwatch.
    pub fn start(&mut self, minutes: Option<u32>) -> Result<StartOutcome> {
        if self.state.is_open() {
            return Ok(StartOutcome::Ignored);
        }

        let target_secs = match self.state.mode {
            TimerMode::Stopwatch => 0.0,
            TimerMode::Countdown => match minutes {
                None => {
                    debug!("countdown start cancelled");
                    return Ok(StartOutcome::Cancelled);
                }
                Some(m) => f64::from(self.limits.check(m)?) * 60.0,
            },
        };

        let now = self.clock.now();
        self.state = TimerState {
            mode: self.state.mode,
            running: true,
            segment_start: Some(now),
            session_start: Some(now),
            accumulated_secs: 0.0,
            target_secs,
        };

        info!("{} session started", self.state.mode);
        Ok(StartOutcome::Started)
    }

    pub fn pause(&mut self) -> Transition {
        if self.state.status() != TimerStatus::Running {
            return Transition::Ignored;
        }

        let now = self.clock.now();
        self.state.accumulated_secs = self.state.elapsed_at(now);
        self.state.segment_start = None;
        self.state.running = false;

        debug!("paused at {:.1}s", self.state.accumulated_secs);
        Transition::Applied
    }

    pub fn resume(&mut self) -> Transition {
        if self.state.status() != TimerStatus::Paused {
            return Transition::Ignored;
        }

        self.state.segment_start = Some(self.clock.now());
        self.state.running = true;

        debug!("resumed at {:.1}s", self.state.accumulated_secs);
        Transition::Applied
    }

    /// Finalize the open session and write it to the store. On a store
    /// failure the session stays open and the error is returned.
    pub fn stop(&mut self) -> Result<StopOutcome> {
        if !self.state.is_open() {
            return Ok(StopOutcome::NothingToStop);
        }

        let now = self.clock.now();
        let start_time = self.state.session_start.unwrap_or(now);
        let new_session = NewSession {
            start_time,
            end_time: now.max(start_time),
            duration: self.state.recorded_duration_at(now),
            notes: self.notes.trim().to_string(),
        };

        let id = self.store.insert(&new_session)?;
        let session = new_session.with_id(id);

        self.state.reset();
        self.notes.clear();
        self.completion_failed = false;

        info!("session {} saved ({:.1}s)", session.id, session.duration);
        Ok(StopOutcome::Saved(session))
    }

    /// Periodic refresh; a countdown reaching zero stops itself here. If
    /// that save fails the error is returned once and the session stays
    /// open for a manual Stop.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        if self.state.status() != TimerStatus::Running || self.completion_failed {
            return Ok(TickOutcome::Inactive);
        }

        let reading = self.reading();
        if reading.remaining_secs.is_some_and(|r| r <= 0.0) {
            let stopped = match self.stop() {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("countdown finished but could not be saved; waiting for manual stop");
                    self.completion_failed = true;
                    return Err(e);
                }
            };
            return match stopped {
                StopOutcome::Saved(session) => {
                    info!("countdown completed");
                    Ok(TickOutcome::Completed(session))
                }
                StopOutcome::NothingToStop => Ok(TickOutcome::Inactive),
            };
        }

        Ok(TickOutcome::Running(reading))
    }

    /// Switch between stopwatch and countdown. An open session is stopped
    /// and saved first; the saved session is returned.
    pub fn set_mode(&mut self, mode: TimerMode) -> Result<Option<Session>> {
        if mode == self.state.mode {
            return Ok(None);
        }

        let saved = match self.stop()? {
            StopOutcome::Saved(session) => Some(session),
            StopOutcome::NothingToStop => None,
        };

        self.state.mode = mode;
        self.state.target_secs = 0.0;

        info!("mode set to {mode}");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::SqliteSessionStore;
    use assert_matches::assert_matches;
    use chrono::{NaiveDate, TimeDelta};

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn controller(mode: TimerMode) -> (TimerController, ManualClock) {
        let clock = ManualClock::new(t0());
        let store = SqliteSessionStore::open_in_memory().unwrap();
        let ctl = TimerController::new(
            mode,
            DurationLimits::default(),
            Box::new(clock.clone()),
            Box::new(store),
        );
        (ctl, clock)
    }

    #[test]
    fn test_starts_idle() {
        let (ctl, _) = controller(TimerMode::Stopwatch);
        assert_eq!(ctl.status(), TimerStatus::Idle);
        assert_eq!(ctl.reading().display_secs(), 0.0);
    }

    #[test]
    fn test_pause_and_resume_are_ignored_when_not_applicable() {
        let (mut ctl, _) = controller(TimerMode::Stopwatch);
        assert_eq!(ctl.pause(), Transition::Ignored);
        assert_eq!(ctl.resume(), Transition::Ignored);

        ctl.start(None).unwrap();
        assert_eq!(ctl.resume(), Transition::Ignored);
        assert_eq!(ctl.pause(), Transition::Applied);
        assert_eq!(ctl.pause(), Transition::Ignored);
    }

    #[test]
    fn test_start_is_ignored_while_open() {
        let (mut ctl, clock) = controller(TimerMode::Stopwatch);
        ctl.start(None).unwrap();
        clock.advance_secs(5.0);
        assert_eq!(ctl.start(None).unwrap(), StartOutcome::Ignored);
        assert_eq!(ctl.state().session_start, Some(t0()));

        ctl.pause();
        assert_eq!(ctl.start(None).unwrap(), StartOutcome::Ignored);
        assert_eq!(ctl.status(), TimerStatus::Paused);
    }

    #[test]
    fn test_countdown_start_cancelled_leaves_idle() {
        let (mut ctl, _) = controller(TimerMode::Countdown);
        assert_eq!(ctl.start(None).unwrap(), StartOutcome::Cancelled);
        assert_eq!(ctl.status(), TimerStatus::Idle);
        assert_eq!(ctl.state().target_secs, 0.0);
    }

    #[test]
    fn test_countdown_minutes_out_of_range() {
        let (mut ctl, _) = controller(TimerMode::Countdown);
        assert_matches!(
            ctl.start(Some(0)),
            Err(StudyError::InvalidDuration { minutes: 0, min: 1, max: 180 })
        );
        assert_matches!(ctl.start(Some(181)), Err(StudyError::InvalidDuration { .. }));
        assert_eq!(ctl.status(), TimerStatus::Idle);
    }

    #[test]
    fn test_countdown_sets_target() {
        let (mut ctl, clock) = controller(TimerMode::Countdown);
        ctl.start(Some(25)).unwrap();
        assert_eq!(ctl.state().target_secs, 1500.0);

        clock.advance_secs(100.0);
        let reading = ctl.reading();
        assert_eq!(reading.elapsed_secs, 100.0);
        assert_eq!(reading.remaining_secs, Some(1400.0));
        assert_eq!(reading.display_secs(), 1400.0);
    }

    #[test]
    fn test_pause_excludes_paused_time() {
        let (mut ctl, clock) = controller(TimerMode::Stopwatch);
        ctl.start(None).unwrap();
        clock.advance_secs(10.0);
        ctl.pause();
        clock.advance_secs(3600.0);
        assert_eq!(ctl.reading().elapsed_secs, 10.0);
        ctl.resume();
        clock.advance_secs(5.0);
        assert_eq!(ctl.reading().elapsed_secs, 15.0);
    }

    #[test]
    fn test_stop_pause_resume_scenario() {
        let (mut ctl, clock) = controller(TimerMode::Stopwatch);
        ctl.start(None).unwrap();
        clock.advance_secs(10.0);
        ctl.pause();
        clock.advance_secs(10.0);
        ctl.resume();
        clock.advance_secs(5.0);

        let session = match ctl.stop().unwrap() {
            StopOutcome::Saved(s) => s,
            other => panic!("expected a saved session, got {other:?}"),
        };
        assert_eq!(session.duration, 15.0);
        assert_eq!(session.start_time, t0());
        assert_eq!(session.end_time, t0() + TimeDelta::seconds(25));
        assert_eq!(ctl.status(), TimerStatus::Idle);
    }

    #[test]
    fn test_stop_while_paused_uses_accumulated() {
        let (mut ctl, clock) = controller(TimerMode::Stopwatch);
        ctl.start(None).unwrap();
        clock.advance_secs(42.0);
        ctl.pause();
        clock.advance_secs(600.0);

        assert_matches!(ctl.stop().unwrap(), StopOutcome::Saved(s) if s.duration == 42.0);
    }

    #[test]
    fn test_stop_with_nothing_open() {
        let (mut ctl, _) = controller(TimerMode::Stopwatch);
        assert_eq!(ctl.stop().unwrap(), StopOutcome::NothingToStop);
        assert!(ctl.store().list_summaries().unwrap().is_empty());
    }

    #[test]
    fn test_immediate_stop_records_zero_length_session() {
        let (mut ctl, _) = controller(TimerMode::Stopwatch);
        ctl.start(None).unwrap();
        assert_matches!(ctl.stop().unwrap(), StopOutcome::Saved(s) if s.duration == 0.0);
        assert_eq!(ctl.store().list_summaries().unwrap().len(), 1);
    }

    #[test]
    fn test_stop_trims_and_clears_notes() {
        let (mut ctl, clock) = controller(TimerMode::Stopwatch);
        ctl.start(None).unwrap();
        ctl.set_notes("  \n read ch. 4\n\n  solved 3 problems \n ");
        clock.advance_secs(1.0);

        let session = match ctl.stop().unwrap() {
            StopOutcome::Saved(s) => s,
            other => panic!("expected a saved session, got {other:?}"),
        };
        assert_eq!(session.notes, "read ch. 4\n\n  solved 3 problems");
        assert_eq!(ctl.notes(), "");
    }

    #[test]
    fn test_countdown_tick_auto_completes_at_target() {
        let (mut ctl, clock) = controller(TimerMode::Countdown);
        ctl.start(Some(1)).unwrap();

        let mut completed = None;
        for _ in 0..400 {
            clock.advance_secs(0.2);
            match ctl.tick().unwrap() {
                TickOutcome::Running(r) => assert!(r.remaining_secs.unwrap() > 0.0),
                TickOutcome::Completed(s) => {
                    completed = Some(s);
                    break;
                }
                TickOutcome::Inactive => panic!("tick went inactive before completion"),
            }
        }

        let session = completed.expect("countdown should complete");
        assert_eq!(session.duration, 60.0);
        assert_eq!(ctl.status(), TimerStatus::Idle);
        assert_eq!(ctl.tick().unwrap(), TickOutcome::Inactive);
    }

    #[test]
    fn test_countdown_late_tick_still_records_target() {
        let (mut ctl, clock) = controller(TimerMode::Countdown);
        ctl.start(Some(1)).unwrap();
        clock.advance_secs(60.15);

        assert_matches!(ctl.tick().unwrap(), TickOutcome::Completed(s) if s.duration == 60.0);
    }

    #[test]
    fn test_countdown_manual_stop_after_target_is_clamped() {
        let (mut ctl, clock) = controller(TimerMode::Countdown);
        ctl.start(Some(1)).unwrap();
        clock.advance_secs(75.0);
        assert_matches!(ctl.stop().unwrap(), StopOutcome::Saved(s) if s.duration == 60.0);
    }

    #[test]
    fn test_countdown_early_stop_records_elapsed() {
        let (mut ctl, clock) = controller(TimerMode::Countdown);
        ctl.start(Some(2)).unwrap();
        clock.advance_secs(30.5);
        assert_matches!(ctl.stop().unwrap(), StopOutcome::Saved(s) if s.duration == 30.5);
    }

    #[test]
    fn test_tick_is_inactive_while_paused() {
        let (mut ctl, clock) = controller(TimerMode::Countdown);
        ctl.start(Some(1)).unwrap();
        ctl.pause();
        clock.advance_secs(120.0);
        assert_eq!(ctl.tick().unwrap(), TickOutcome::Inactive);
        assert_eq!(ctl.status(), TimerStatus::Paused);
    }

    #[test]
    fn test_mode_change_saves_open_session() {
        let (mut ctl, clock) = controller(TimerMode::Stopwatch);
        ctl.start(None).unwrap();
        clock.advance_secs(12.0);

        let saved = ctl.set_mode(TimerMode::Countdown).unwrap();
        assert_matches!(saved, Some(s) if s.duration == 12.0);
        assert_eq!(ctl.mode(), TimerMode::Countdown);
        assert_eq!(ctl.status(), TimerStatus::Idle);
        assert_eq!(ctl.reading().display_secs(), 0.0);
        assert_eq!(ctl.store().list_summaries().unwrap().len(), 1);
    }

    #[test]
    fn test_mode_change_when_idle_saves_nothing() {
        let (mut ctl, _) = controller(TimerMode::Countdown);
        assert_eq!(ctl.set_mode(TimerMode::Stopwatch).unwrap(), None);
        assert_eq!(ctl.mode(), TimerMode::Stopwatch);
        assert!(ctl.store().list_summaries().unwrap().is_empty());
    }

    #[test]
    fn test_same_mode_is_a_no_op() {
        let (mut ctl, clock) = controller(TimerMode::Stopwatch);
        ctl.start(None).unwrap();
        clock.advance_secs(3.0);
        assert_eq!(ctl.set_mode(TimerMode::Stopwatch).unwrap(), None);
        assert_eq!(ctl.status(), TimerStatus::Running);
    }

    #[test]
    fn test_clock_stepping_backwards_never_reduces_elapsed() {
        let (mut ctl, clock) = controller(TimerMode::Stopwatch);
        ctl.start(None).unwrap();
        clock.advance_secs(8.0);
        ctl.pause();
        ctl.resume();
        clock.advance_secs(-3600.0);
        assert_eq!(ctl.reading().elapsed_secs, 8.0);
    }

    #[test]
    fn test_clock_stepping_backwards_keeps_end_after_start() {
        let (mut ctl, clock) = controller(TimerMode::Stopwatch);
        ctl.start(None).unwrap();
        clock.advance_secs(-3600.0);

        let session = match ctl.stop().unwrap() {
            StopOutcome::Saved(s) => s,
            other => panic!("expected a saved session, got {other:?}"),
        };
        assert_eq!(session.start_time, t0());
        assert!(session.end_time >= session.start_time);
        assert_eq!(session.duration, 0.0);
    }

    #[test]
    fn test_mode_display_and_toggle() {
        assert_eq!(TimerMode::Stopwatch.to_string(), "stopwatch");
        assert_eq!(TimerMode::Countdown.to_string(), "countdown");
        assert_eq!(TimerMode::Stopwatch.toggled(), TimerMode::Countdown);
    }
}
