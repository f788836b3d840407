use std::cell::Cell;
use std::rc::Rc;

use chrono::{Local, NaiveDateTime, TimeDelta};

/// Source of the current local wall-clock time
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Production clock reading the local time zone, with the zone dropped
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Hand-driven clock for tests; clones share the same instant
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Rc<Cell<NaiveDateTime>>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Move the clock by a (possibly fractional) number of seconds
    pub fn advance_secs(&self, secs: f64) {
        let micros = (secs * 1_000_000.0).round() as i64;
        self.now.set(self.now.get() + TimeDelta::microseconds(micros));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}

/// Seconds from `from` to `to`, never negative
pub fn secs_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    let delta = to - from;
    let secs = match delta.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => delta.num_milliseconds() as f64 / 1000.0,
    };
    secs.max(0.0)
}
