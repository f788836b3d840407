use directories::ProjectDirs;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, StudyError};
use crate::timer::{DurationLimits, TimerMode};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub default_mode: TimerMode,
    /// Value offered in the countdown length prompt
    pub countdown_minutes: u32,
    pub min_countdown_minutes: u32,
    pub max_countdown_minutes: u32,
    pub tick_rate_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_mode: TimerMode::Stopwatch,
            countdown_minutes: 25,
            min_countdown_minutes: 1,
            max_countdown_minutes: 180,
            tick_rate_ms: 200,
        }
    }
}

impl Config {
    pub fn limits(&self) -> DurationLimits {
        DurationLimits {
            min_minutes: self.min_countdown_minutes,
            max_minutes: self.max_countdown_minutes,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_countdown_minutes == 0 {
            return Err(StudyError::Config(
                "min_countdown_minutes must be at least 1".into(),
            ));
        }
        if self.min_countdown_minutes > self.max_countdown_minutes {
            return Err(StudyError::Config(format!(
                "min_countdown_minutes ({}) exceeds max_countdown_minutes ({})",
                self.min_countdown_minutes, self.max_countdown_minutes
            )));
        }
        if self.limits().check(self.countdown_minutes).is_err() {
            return Err(StudyError::Config(format!(
                "countdown_minutes ({}) must be between {} and {}",
                self.countdown_minutes, self.min_countdown_minutes, self.max_countdown_minutes
            )));
        }
        if self.tick_rate_ms == 0 {
            return Err(StudyError::Config("tick_rate_ms must be positive".into()));
        }
        Ok(())
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "studytrack") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("studytrack_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => warn!("ignoring unreadable config {}: {e}", self.path.display()),
            }
        }
        Config::default()
    }
}
