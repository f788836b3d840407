//! File-backed logging. The TUI owns the terminal, so records go to a file
//! instead of stderr. The level is read from `STUDYTRACK_LOG` (default `info`).

use env_logger::{Builder, Env, Target};
use std::fs::{self, OpenOptions};
use std::path::Path;

use crate::error::Result;

pub const LOG_ENV: &str = "STUDYTRACK_LOG";

pub fn init(log_path: &Path) -> Result<()> {
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    // A logger may already be installed (e.g. by a test harness)
    let _ = Builder::from_env(Env::default().filter_or(LOG_ENV, "info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init();

    Ok(())
}
