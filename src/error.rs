use std::io;
use thiserror::Error;

/// Errors surfaced by the timer, the session store and the surrounding plumbing
#[derive(Error, Debug)]
pub enum StudyError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Countdown length must be between {min} and {max} minutes (got {minutes})")]
    InvalidDuration { minutes: u32, min: u32, max: u32 },

    #[error("Invalid timestamp: {0}")]
    Timestamp(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, StudyError>;
