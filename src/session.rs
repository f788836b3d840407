use chrono::NaiveDateTime;

use crate::error::{Result, StudyError};

/// Format used when writing timestamps to storage
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

// Accepts both our fixed-width form and isoformat() output without a fraction
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A completed study session as stored on disk
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: i64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub duration: f64,
    pub notes: String,
}

/// A finalized session that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewSession {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub duration: f64,
    pub notes: String,
}

impl NewSession {
    pub fn with_id(self, id: i64) -> Session {
        Session {
            id,
            start_time: self.start_time,
            end_time: self.end_time,
            duration: self.duration,
            notes: self.notes,
        }
    }
}

/// One line of the history list
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub id: i64,
    pub start_time: NaiveDateTime,
    pub duration: f64,
}

impl From<&Session> for SessionSummary {
    fn from(s: &Session) -> Self {
        Self {
            id: s.id,
            start_time: s.start_time,
            duration: s.duration,
        }
    }
}

pub fn format_timestamp(at: &NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Second-resolution form for people to read
pub fn display_timestamp(at: &NaiveDateTime) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_PARSE_FORMAT)
        .map_err(|e| StudyError::Timestamp(format!("{raw}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parses_our_own_format() {
        let at = NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_micro_opt(14, 30, 1, 250_000)
            .unwrap();
        let raw = format_timestamp(&at);
        assert_eq!(raw, "2024-05-06T14:30:01.250000");
        assert_eq!(parse_timestamp(&raw).unwrap(), at);
    }

    #[test]
    fn parses_isoformat_without_fraction() {
        let at = parse_timestamp("2023-11-02T08:15:00").unwrap();
        assert_eq!(at.format("%H:%M:%S").to_string(), "08:15:00");
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(StudyError::Timestamp(_))
        ));
    }
}
