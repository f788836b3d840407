use log::info;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::session::{format_timestamp, Session};
use crate::store::SessionStore;

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    id: i64,
    start_time: String,
    end_time: String,
    duration_secs: f64,
    notes: &'a str,
}

impl<'a> From<&'a Session> for CsvRow<'a> {
    fn from(s: &'a Session) -> Self {
        Self {
            id: s.id,
            start_time: format_timestamp(&s.start_time),
            end_time: format_timestamp(&s.end_time),
            duration_secs: s.duration,
            notes: &s.notes,
        }
    }
}

const HEADER: [&str; 5] = ["id", "start_time", "end_time", "duration_secs", "notes"];

/// Write sessions as CSV; the header row is written even when there are none
pub fn write_csv<W: Write>(sessions: &[Session], out: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);
    wtr.write_record(HEADER)?;
    for session in sessions {
        wtr.serialize(CsvRow::from(session))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Export every stored session to `path`; returns the number of rows written
pub fn export_csv(store: &dyn SessionStore, path: &Path) -> Result<usize> {
    let sessions = store.all_sessions()?;
    let file = std::fs::File::create(path)?;
    write_csv(&sessions, file)?;

    info!("exported {} sessions to {}", sessions.len(), path.display());
    Ok(sessions.len())
}
