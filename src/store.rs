use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

use crate::error::Result;
use crate::session::{format_timestamp, parse_timestamp, NewSession, Session, SessionSummary};

const CREATE_SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS sessions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        start_time TEXT NOT NULL,
        end_time TEXT,
        duration REAL,
        notes TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_sessions_start_time ON sessions(start_time);
"#;

// Rows without a fractional second sort as if they had `.000000`
const ORDER_BY_START: &str = "ORDER BY substr(start_time || '.000000', 1, 26) DESC, id ASC";

/// Durable, append-only log of completed sessions
pub trait SessionStore {
    /// Append a session and return the id the store assigned to it
    fn insert(&mut self, session: &NewSession) -> Result<i64>;

    /// All sessions, most recent start first; equal starts keep insertion order
    fn list_summaries(&self) -> Result<Vec<SessionSummary>>;

    fn get(&self, id: i64) -> Result<Option<Session>>;

    /// Full records in the same order as `list_summaries`
    fn all_sessions(&self) -> Result<Vec<Session>>;
}

/// SQLite-backed session store
#[derive(Debug)]
pub struct SqliteSessionStore {
    conn: Connection,
}

impl SqliteSessionStore {
    /// Open (or create) the database file, creating parent directories as needed
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        info!("opened session database at {}", path.display());
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(CREATE_SCHEMA)?;
        Ok(Self { conn })
    }
}

type RawSession = (i64, String, Option<String>, Option<f64>, Option<String>);

fn read_row(row: &Row) -> rusqlite::Result<RawSession> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn build_session((id, start, end, duration, notes): RawSession) -> Result<Session> {
    let start_time = parse_timestamp(&start)?;
    // Rows that were never finalized read back as zero-length
    let end_time = match end {
        Some(raw) => parse_timestamp(&raw)?,
        None => start_time,
    };

    Ok(Session {
        id,
        start_time,
        end_time,
        duration: duration.unwrap_or(0.0),
        notes: notes.unwrap_or_default(),
    })
}

impl SessionStore for SqliteSessionStore {
    fn insert(&mut self, session: &NewSession) -> Result<i64> {
        self.conn.execute(
            r#"
            INSERT INTO sessions (start_time, end_time, duration, notes)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                format_timestamp(&session.start_time),
                format_timestamp(&session.end_time),
                session.duration,
                session.notes,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("inserted session {id} ({:.1}s)", session.duration);
        Ok(id)
    }

    fn list_summaries(&self) -> Result<Vec<SessionSummary>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, start_time, duration FROM sessions {ORDER_BY_START}"
        ))?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<f64>>(2)?,
            ))
        })?;

        let mut summaries = Vec::new();
        for row in rows {
            let (id, start, duration) = row?;
            summaries.push(SessionSummary {
                id,
                start_time: parse_timestamp(&start)?,
                duration: duration.unwrap_or(0.0),
            });
        }

        Ok(summaries)
    }

    fn get(&self, id: i64) -> Result<Option<Session>> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, start_time, end_time, duration, notes FROM sessions WHERE id = ?1",
                [id],
                read_row,
            )
            .optional()?;

        raw.map(build_session).transpose()
    }

    fn all_sessions(&self) -> Result<Vec<Session>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, start_time, end_time, duration, notes FROM sessions {ORDER_BY_START}"
        ))?;

        let rows = stmt.query_map([], read_row)?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(build_session(row?)?);
        }

        Ok(sessions)
    }
}
