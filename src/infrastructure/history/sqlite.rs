//! SQLite-backed transcription history.
//!
//! A single rusqlite `Connection` behind a `Mutex`; every query is short, so
//! it runs directly under the lock.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::{params, Connection, Row};
use tracing::info;

use crate::application::ports::{HistoryError, TranscriptionHistory, TranscriptionRecord};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS transcriptions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    text TEXT NOT NULL,
    timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
);";

fn db_error(e: rusqlite::Error) -> HistoryError {
    HistoryError::Database(e.to_string())
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<TranscriptionRecord> {
    Ok(TranscriptionRecord {
        id: row.get(0)?,
        text: row.get(1)?,
        timestamp: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
    })
}

pub struct SqliteHistory {
    conn: Mutex<Connection>,
}

impl SqliteHistory {
    /// `$XDG_DATA_HOME/ppq-voice/transcriptions.db`
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("ppq-voice")
            .join("transcriptions.db")
    }

    /// Open (or create) the database at `path`
    pub fn open(path: &Path) -> Result<Self, HistoryError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| HistoryError::Database(e.to_string()))?;
        }

        let conn = Connection::open(path).map_err(db_error)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(db_error)?;

        info!("History database opened at {}", path.display());
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self, HistoryError> {
        Self::with_connection(Connection::open_in_memory().map_err(db_error)?)
    }

    fn with_connection(conn: Connection) -> Result<Self, HistoryError> {
        conn.execute_batch(SCHEMA).map_err(db_error)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T, HistoryError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| HistoryError::Database(format!("lock poisoned: {}", e)))?;
        f(&conn).map_err(db_error)
    }
}

impl std::fmt::Debug for SqliteHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteHistory").finish()
    }
}

#[async_trait]
impl TranscriptionHistory for SqliteHistory {
    async fn save(&self, text: &str) -> Result<TranscriptionRecord, HistoryError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(HistoryError::EmptyText);
        }

        self.with_conn(|conn| {
            conn.query_row(
                "INSERT INTO transcriptions (text) VALUES (?1) RETURNING id, text, timestamp",
                params![text],
                record_from_row,
            )
        })
    }

    async fn list(&self, limit: usize) -> Result<Vec<TranscriptionRecord>, HistoryError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, text, timestamp FROM transcriptions
                 ORDER BY timestamp DESC, id DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], record_from_row)?;
            rows.collect()
        })
    }

    async fn delete(&self, id: i64) -> Result<bool, HistoryError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM transcriptions WHERE id = ?1", params![id])
                .map(|changes| changes > 0)
        })
    }

    async fn clear(&self) -> Result<usize, HistoryError> {
        self.with_conn(|conn| conn.execute("DELETE FROM transcriptions", []))
    }
}
