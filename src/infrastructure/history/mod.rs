//! Transcription history storage

mod sqlite;

pub use sqlite::SqliteHistory;
