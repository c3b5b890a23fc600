//! Transcription history port interface

use async_trait::async_trait;
use thiserror::Error;

/// Default number of rows returned by `list`
pub const DEFAULT_LIST_LIMIT: usize = 50;

#[derive(Debug, Clone, Error)]
pub enum HistoryError {
    #[error("Cannot save an empty transcription")]
    EmptyText,

    #[error("History database error: {0}")]
    Database(String),
}

/// One saved transcription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionRecord {
    pub id: i64,
    pub text: String,
    /// `YYYY-MM-DD HH:MM:SS` in UTC
    pub timestamp: String,
}

/// Port for persisting delivered transcripts
#[async_trait]
pub trait TranscriptionHistory: Send + Sync {
    /// Trim and store `text`
    async fn save(&self, text: &str) -> Result<TranscriptionRecord, HistoryError>;

    /// Newest first
    async fn list(&self, limit: usize) -> Result<Vec<TranscriptionRecord>, HistoryError>;

    /// Returns whether a row was removed
    async fn delete(&self, id: i64) -> Result<bool, HistoryError>;

    /// Returns the number of rows removed
    async fn clear(&self) -> Result<usize, HistoryError>;
}
