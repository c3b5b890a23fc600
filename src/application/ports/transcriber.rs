//! Transcription port interface

use async_trait::async_trait;
use thiserror::Error;

use super::api::ApiError;
use crate::domain::transcription::{AudioClip, LanguageHint};

/// Transcription errors
#[derive(Debug, Clone, Error)]
pub enum TranscriptionError {
    #[error("No API key configured. Set PPQ_API_KEY or run 'ppq-voice config set api_key <key>'")]
    CredentialNotFound,

    #[error("Recorded audio is empty")]
    EmptyAudio,

    #[error("Transcription returned no text")]
    EmptyResult,

    #[error("Transcription request failed: {0}")]
    Api(#[from] ApiError),
}

impl TranscriptionError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_retryable())
    }
}

/// Port for speech-to-text
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe a captured clip.
    ///
    /// # Arguments
    /// * `clip` - The captured audio
    /// * `language` - Spoken language, or automatic detection
    ///
    /// # Returns
    /// The trimmed transcript, never empty
    async fn transcribe(
        &self,
        clip: &AudioClip,
        language: &LanguageHint,
    ) -> Result<String, TranscriptionError>;
}
