//! Reasoning (transcript cleanup) port interface

use async_trait::async_trait;
use thiserror::Error;

use super::api::ApiError;
use crate::domain::reasoning::ReasoningConfig;

#[derive(Debug, Clone, Error)]
pub enum ReasoningError {
    #[error("A reasoning request is already in progress")]
    AlreadyInFlight,

    #[error("Nothing to process: input text is empty")]
    EmptyInput,

    #[error("No API key configured for reasoning")]
    CredentialNotFound,

    #[error("Reasoning model returned no text")]
    EmptyResult,

    #[error("Reasoning request failed: {0}")]
    Api(#[from] ApiError),
}

impl ReasoningError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_retryable())
    }
}

/// Port for LLM post-processing of a transcript
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Cheap probe: is a credential available for this client?
    async fn is_available(&self) -> bool;

    /// Clean up `text` with the chat model `model_id`.
    ///
    /// `persona` is the assistant name the user may address in the text.
    async fn clean(
        &self,
        text: &str,
        model_id: &str,
        persona: Option<&str>,
        config: &ReasoningConfig,
    ) -> Result<String, ReasoningError>;
}
