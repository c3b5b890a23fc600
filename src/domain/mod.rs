//! Domain layer - Core business logic
//!
//! Contains value objects, entities, and domain errors.
//! This layer has no dependencies on external systems.

pub mod config;
pub mod credential;
pub mod dictation;
pub mod error;
pub mod reasoning;
pub mod recording;
pub mod retry;
pub mod transcription;

// Re-export common types
pub use config::AppConfig;
pub use credential::Credential;
pub use dictation::{DictationSession, DictationState, TextSource};
pub use error::*;
pub use reasoning::{PromptTemplate, ReasoningConfig, TokenLimits};
pub use recording::Duration;
pub use retry::RetryPolicy;
pub use transcription::{AudioClip, AudioMimeType, LanguageHint};
