//! Application layer - Use cases and port interfaces
//!
//! Contains the core business operations and trait definitions
//! for external system interactions.

pub mod credentials;
pub mod dictation;
pub mod ports;
pub mod retry;

// Re-export use cases
pub use credentials::{ApiKeyResolver, CredentialError, DEFAULT_CACHE_TTL};
pub use dictation::{DictationError, DictationOrchestrator, DictationOutput, StartOutcome};
pub use retry::{with_retry, Retryable};
