//! Failure type shared by the cloud API adapters

use thiserror::Error;

/// A failed HTTP exchange with a cloud endpoint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Failed to parse API response: {0}")]
    Parse(String),

    #[error("Could not build request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Transient failures worth another attempt: connection problems,
    /// timeouts, rate limiting and server errors.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout => true,
            Self::Http { status, .. } => *status == 429 || (500..=599).contains(status),
            Self::Parse(_) | Self::InvalidRequest(_) => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
