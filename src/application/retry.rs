//! Retry executor with exponential backoff

use std::fmt::Display;
use std::future::Future;

use tracing::{debug, warn};

use super::ports::{ApiError, ReasoningError, TranscriptionError};
use crate::domain::retry::RetryPolicy;

/// Classifies failures as transient (worth retrying) or final
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for ApiError {
    fn is_retryable(&self) -> bool {
        ApiError::is_retryable(self)
    }
}

impl Retryable for TranscriptionError {
    fn is_retryable(&self) -> bool {
        TranscriptionError::is_retryable(self)
    }
}

impl Retryable for ReasoningError {
    fn is_retryable(&self) -> bool {
        ReasoningError::is_retryable(self)
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// `policy.max_retries` retries are used up. The last error is returned as-is.
///
/// Backoff uses `tokio::time::sleep`, so dropping the returned future
/// abandons any pending wait.
pub async fn with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let mut attempt: u32 = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(operation = operation_name, retries = attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if attempt < policy.max_retries && err.is_retryable() => {
                let delay = policy.delay_for_attempt(attempt);
                warn!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
