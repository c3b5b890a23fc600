//! Shared reqwest plumbing for the cloud adapters

use std::time::Duration;

use reqwest::{Client, Response};
use serde_json::Value;

use crate::application::ports::ApiError;

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest error body kept in `ApiError::Http`
const MAX_ERROR_BODY: usize = 2048;

/// Client with a bounded per-request timeout
pub fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to default HTTP client");
            Client::new()
        })
}

pub fn map_transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Network(err.to_string())
    }
}

/// Turn a non-2xx response into `ApiError::Http` with its (truncated) body
pub async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    if body.len() > MAX_ERROR_BODY {
        let cut = (0..=MAX_ERROR_BODY)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        body.truncate(cut);
    }

    Err(ApiError::Http {
        status: status.as_u16(),
        body,
    })
}

/// Read a successful response body as JSON
pub async fn read_json(response: Response) -> Result<Value, ApiError> {
    let text = response.text().await.map_err(map_transport_error)?;
    serde_json::from_str(&text).map_err(|e| ApiError::Parse(e.to_string()))
}
