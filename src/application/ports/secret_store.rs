//! Secret storage port interface

use async_trait::async_trait;
use thiserror::Error;

/// Name under which the cloud API key is stored
pub const API_KEY_SECRET: &str = "ppq";

#[derive(Debug, Clone, Error)]
pub enum SecretStoreError {
    #[error("Failed to read secret from {store}: {message}")]
    Read { store: &'static str, message: String },

    #[error("Failed to write secret to {store}: {message}")]
    Write { store: &'static str, message: String },
}

/// Port for a place credentials can be read from (and possibly written to)
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Short label used in logs
    fn name(&self) -> &'static str;

    /// Read a secret. `Ok(None)` when the store has no value for `name`.
    async fn read_secret(&self, name: &str) -> Result<Option<String>, SecretStoreError>;

    async fn write_secret(&self, name: &str, value: &str) -> Result<(), SecretStoreError>;
}
