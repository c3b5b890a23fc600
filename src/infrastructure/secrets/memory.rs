//! In-process secret store

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::ports::{SecretStore, SecretStoreError, API_KEY_SECRET};

/// Holds secrets for the lifetime of the process. Useful for a key passed
/// on the command line and in tests.
#[derive(Default)]
pub struct MemorySecretStore {
    secrets: Mutex<HashMap<String, String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(value: impl Into<String>) -> Self {
        let store = Self::new();
        store
            .secrets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(API_KEY_SECRET.to_string(), value.into());
        store
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn read_secret(&self, name: &str) -> Result<Option<String>, SecretStoreError> {
        let secrets = self.secrets.lock().unwrap_or_else(|e| e.into_inner());
        Ok(secrets.get(name).cloned())
    }

    async fn write_secret(&self, name: &str, value: &str) -> Result<(), SecretStoreError> {
        let mut secrets = self.secrets.lock().unwrap_or_else(|e| e.into_inner());
        secrets.insert(name.to_string(), value.to_string());
        Ok(())
    }
}
