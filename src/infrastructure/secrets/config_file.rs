//! API key stored as `api_key` in the TOML config

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::{ConfigStore, SecretStore, SecretStoreError, API_KEY_SECRET};

const STORE_NAME: &str = "config";

pub struct ConfigFileSecretStore {
    store: Arc<dyn ConfigStore>,
}

impl ConfigFileSecretStore {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SecretStore for ConfigFileSecretStore {
    fn name(&self) -> &'static str {
        STORE_NAME
    }

    async fn read_secret(&self, name: &str) -> Result<Option<String>, SecretStoreError> {
        if name != API_KEY_SECRET {
            return Ok(None);
        }
        let config = self.store.load().await.map_err(|e| SecretStoreError::Read {
            store: STORE_NAME,
            message: e.to_string(),
        })?;
        Ok(config.api_key)
    }

    async fn write_secret(&self, name: &str, value: &str) -> Result<(), SecretStoreError> {
        if name != API_KEY_SECRET {
            return Err(SecretStoreError::Write {
                store: STORE_NAME,
                message: format!("unsupported secret '{}'", name),
            });
        }
        self.store
            .set_value("api_key", value)
            .await
            .map_err(|e| SecretStoreError::Write {
                store: STORE_NAME,
                message: e.to_string(),
            })
    }
}
