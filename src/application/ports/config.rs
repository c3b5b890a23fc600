//! Configuration storage port

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// Port for the persisted configuration file
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Load the file. A missing file yields an empty config, not an error.
    async fn load(&self) -> Result<AppConfig, ConfigError>;

    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError>;

    fn path(&self) -> PathBuf;

    fn exists(&self) -> bool;

    /// Write the defaults. Fails with `AlreadyExists` if the file is present.
    async fn init(&self) -> Result<(), ConfigError>;

    /// Validate and store a single key
    async fn set_value(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut config = self.load().await?;
        config.set_value(key, value)?;
        self.save(&config).await
    }
}
