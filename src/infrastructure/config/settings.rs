//! Settings provider backed by the config file

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::application::ports::{ConfigStore, DictationPreferences, SettingsProvider};
use crate::domain::config::AppConfig;

/// Dictation preferences from a fully merged config
pub fn preferences_from(config: &AppConfig) -> DictationPreferences {
    DictationPreferences {
        language: config.language_or_default(),
        use_reasoning: config.use_reasoning_or_default(),
        reasoning_model: config.reasoning_model_or_default().to_string(),
        agent_name: config.agent_name().map(str::to_string),
        reasoning: config.reasoning_config(),
        paste: config.paste_or_default(),
        save_history: config.save_history_or_default(),
    }
}

/// Re-reads the config file on every cycle, so `config set` takes effect in
/// a running daemon. `overrides` (environment and CLI flags) win over the file.
pub struct FileSettingsProvider {
    store: Arc<dyn ConfigStore>,
    overrides: AppConfig,
}

impl FileSettingsProvider {
    pub fn new(store: Arc<dyn ConfigStore>, overrides: AppConfig) -> Self {
        Self { store, overrides }
    }

    async fn current_config(&self) -> AppConfig {
        let file = self.store.load().await.unwrap_or_else(|e| {
            warn!(error = %e, path = %self.store.path().display(), "Ignoring unreadable config file");
            AppConfig::empty()
        });
        AppConfig::defaults()
            .merge(file)
            .merge(self.overrides.clone())
    }
}

#[async_trait]
impl SettingsProvider for FileSettingsProvider {
    async fn preferences(&self) -> DictationPreferences {
        preferences_from(&self.current_config().await)
    }
}
