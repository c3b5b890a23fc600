//! Settings provider port

use async_trait::async_trait;

use crate::domain::reasoning::{ReasoningConfig, DEFAULT_REASONING_MODEL};
use crate::domain::transcription::LanguageHint;

/// User preferences read at the start of each dictation cycle
#[derive(Debug, Clone, PartialEq)]
pub struct DictationPreferences {
    pub language: LanguageHint,
    pub use_reasoning: bool,
    pub reasoning_model: String,
    pub agent_name: Option<String>,
    pub reasoning: ReasoningConfig,
    pub paste: bool,
    pub save_history: bool,
}

impl Default for DictationPreferences {
    fn default() -> Self {
        Self {
            language: LanguageHint::auto(),
            use_reasoning: false,
            reasoning_model: DEFAULT_REASONING_MODEL.to_string(),
            agent_name: None,
            reasoning: ReasoningConfig::default(),
            paste: false,
            save_history: true,
        }
    }
}

/// Port for reading the current preferences
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn preferences(&self) -> DictationPreferences;
}

/// Fixed preferences, e.g. resolved once from CLI flags
#[async_trait]
impl SettingsProvider for DictationPreferences {
    async fn preferences(&self) -> DictationPreferences {
        self.clone()
    }
}
