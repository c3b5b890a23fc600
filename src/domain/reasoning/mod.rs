//! Reasoning (LLM cleanup) domain rules

mod prompt;
mod token_budget;

pub use prompt::{PromptTemplate, SYSTEM_INSTRUCTION};
pub use token_budget::TokenLimits;

/// Default chat model when the caller passes an empty model id
pub const DEFAULT_REASONING_MODEL: &str = "llama-3.1-8b-instant";

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Per-call overrides for a reasoning request
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReasoningConfig {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ReasoningConfig {
    pub fn temperature_or_default(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    /// Explicit `max_tokens` wins, otherwise the budget derived from `text`
    pub fn max_tokens_for(&self, text: &str, limits: &TokenLimits) -> u32 {
        self.max_tokens
            .unwrap_or_else(|| limits.budget_for(text.chars().count()))
    }
}
