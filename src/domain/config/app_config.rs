//! Application configuration value object

use std::time::Duration as StdDuration;

use serde::{Deserialize, Serialize};

use super::endpoint::{base_url_or_default, normalize_base_url};
use crate::domain::credential::mask_secret;
use crate::domain::error::ConfigError;
use crate::domain::reasoning::{
    ReasoningConfig, TokenLimits, DEFAULT_REASONING_MODEL, DEFAULT_TEMPERATURE,
};
use crate::domain::recording::Duration;
use crate::domain::retry::{
    RetryPolicy, DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_INITIAL_DELAY_MS, DEFAULT_MAX_DELAY_MS,
    DEFAULT_MAX_RETRIES,
};
use crate::domain::transcription::LanguageHint;

pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-large-v3";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// `[retry]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrySection {
    pub max_retries: Option<u32>,
    pub initial_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
    pub backoff_multiplier: Option<f64>,
}

/// `[tokens]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenSection {
    pub min: Option<u32>,
    pub max: Option<u32>,
    pub multiplier: Option<u32>,
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub transcription_model: Option<String>,
    pub reasoning_model: Option<String>,
    pub language: Option<String>,
    pub agent_name: Option<String>,
    pub use_reasoning: Option<bool>,
    pub temperature: Option<f32>,
    pub paste: Option<bool>,
    pub save_history: Option<bool>,
    pub notify: Option<bool>,
    pub duration: Option<String>,
    pub max_duration: Option<String>,
    pub request_timeout: Option<String>,
    pub cache_ttl: Option<String>,
    pub retry: Option<RetrySection>,
    pub tokens: Option<TokenSection>,
}

/// Keys accepted by `config get`/`config set`
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "api_key",
    "base_url",
    "transcription_model",
    "reasoning_model",
    "language",
    "agent_name",
    "use_reasoning",
    "temperature",
    "paste",
    "save_history",
    "notify",
    "duration",
    "max_duration",
    "request_timeout",
    "cache_ttl",
    "retry.max_retries",
    "retry.initial_delay_ms",
    "retry.max_delay_ms",
    "retry.backoff_multiplier",
    "tokens.min",
    "tokens.max",
    "tokens.multiplier",
];

pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

/// Parse a boolean value
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid(key, format!("'{}' is not a valid number", value)))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value).ok_or_else(|| ConfigError::invalid(key, "Value must be 'true' or 'false'"))
}

fn validated_duration(key: &str, value: &str) -> Result<String, ConfigError> {
    value
        .parse::<Duration>()
        .map(|d| d.to_string())
        .map_err(|e| ConfigError::invalid(key, e.to_string()))
}

fn non_empty(key: &str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::invalid(key, "Value must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn parse_duration_field(value: Option<&String>, default: Duration) -> Duration {
    value.and_then(|s| s.parse().ok()).unwrap_or(default)
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            api_key: None,
            base_url: None,
            transcription_model: Some(DEFAULT_TRANSCRIPTION_MODEL.to_string()),
            reasoning_model: Some(DEFAULT_REASONING_MODEL.to_string()),
            language: Some(LanguageHint::AUTO.to_string()),
            agent_name: None,
            use_reasoning: Some(false),
            temperature: Some(DEFAULT_TEMPERATURE),
            paste: Some(false),
            save_history: Some(true),
            notify: Some(false),
            duration: Some(Duration::default_duration().to_string()),
            max_duration: Some(Duration::default_max_duration().to_string()),
            request_timeout: Some(format!("{}s", DEFAULT_REQUEST_TIMEOUT_SECS)),
            cache_ttl: Some("1h".to_string()),
            retry: Some(RetrySection {
                max_retries: Some(DEFAULT_MAX_RETRIES),
                initial_delay_ms: Some(DEFAULT_INITIAL_DELAY_MS),
                max_delay_ms: Some(DEFAULT_MAX_DELAY_MS),
                backoff_multiplier: Some(DEFAULT_BACKOFF_MULTIPLIER),
            }),
            tokens: Some(TokenSection {
                min: Some(TokenLimits::default().min),
                max: Some(TokenLimits::default().max),
                multiplier: Some(TokenLimits::default().multiplier),
            }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            api_key: other.api_key.or(self.api_key),
            base_url: other.base_url.or(self.base_url),
            transcription_model: other.transcription_model.or(self.transcription_model),
            reasoning_model: other.reasoning_model.or(self.reasoning_model),
            language: other.language.or(self.language),
            agent_name: other.agent_name.or(self.agent_name),
            use_reasoning: other.use_reasoning.or(self.use_reasoning),
            temperature: other.temperature.or(self.temperature),
            paste: other.paste.or(self.paste),
            save_history: other.save_history.or(self.save_history),
            notify: other.notify.or(self.notify),
            duration: other.duration.or(self.duration),
            max_duration: other.max_duration.or(self.max_duration),
            request_timeout: other.request_timeout.or(self.request_timeout),
            cache_ttl: other.cache_ttl.or(self.cache_ttl),
            retry: merge_section(self.retry, other.retry, |b, o| RetrySection {
                max_retries: o.max_retries.or(b.max_retries),
                initial_delay_ms: o.initial_delay_ms.or(b.initial_delay_ms),
                max_delay_ms: o.max_delay_ms.or(b.max_delay_ms),
                backoff_multiplier: o.backoff_multiplier.or(b.backoff_multiplier),
            }),
            tokens: merge_section(self.tokens, other.tokens, |b, o| TokenSection {
                min: o.min.or(b.min),
                max: o.max.or(b.max),
                multiplier: o.multiplier.or(b.multiplier),
            }),
        }
    }

    /// Normalized API root, or the default
    pub fn base_url_or_default(&self) -> String {
        base_url_or_default(self.base_url.as_deref())
    }

    pub fn transcription_model_or_default(&self) -> &str {
        non_blank(self.transcription_model.as_deref()).unwrap_or(DEFAULT_TRANSCRIPTION_MODEL)
    }

    pub fn reasoning_model_or_default(&self) -> &str {
        non_blank(self.reasoning_model.as_deref()).unwrap_or(DEFAULT_REASONING_MODEL)
    }

    pub fn language_or_default(&self) -> LanguageHint {
        LanguageHint::from(self.language.as_deref())
    }

    pub fn agent_name(&self) -> Option<&str> {
        non_blank(self.agent_name.as_deref())
    }

    pub fn use_reasoning_or_default(&self) -> bool {
        self.use_reasoning.unwrap_or(false)
    }

    pub fn paste_or_default(&self) -> bool {
        self.paste.unwrap_or(false)
    }

    pub fn save_history_or_default(&self) -> bool {
        self.save_history.unwrap_or(true)
    }

    pub fn notify_or_default(&self) -> bool {
        self.notify.unwrap_or(false)
    }

    /// Get duration as parsed Duration, or default if not set/invalid
    pub fn duration_or_default(&self) -> Duration {
        parse_duration_field(self.duration.as_ref(), Duration::default_duration())
    }

    /// Get max_duration as parsed Duration, or default if not set/invalid
    pub fn max_duration_or_default(&self) -> Duration {
        parse_duration_field(self.max_duration.as_ref(), Duration::default_max_duration())
    }

    pub fn request_timeout_or_default(&self) -> StdDuration {
        parse_duration_field(
            self.request_timeout.as_ref(),
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
        .as_std()
    }

    pub fn cache_ttl_or_default(&self) -> StdDuration {
        parse_duration_field(self.cache_ttl.as_ref(), Duration::from_secs(DEFAULT_CACHE_TTL_SECS))
            .as_std()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let section = self.retry.clone().unwrap_or_default();
        RetryPolicy {
            max_retries: section.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            initial_delay: StdDuration::from_millis(
                section.initial_delay_ms.unwrap_or(DEFAULT_INITIAL_DELAY_MS),
            ),
            max_delay: StdDuration::from_millis(
                section.max_delay_ms.unwrap_or(DEFAULT_MAX_DELAY_MS),
            ),
            backoff_multiplier: section
                .backoff_multiplier
                .unwrap_or(DEFAULT_BACKOFF_MULTIPLIER),
        }
    }

    pub fn token_limits(&self) -> TokenLimits {
        let section = self.tokens.clone().unwrap_or_default();
        let defaults = TokenLimits::default();
        TokenLimits {
            min: section.min.unwrap_or(defaults.min),
            max: section.max.unwrap_or(defaults.max),
            multiplier: section.multiplier.unwrap_or(defaults.multiplier),
        }
    }

    pub fn reasoning_config(&self) -> ReasoningConfig {
        ReasoningConfig {
            temperature: Some(self.temperature.unwrap_or(DEFAULT_TEMPERATURE)),
            max_tokens: None,
        }
    }

    /// Display value for `key`; `api_key` is masked.
    pub fn get_value(&self, key: &str) -> Result<Option<String>, ConfigError> {
        if !is_valid_config_key(key) {
            return Err(unknown_key(key));
        }
        let retry = self.retry.as_ref();
        let tokens = self.tokens.as_ref();
        let value = match key {
            "api_key" => self.api_key.as_deref().map(mask_secret),
            "base_url" => self.base_url.clone(),
            "transcription_model" => self.transcription_model.clone(),
            "reasoning_model" => self.reasoning_model.clone(),
            "language" => self.language.clone(),
            "agent_name" => self.agent_name.clone(),
            "use_reasoning" => self.use_reasoning.map(|b| b.to_string()),
            "temperature" => self.temperature.map(|t| t.to_string()),
            "paste" => self.paste.map(|b| b.to_string()),
            "save_history" => self.save_history.map(|b| b.to_string()),
            "notify" => self.notify.map(|b| b.to_string()),
            "duration" => self.duration.clone(),
            "max_duration" => self.max_duration.clone(),
            "request_timeout" => self.request_timeout.clone(),
            "cache_ttl" => self.cache_ttl.clone(),
            "retry.max_retries" => retry.and_then(|r| r.max_retries).map(|v| v.to_string()),
            "retry.initial_delay_ms" => {
                retry.and_then(|r| r.initial_delay_ms).map(|v| v.to_string())
            }
            "retry.max_delay_ms" => retry.and_then(|r| r.max_delay_ms).map(|v| v.to_string()),
            "retry.backoff_multiplier" => retry
                .and_then(|r| r.backoff_multiplier)
                .map(|v| v.to_string()),
            "tokens.min" => tokens.and_then(|t| t.min).map(|v| v.to_string()),
            "tokens.max" => tokens.and_then(|t| t.max).map(|v| v.to_string()),
            "tokens.multiplier" => tokens.and_then(|t| t.multiplier).map(|v| v.to_string()),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Validate `value` for `key` and store it
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "api_key" => self.api_key = Some(non_empty(key, value)?),
            "base_url" => {
                let url = normalize_base_url(value)
                    .ok_or_else(|| ConfigError::invalid(key, "Value must not be empty"))?;
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ConfigError::invalid(
                        key,
                        "URL must start with http:// or https://",
                    ));
                }
                self.base_url = Some(url);
            }
            "transcription_model" => self.transcription_model = Some(non_empty(key, value)?),
            "reasoning_model" => self.reasoning_model = Some(non_empty(key, value)?),
            "language" => self.language = Some(LanguageHint::parse(value).to_string()),
            "agent_name" => self.agent_name = Some(non_empty(key, value)?),
            "use_reasoning" => self.use_reasoning = Some(parse_flag(key, value)?),
            "temperature" => {
                let temperature: f32 = parse_number(key, value)?;
                if !(0.0..=2.0).contains(&temperature) {
                    return Err(ConfigError::invalid(key, "Value must be between 0 and 2"));
                }
                self.temperature = Some(temperature);
            }
            "paste" => self.paste = Some(parse_flag(key, value)?),
            "save_history" => self.save_history = Some(parse_flag(key, value)?),
            "notify" => self.notify = Some(parse_flag(key, value)?),
            "duration" => self.duration = Some(validated_duration(key, value)?),
            "max_duration" => self.max_duration = Some(validated_duration(key, value)?),
            "request_timeout" => self.request_timeout = Some(validated_duration(key, value)?),
            "cache_ttl" => self.cache_ttl = Some(validated_duration(key, value)?),
            "retry.max_retries" => {
                self.retry.get_or_insert_with(Default::default).max_retries =
                    Some(parse_number(key, value)?)
            }
            "retry.initial_delay_ms" => {
                self.retry.get_or_insert_with(Default::default).initial_delay_ms =
                    Some(parse_number(key, value)?)
            }
            "retry.max_delay_ms" => {
                self.retry.get_or_insert_with(Default::default).max_delay_ms =
                    Some(parse_number(key, value)?)
            }
            "retry.backoff_multiplier" => {
                let multiplier: f64 = parse_number(key, value)?;
                if !multiplier.is_finite() || multiplier < 1.0 {
                    return Err(ConfigError::invalid(key, "Value must be at least 1"));
                }
                self.retry.get_or_insert_with(Default::default).backoff_multiplier =
                    Some(multiplier)
            }
            "tokens.min" => {
                self.tokens.get_or_insert_with(Default::default).min =
                    Some(parse_number(key, value)?)
            }
            "tokens.max" => {
                let max: u32 = parse_number(key, value)?;
                if max == 0 {
                    return Err(ConfigError::invalid(key, "Value must be greater than 0"));
                }
                self.tokens.get_or_insert_with(Default::default).max = Some(max)
            }
            "tokens.multiplier" => {
                self.tokens.get_or_insert_with(Default::default).multiplier =
                    Some(parse_number(key, value)?)
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> ConfigError {
    ConfigError::invalid(
        key,
        format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    )
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn merge_section<T>(base: Option<T>, other: Option<T>, combine: impl FnOnce(T, T) -> T) -> Option<T> {
    match (base, other) {
        (None, None) => None,
        (Some(b), None) => Some(b),
        (None, Some(o)) => Some(o),
        (Some(b), Some(o)) => Some(combine(b, o)),
    }
}
