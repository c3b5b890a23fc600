//! Configuration domain module

mod app_config;
pub mod endpoint;

pub use app_config::{
    is_valid_config_key, parse_bool, AppConfig, RetrySection, TokenSection, DEFAULT_TRANSCRIPTION_MODEL,
    VALID_CONFIG_KEYS,
};
pub use endpoint::{build_api_url, normalize_base_url, DEFAULT_BASE_URL};
