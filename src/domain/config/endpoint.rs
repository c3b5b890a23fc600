//! API base URL handling
//!
//! Users paste all sorts of URLs into the config (the bare host, the `/v1`
//! root, or a full endpoint copied from provider docs). Everything is reduced
//! to the API root so endpoint paths can be appended uniformly.

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

pub const TRANSCRIPTIONS_PATH: &str = "/audio/transcriptions";
pub const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Environment variables consulted for the base URL, highest priority first
pub const BASE_URL_ENV_VARS: [&str; 3] = [
    "PPQVOICE_GROQ_BASE_URL",
    "PPQVOICE_OPENAI_BASE_URL",
    "OPENAI_BASE_URL",
];

// Longest suffixes first so `/v1/chat/completions` keeps the `/v1`.
const KNOWN_SUFFIXES: &[(&str, &str)] = &[
    ("/v1/chat/completions", "/v1"),
    ("/v1/audio/transcriptions", "/v1"),
    ("/v1/audio/translations", "/v1"),
    ("/v1/responses", "/v1"),
    ("/v1/models", "/v1"),
    ("/chat/completions", ""),
    ("/audio/transcriptions", ""),
    ("/audio/translations", ""),
    ("/responses", ""),
    ("/models", ""),
];

/// Reduce `value` to an API root. Returns `None` when nothing usable is left.
pub fn normalize_base_url(value: &str) -> Option<String> {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }

    let lower = trimmed.to_ascii_lowercase();
    let normalized = KNOWN_SUFFIXES
        .iter()
        .find(|(suffix, _)| lower.ends_with(suffix))
        .map(|(suffix, replacement)| {
            format!("{}{}", &trimmed[..trimmed.len() - suffix.len()], replacement)
        })
        .unwrap_or_else(|| trimmed.to_string());

    let normalized = normalized.trim_end_matches('/').to_string();
    (!normalized.is_empty()).then_some(normalized)
}

/// Normalized `value`, or the default root
pub fn base_url_or_default(value: Option<&str>) -> String {
    value
        .and_then(normalize_base_url)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

/// First usable base URL among [`BASE_URL_ENV_VARS`], using `lookup` to read
/// variables.
pub fn base_url_from_env_with<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    BASE_URL_ENV_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .find_map(|value| normalize_base_url(&value))
}

/// [`base_url_from_env_with`] over the process environment
pub fn base_url_from_env() -> Option<String> {
    base_url_from_env_with(|name| std::env::var(name).ok())
}

/// Join an API root and an endpoint path
pub fn build_api_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_endpoint_suffixes() {
        let cases = [
            ("https://api.example.com/v1/chat/completions", "https://api.example.com/v1"),
            ("https://api.example.com/v1/audio/transcriptions", "https://api.example.com/v1"),
            ("https://api.example.com/v1/audio/translations", "https://api.example.com/v1"),
            ("https://api.example.com/v1/responses", "https://api.example.com/v1"),
            ("https://api.example.com/v1/models/", "https://api.example.com/v1"),
            ("https://proxy.local/openai/chat/completions", "https://proxy.local/openai"),
            ("https://proxy.local/models", "https://proxy.local"),
        ];
        for (input, expected) in cases {
            assert_eq!(normalize_base_url(input).as_deref(), Some(expected), "{input}");
        }
    }

    #[test]
    fn suffix_match_is_case_insensitive() {
        assert_eq!(
            normalize_base_url("https://API.example.com/V1/Chat/Completions").as_deref(),
            Some("https://API.example.com/V1")
        );
    }

    #[test]
    fn keeps_plain_roots() {
        assert_eq!(
            normalize_base_url("  https://api.groq.com/openai/v1/ ").as_deref(),
            Some("https://api.groq.com/openai/v1")
        );
    }

    #[test]
    fn empty_falls_back_to_default() {
        assert_eq!(normalize_base_url("  "), None);
        assert_eq!(normalize_base_url("/"), None);
        assert_eq!(base_url_or_default(None), DEFAULT_BASE_URL);
        assert_eq!(base_url_or_default(Some("")), DEFAULT_BASE_URL);
    }

    #[test]
    fn env_priority_skips_empty_values() {
        let lookup = |name: &str| match name {
            "PPQVOICE_GROQ_BASE_URL" => Some("   ".to_string()),
            "PPQVOICE_OPENAI_BASE_URL" => Some("https://second.example/v1/".to_string()),
            "OPENAI_BASE_URL" => Some("https://third.example/v1".to_string()),
            _ => None,
        };
        assert_eq!(
            base_url_from_env_with(lookup).as_deref(),
            Some("https://second.example/v1")
        );
        assert_eq!(base_url_from_env_with(|_| None), None);
    }

    #[test]
    fn builds_endpoint_urls() {
        assert_eq!(
            build_api_url("https://api.groq.com/openai/v1/", TRANSCRIPTIONS_PATH),
            "https://api.groq.com/openai/v1/audio/transcriptions"
        );
        assert_eq!(
            build_api_url("http://127.0.0.1:9000", CHAT_COMPLETIONS_PATH),
            "http://127.0.0.1:9000/chat/completions"
        );
    }
}
