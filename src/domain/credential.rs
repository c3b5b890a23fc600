//! API credential value object

use std::fmt;

/// Value shipped in config/.env templates; never a real key.
pub const PLACEHOLDER_KEY: &str = "your_ppq_api_key_here";

/// Returns true when `value` is non-empty after trimming and is not the
/// template placeholder.
pub fn is_usable_key(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && trimmed != PLACEHOLDER_KEY
}

/// A bearer token for the cloud APIs.
///
/// Deliberately has no `Display` impl; use [`Credential::expose`] at the
/// point where the header is built.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Validate and wrap a raw key. Returns `None` for empty or placeholder values.
    pub fn parse(raw: &str) -> Option<Self> {
        is_usable_key(raw).then(|| Self(raw.trim().to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// First and last four characters, for `config get`/`list`
    pub fn masked(&self) -> String {
        mask_secret(&self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_placeholder() {
        assert!(Credential::parse("").is_none());
        assert!(Credential::parse("   ").is_none());
        assert!(Credential::parse(PLACEHOLDER_KEY).is_none());
        assert!(Credential::parse(&format!("  {}  ", PLACEHOLDER_KEY)).is_none());
    }

    #[test]
    fn trims_valid_key() {
        let key = Credential::parse("  sk-abc123  ").unwrap();
        assert_eq!(key.expose(), "sk-abc123");
    }

    #[test]
    fn debug_is_redacted() {
        let key = Credential::parse("sk-secret-value").unwrap();
        let dbg = format!("{:?}", key);
        assert!(!dbg.contains("secret"));
    }

    #[test]
    fn masking() {
        assert_eq!(mask_secret("sk-1234567890abcd"), "sk-1...abcd");
        assert_eq!(mask_secret("short"), "*****");
    }
}
