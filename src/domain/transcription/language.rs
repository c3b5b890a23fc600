//! Language hint passed to the transcription endpoint

use std::fmt;

/// Preferred spoken language. `auto` (or empty) lets the API detect it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LanguageHint(Option<String>);

impl LanguageHint {
    pub const AUTO: &'static str = "auto";

    pub fn auto() -> Self {
        Self(None)
    }

    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(Self::AUTO) {
            Self(None)
        } else {
            Self(Some(trimmed.to_lowercase()))
        }
    }

    /// Value for the `language` form field, `None` when detection is automatic
    pub fn as_field(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_auto(&self) -> bool {
        self.0.is_none()
    }
}

impl From<Option<&str>> for LanguageHint {
    fn from(value: Option<&str>) -> Self {
        value.map(Self::parse).unwrap_or_default()
    }
}

impl fmt::Display for LanguageHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_deref().unwrap_or(Self::AUTO))
    }
}
