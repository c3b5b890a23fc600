//! Local, deterministic transcript cleanup.
//!
//! Used when reasoning is disabled or fails, so a usable transcript is
//! always delivered.

/// Collapse every run of whitespace to a single space and trim the ends.
pub fn normalize_transcription(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize whitespace, then upper-case the first character.
pub fn clean_transcription_fallback(text: &str) -> String {
    let normalized = normalize_transcription(text);
    let mut chars = normalized.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
