//! Transcription domain module

mod audio_clip;
pub mod cleanup;
mod language;

pub use audio_clip::{AudioClip, AudioMimeType};
pub use cleanup::{clean_transcription_fallback, normalize_transcription};
pub use language::LanguageHint;
