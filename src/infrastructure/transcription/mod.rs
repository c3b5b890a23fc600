//! Speech-to-text adapters

pub mod transcode;
mod whisper_api;

pub use whisper_api::WhisperApiTranscriber;
