//! Audio capture port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::transcription::AudioClip;

/// Recording errors
#[derive(Debug, Clone, Error)]
pub enum RecordingError {
    #[error("Microphone access denied. Grant microphone permission and try again")]
    PermissionDenied,

    #[error("No audio input device available")]
    NoAudioDevice,

    #[error("Failed to start recording: {0}")]
    StartFailed(String),

    #[error("Recording failed: {0}")]
    RecordingFailed(String),

    #[error("Not recording")]
    NotRecording,
}

/// Port for start/stop microphone capture
#[async_trait]
pub trait AudioCapture: Send + Sync {
    /// Open the input device and begin buffering samples.
    async fn start(&self) -> Result<(), RecordingError>;

    /// Close the device and return everything captured since `start`.
    async fn stop(&self) -> Result<AudioClip, RecordingError>;

    /// Close the device and discard the buffer.
    async fn cancel(&self) -> Result<(), RecordingError>;

    fn is_recording(&self) -> bool;

    /// Elapsed recording time in milliseconds, 0 when idle
    fn elapsed_ms(&self) -> u64;
}
