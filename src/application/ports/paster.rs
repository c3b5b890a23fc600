//! Paste port interface

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum PasteError {
    /// Text is on the clipboard but the paste keystroke could not be sent
    #[error("Copied to clipboard but could not paste automatically ({0}). Paste manually with Ctrl+V / Cmd+V")]
    CopiedOnly(String),

    #[error("Clipboard unavailable: {0}")]
    ClipboardUnavailable(String),
}

/// Port for delivering text at the user's cursor
#[async_trait]
pub trait Paster: Send + Sync {
    async fn paste(&self, text: &str) -> Result<(), PasteError>;
}

#[async_trait]
impl Paster for Box<dyn Paster> {
    async fn paste(&self, text: &str) -> Result<(), PasteError> {
        self.as_ref().paste(text).await
    }
}
