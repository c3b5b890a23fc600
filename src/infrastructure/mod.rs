//! Infrastructure layer: adapters behind the application ports
//!
//! HTTP clients for the OpenAI-compatible cloud endpoints, cpal capture,
//! SQLite history, clipboard paste, desktop notifications and the
//! config/secret stores.

pub mod config;
pub mod history;
pub mod http;
pub mod notification;
pub mod paste;
pub mod reasoning;
pub mod recording;
pub mod secrets;
pub mod transcription;

pub use config::{FileSettingsProvider, XdgConfigStore};
pub use history::SqliteHistory;
pub use notification::{create_notifier, DesktopNotifier, SilentNotifier};
pub use paste::ClipboardPaster;
pub use reasoning::ChatCompletionReasoner;
pub use recording::CpalRecorder;
pub use secrets::{ConfigFileSecretStore, EnvFileSecretStore, MemorySecretStore};
pub use transcription::WhisperApiTranscriber;
