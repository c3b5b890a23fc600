//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod api;
pub mod config;
pub mod history;
pub mod notifier;
pub mod paster;
pub mod reasoner;
pub mod recorder;
pub mod secret_store;
pub mod settings;
pub mod transcriber;

// Re-export common types
pub use api::ApiError;
pub use config::ConfigStore;
pub use history::{HistoryError, TranscriptionHistory, TranscriptionRecord, DEFAULT_LIST_LIMIT};
pub use notifier::{NotificationError, NotificationIcon, Notifier};
pub use paster::{PasteError, Paster};
pub use reasoner::{Reasoner, ReasoningError};
pub use recorder::{AudioCapture, RecordingError};
pub use secret_store::{SecretStore, SecretStoreError, API_KEY_SECRET};
pub use settings::{DictationPreferences, SettingsProvider};
pub use transcriber::{Transcriber, TranscriptionError};
