//! Config file and settings adapters

mod settings;
mod xdg;

pub use settings::{preferences_from, FileSettingsProvider};
pub use xdg::{env_file_path, XdgConfigStore};
