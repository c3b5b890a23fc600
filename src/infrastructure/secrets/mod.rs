//! Credential sources for the API key resolver

mod config_file;
mod env_file;
mod memory;

pub use config_file::ConfigFileSecretStore;
pub use env_file::{EnvFileSecretStore, API_KEY_ENV_VARS};
pub use memory::MemorySecretStore;
