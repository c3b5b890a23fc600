//! API key from the process environment and a `.env` file

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::application::ports::{SecretStore, SecretStoreError, API_KEY_SECRET};
use crate::domain::credential::is_usable_key;

/// Checked in order; the legacy name is kept for existing setups
pub const API_KEY_ENV_VARS: &[&str] = &["PPQ_API_KEY", "OPENAI_API_KEY"];

const STORE_NAME: &str = "env";

pub struct EnvFileSecretStore {
    env_file: PathBuf,
    read_process_env: bool,
}

impl EnvFileSecretStore {
    /// Process environment first, then `env_file`
    pub fn new(env_file: impl Into<PathBuf>) -> Self {
        Self {
            env_file: env_file.into(),
            read_process_env: true,
        }
    }

    /// Only the `.env` file, ignoring the process environment
    pub fn file_only(env_file: impl Into<PathBuf>) -> Self {
        Self {
            env_file: env_file.into(),
            read_process_env: false,
        }
    }

    pub fn env_file(&self) -> &PathBuf {
        &self.env_file
    }

    fn from_process_env() -> Option<String> {
        API_KEY_ENV_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| is_usable_key(value))
    }

    async fn from_env_file(&self) -> Result<Option<String>, SecretStoreError> {
        let bytes = match fs::read(&self.env_file).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(SecretStoreError::Read {
                    store: STORE_NAME,
                    message: format!("{}: {}", self.env_file.display(), e),
                })
            }
        };

        let mut entries = Vec::new();
        for item in dotenvy::from_read_iter(bytes.as_slice()) {
            let (key, value) = item.map_err(|e| SecretStoreError::Read {
                store: STORE_NAME,
                message: e.to_string(),
            })?;
            entries.push((key, value));
        }

        Ok(API_KEY_ENV_VARS.iter().find_map(|var| {
            entries
                .iter()
                .find(|(key, value)| key == var && is_usable_key(value))
                .map(|(_, value)| value.clone())
        }))
    }
}

/// Replace (or append) the `PPQ_API_KEY` assignment, keeping every other line
fn upsert_key_line(existing: &str, value: &str) -> String {
    let var = API_KEY_ENV_VARS[0];
    let assignment = format!("{}={}", var, value);
    let mut replaced = false;

    let mut lines: Vec<String> = existing
        .lines()
        .map(|line| {
            let bare = line.trim_start();
            let bare = bare.strip_prefix("export ").unwrap_or(bare).trim_start();
            let is_target = bare
                .strip_prefix(var)
                .is_some_and(|rest| rest.trim_start().starts_with('='));
            if is_target && !replaced {
                replaced = true;
                assignment.clone()
            } else {
                line.to_string()
            }
        })
        .collect();

    if !replaced {
        lines.push(assignment);
    }

    let mut content = lines.join("\n");
    content.push('\n');
    content
}

#[async_trait]
impl SecretStore for EnvFileSecretStore {
    fn name(&self) -> &'static str {
        STORE_NAME
    }

    async fn read_secret(&self, name: &str) -> Result<Option<String>, SecretStoreError> {
        if name != API_KEY_SECRET {
            return Ok(None);
        }

        if self.read_process_env {
            if let Some(value) = Self::from_process_env() {
                debug!("API key taken from process environment");
                return Ok(Some(value));
            }
        }
        self.from_env_file().await
    }

    async fn write_secret(&self, name: &str, value: &str) -> Result<(), SecretStoreError> {
        let write_error = |message: String| SecretStoreError::Write {
            store: STORE_NAME,
            message,
        };
        if name != API_KEY_SECRET {
            return Err(write_error(format!("unsupported secret '{}'", name)));
        }

        let existing = match fs::read_to_string(&self.env_file).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(write_error(e.to_string())),
        };

        if let Some(parent) = self.env_file.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| write_error(e.to_string()))?;
        }
        fs::write(&self.env_file, upsert_key_line(&existing, value))
            .await
            .map_err(|e| write_error(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_replaces_existing_assignment() {
        let existing = "# keys\nOTHER=1\nPPQ_API_KEY=old\nTAIL=2";
        assert_eq!(
            upsert_key_line(existing, "new"),
            "# keys\nOTHER=1\nPPQ_API_KEY=new\nTAIL=2\n"
        );
    }

    #[test]
    fn upsert_handles_export_prefix() {
        assert_eq!(
            upsert_key_line("export PPQ_API_KEY = old", "new"),
            "PPQ_API_KEY=new\n"
        );
    }

    #[test]
    fn upsert_appends_when_absent() {
        assert_eq!(upsert_key_line("", "k"), "PPQ_API_KEY=k\n");
        assert_eq!(
            upsert_key_line("PPQ_API_KEY_OLD=x", "k"),
            "PPQ_API_KEY_OLD=x\nPPQ_API_KEY=k\n"
        );
    }

    #[tokio::test]
    async fn reads_env_file_in_priority_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "OPENAI_API_KEY=sk-legacy\nPPQ_API_KEY=sk-ppq\n").unwrap();

        let store = EnvFileSecretStore::file_only(&path);
        assert_eq!(
            store.read_secret(API_KEY_SECRET).await.unwrap().as_deref(),
            Some("sk-ppq")
        );
    }

    #[tokio::test]
    async fn placeholder_in_env_file_falls_back_to_legacy_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "PPQ_API_KEY=your_ppq_api_key_here\nOPENAI_API_KEY=sk-legacy\n")
            .unwrap();

        let store = EnvFileSecretStore::file_only(&path);
        assert_eq!(
            store.read_secret(API_KEY_SECRET).await.unwrap().as_deref(),
            Some("sk-legacy")
        );
    }

    #[tokio::test]
    async fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = EnvFileSecretStore::file_only(dir.path().join("absent.env"));
        assert_eq!(store.read_secret(API_KEY_SECRET).await.unwrap(), None);
        assert_eq!(store.read_secret("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn write_then_read_preserves_other_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg/.env");
        let store = EnvFileSecretStore::file_only(&path);

        store.write_secret(API_KEY_SECRET, "sk-first").await.unwrap();
        std::fs::write(
            &path,
            format!("FOO=bar\n{}", std::fs::read_to_string(&path).unwrap()),
        )
        .unwrap();
        store.write_secret(API_KEY_SECRET, "sk-second").await.unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "FOO=bar\nPPQ_API_KEY=sk-second\n"
        );
        assert_eq!(
            store.read_secret(API_KEY_SECRET).await.unwrap().as_deref(),
            Some("sk-second")
        );
    }
}
