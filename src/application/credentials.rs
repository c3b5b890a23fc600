//! API key resolution with a short-lived cache

use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::ports::{SecretStore, SecretStoreError, API_KEY_SECRET};
use crate::domain::credential::Credential;

/// Default lifetime of a cached key
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Error)]
pub enum CredentialError {
    #[error("No API key found. Set PPQ_API_KEY or run 'ppq-voice config set api_key <key>'")]
    NotFound,

    #[error("Invalid API key: value is empty or still the template placeholder")]
    Invalid,

    #[error("No writable secret store configured")]
    NoWritableStore,

    #[error(transparent)]
    Store(#[from] SecretStoreError),
}

struct CachedKey {
    credential: Credential,
    expires_at: Instant,
}

/// Resolves the API key from an ordered list of secret stores.
///
/// Resolution order: the cached key (unless expired or a refresh is
/// forced), then each store in turn. The first usable key wins and
/// refreshes the cache.
pub struct ApiKeyResolver {
    sources: Vec<Arc<dyn SecretStore>>,
    ttl: Duration,
    cache: Mutex<Option<CachedKey>>,
}

impl ApiKeyResolver {
    pub fn new(sources: Vec<Arc<dyn SecretStore>>) -> Self {
        Self::with_ttl(sources, DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(sources: Vec<Arc<dyn SecretStore>>, ttl: Duration) -> Self {
        Self {
            sources,
            ttl,
            cache: Mutex::new(None),
        }
    }

    fn cached(&self) -> Option<Credential> {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache
            .as_ref()
            .filter(|entry| Instant::now() < entry.expires_at)
            .map(|entry| entry.credential.clone())
    }

    fn remember(&self, credential: &Credential) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        *cache = Some(CachedKey {
            credential: credential.clone(),
            expires_at: Instant::now() + self.ttl,
        });
    }

    /// Resolve the key. `force_refresh` skips the cache read but still
    /// repopulates it on success.
    pub async fn get_key(&self, force_refresh: bool) -> Result<Credential, CredentialError> {
        if !force_refresh {
            if let Some(credential) = self.cached() {
                return Ok(credential);
            }
        }

        for source in &self.sources {
            match source.read_secret(API_KEY_SECRET).await {
                Ok(Some(raw)) => match Credential::parse(&raw) {
                    Some(credential) => {
                        debug!(source = source.name(), "Resolved API key");
                        self.remember(&credential);
                        return Ok(credential);
                    }
                    None => debug!(source = source.name(), "Ignoring empty or placeholder key"),
                },
                Ok(None) => {}
                Err(e) => warn!(source = source.name(), error = %e, "Secret store unavailable"),
            }
        }

        Err(CredentialError::NotFound)
    }

    /// True when some source yields a usable key
    pub async fn has_key(&self) -> bool {
        self.get_key(false).await.is_ok()
    }

    pub fn clear_cache(&self) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        *cache = None;
    }

    /// Validate `value`, write it to the first source, and cache it.
    pub async fn store_key(&self, value: &str) -> Result<(), CredentialError> {
        let credential = Credential::parse(value).ok_or(CredentialError::Invalid)?;
        let target = self.sources.first().ok_or(CredentialError::NoWritableStore)?;
        target
            .write_secret(API_KEY_SECRET, credential.expose())
            .await?;
        self.remember(&credential);
        Ok(())
    }
}
