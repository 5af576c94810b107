//! Process-wide token cache.
//!
//! Entries are keyed by a digest of the options that identify a credential,
//! never by the full option set. Expired entries are evicted when the same
//! key is next written.

use crate::token::AccessToken;
use sha2::{Digest, Sha256};
use sharescope_core::{AuthMode, IntegrationOptions};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

/// Map of credential digest to the last token issued for it.
#[derive(Debug)]
pub struct TokenCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, AccessToken>>,
}

impl TokenCache {
    /// Create an empty cache whose entries live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Lifetime given to inserted tokens.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached token for `key` if it has not expired.
    pub fn get(&self, key: &str) -> Option<AccessToken> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|token| !token.is_expired())
            .cloned()
    }

    /// Store a freshly issued token value and return the cached entry.
    pub fn insert(&self, key: String, value: impl Into<String>) -> AccessToken {
        let token = AccessToken::new(value, self.ttl);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, cached| !cached.is_expired());
        entries.insert(key, token.clone());
        token
    }

    /// Number of live and not-yet-evicted entries.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Derive the cache key for `options`.
///
/// Covers hosts, tenant and client id, plus the client secret in secret mode
/// or the certificate identity in certificate mode. The digest keeps secrets
/// out of the map keys.
#[must_use]
pub fn cache_key(options: &IntegrationOptions) -> String {
    let mut hasher = Sha256::new();
    for part in [
        options.host_trimmed(),
        options.auth_host.trim(),
        options.tenant_id.trim(),
        options.client_id.trim(),
    ] {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }

    match options.auth_mode {
        AuthMode::Secret => {
            hasher.update(b"secret\0");
            hasher.update(options.client_secret.as_bytes());
        }
        AuthMode::Certificate => {
            hasher.update(b"certificate\0");
            hasher.update(options.public_key_path.as_bytes());
            hasher.update([0u8]);
            hasher.update(options.private_key_path.as_bytes());
        }
    }

    hex::encode(hasher.finalize())
}
