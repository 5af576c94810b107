//! Token acquisition with process-wide caching.

use crate::cache::{cache_key, TokenCache};
use crate::certificate::{default_scope, ConfidentialClient};
use crate::error::Result;
use crate::secret;
use crate::token::{AccessToken, TokenSource};
use async_trait::async_trait;
use sharescope_core::{AuthMode, IntegrationOptions};
use std::time::Duration;
use tokio::sync::OnceCell;

/// Lifetime of cached tokens.
pub const TOKEN_TTL: Duration = Duration::from_secs(600);

/// Identity platform authority used by the certificate flow.
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Obtains and caches bearer tokens for the search backend.
///
/// One instance is meant to live for the whole process. The certificate-mode
/// confidential client is built from the first options that need it and is
/// reused afterwards, so certificate changes take effect after a restart.
#[derive(Debug)]
pub struct Authenticator {
    http: reqwest::Client,
    cache: TokenCache,
    authority_host: String,
    confidential_client: OnceCell<ConfidentialClient>,
}

impl Authenticator {
    /// Create an authenticator sending requests through `http`.
    #[must_use]
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            cache: TokenCache::new(TOKEN_TTL),
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            confidential_client: OnceCell::new(),
        }
    }

    /// Use a different identity platform authority for the certificate flow.
    #[must_use]
    pub fn with_authority_host(mut self, authority_host: impl Into<String>) -> Self {
        self.authority_host = authority_host.into();
        self
    }

    /// Use a different cache lifetime.
    #[must_use]
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.cache = TokenCache::new(ttl);
        self
    }

    /// The token cache, for inspection.
    #[must_use]
    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    /// Return a cached token for `options` or acquire a new one.
    pub async fn get_auth_token(&self, options: &IntegrationOptions) -> Result<AccessToken> {
        let key = cache_key(options);
        if let Some(token) = self.cache.get(&key) {
            tracing::debug!(mode = ?options.auth_mode, "using cached access token");
            return Ok(token);
        }

        let value = match options.auth_mode {
            AuthMode::Secret => secret::acquire_token(&self.http, options).await?,
            AuthMode::Certificate => {
                let client = self.confidential_client(options).await?;
                client
                    .acquire_token_by_client_credential(&[default_scope(options)])
                    .await?
            }
        };

        tracing::info!(
            mode = ?options.auth_mode,
            ttl_secs = self.cache.ttl().as_secs(),
            "acquired access token"
        );
        Ok(self.cache.insert(key, value))
    }

    async fn confidential_client(&self, options: &IntegrationOptions) -> Result<&ConfidentialClient> {
        let client = self
            .confidential_client
            .get_or_try_init(|| async {
                ConfidentialClient::from_options(self.http.clone(), &self.authority_host, options)
            })
            .await?;

        if client.client_id() != options.client_id.trim() {
            tracing::warn!(
                configured = %options.client_id.trim(),
                active = %client.client_id(),
                "certificate client already initialized for another client id; restart to apply"
            );
        }

        Ok(client)
    }
}

#[async_trait]
impl TokenSource for Authenticator {
    async fn get_auth_token(&self, options: &IntegrationOptions) -> Result<AccessToken> {
        Authenticator::get_auth_token(self, options).await
    }
}
