//! Access tokens and the token source seam used by lookups.

use crate::error::{AuthError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use sharescope_core::IntegrationOptions;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use zeroize::Zeroizing;

/// A bearer token with a local expiry.
///
/// The token value is zeroized on drop and never printed by `Debug`.
#[derive(Clone)]
pub struct AccessToken {
    value: Zeroizing<String>,
    expires_at: Instant,
}

impl AccessToken {
    /// Wrap a freshly issued token that is considered valid for `ttl`.
    #[must_use]
    pub fn new(value: impl Into<String>, ttl: Duration) -> Self {
        Self {
            value: Zeroizing::new(value.into()),
            expires_at: Instant::now() + ttl,
        }
    }

    /// Raw token value.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.value
    }

    /// When the cached token stops being served.
    #[must_use]
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Whether the local expiry has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Anything that can produce a bearer token for a set of options.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Return a valid token, from cache when possible.
    async fn get_auth_token(&self, options: &IntegrationOptions) -> Result<AccessToken>;
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Post a client-credential form and extract `access_token`.
///
/// Anything but HTTP 200 is an error carrying the status and body.
pub(crate) async fn request_token(
    http: &reqwest::Client,
    endpoint: &str,
    form: &[(&str, &str)],
) -> Result<String> {
    let response = http.post(endpoint).form(form).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if status != StatusCode::OK {
        tracing::warn!(status = status.as_u16(), "token endpoint rejected the request");
        return Err(AuthError::TokenEndpoint {
            status: status.as_u16(),
            body,
        });
    }

    let parsed: TokenResponse =
        serde_json::from_str(&body).map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

    match parsed.access_token {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::InvalidResponse(
            "response has no access_token".to_string(),
        )),
    }
}
