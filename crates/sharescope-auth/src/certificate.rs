//! Certificate token flow through a confidential client.
//!
//! The client signs a short-lived RS256 client assertion whose `x5t` header
//! carries the certificate thumbprint, then exchanges it for a token scoped to
//! `{host}/.default` at the tenant's v2.0 token endpoint.

use crate::error::Result;
use crate::keys::{self, CertificateThumbprint};
use crate::token::request_token;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;
use sharescope_core::IntegrationOptions;
use std::fmt;
use std::path::Path;

/// Assertion type for JWT-bearer client authentication.
pub const CLIENT_ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

/// Validity window of each signed assertion, in seconds.
const ASSERTION_LIFETIME_SECS: i64 = 600;

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    aud: &'a str,
    iss: &'a str,
    sub: &'a str,
    jti: String,
    nbf: i64,
    iat: i64,
    exp: i64,
}

/// Client authenticating with a certificate-backed private key.
pub struct ConfidentialClient {
    http: reqwest::Client,
    client_id: String,
    token_endpoint: String,
    thumbprint: CertificateThumbprint,
    signing_key: EncodingKey,
}

impl ConfidentialClient {
    /// Load the key material named in `options` and bind the client to
    /// `authority_host` (e.g. `https://login.microsoftonline.com`).
    pub fn from_options(
        http: reqwest::Client,
        authority_host: &str,
        options: &IntegrationOptions,
    ) -> Result<Self> {
        let der = keys::read_certificate(Path::new(&options.public_key_path))?;
        let thumbprint = CertificateThumbprint::of_der(&der);

        let pem = keys::load_private_key_pem(
            Path::new(&options.private_key_path),
            &options.private_key_passphrase,
        )?;
        let signing_key = EncodingKey::from_rsa_pem(pem.as_bytes())?;

        let token_endpoint = format!(
            "{}/{}/oauth2/v2.0/token",
            authority_host.trim_end_matches('/'),
            options.tenant_id.trim()
        );

        tracing::info!(
            thumbprint = %thumbprint.hex(),
            client_id = %options.client_id.trim(),
            "loaded certificate credential"
        );

        Ok(Self {
            http,
            client_id: options.client_id.trim().to_string(),
            token_endpoint,
            thumbprint,
            signing_key,
        })
    }

    /// Application id this client authenticates as.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Thumbprint of the loaded certificate.
    #[must_use]
    pub fn thumbprint(&self) -> CertificateThumbprint {
        self.thumbprint
    }

    /// v2.0 token endpoint the client posts to; also the assertion audience.
    #[must_use]
    pub fn token_endpoint(&self) -> &str {
        &self.token_endpoint
    }

    /// Sign a fresh client assertion.
    pub fn client_assertion(&self) -> Result<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.x5t = Some(self.thumbprint.x5t());

        let now = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            aud: &self.token_endpoint,
            iss: &self.client_id,
            sub: &self.client_id,
            jti: uuid::Uuid::new_v4().to_string(),
            nbf: now,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        Ok(jsonwebtoken::encode(&header, &claims, &self.signing_key)?)
    }

    /// Acquire a token for `scopes` with the client-credential grant.
    pub async fn acquire_token_by_client_credential(&self, scopes: &[String]) -> Result<String> {
        let assertion = self.client_assertion()?;
        let scope = scopes.join(" ");

        tracing::debug!(endpoint = %self.token_endpoint, scope = %scope, "requesting certificate token");

        request_token(
            &self.http,
            &self.token_endpoint,
            &[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_assertion_type", CLIENT_ASSERTION_TYPE),
                ("client_assertion", assertion.as_str()),
                ("scope", scope.as_str()),
            ],
        )
        .await
    }
}

impl fmt::Debug for ConfidentialClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfidentialClient")
            .field("client_id", &self.client_id)
            .field("token_endpoint", &self.token_endpoint)
            .field("thumbprint", &self.thumbprint.hex())
            .finish_non_exhaustive()
    }
}

/// Scope requested for the search host.
#[must_use]
pub fn default_scope(options: &IntegrationOptions) -> String {
    format!("{}/.default", options.host_trimmed())
}
