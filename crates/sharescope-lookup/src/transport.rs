//! Shared outbound HTTP transport.
//!
//! Built once at startup from the `[request]` config section and reused for
//! token and search calls, so every request honours the same client
//! certificate, trust roots, proxy and verification settings.

use crate::error::{LookupError, Result};
use sharescope_auth::keys;
use sharescope_core::RequestConfig;
use std::fs;
use std::time::Duration;

/// Build the process-wide HTTP client.
pub fn build_http_client(request: &RequestConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(concat!("sharescope/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(request.timeout_secs))
        .danger_accept_invalid_certs(!request.reject_unauthorized);

    if !request.cert.is_empty() {
        builder = builder.identity(client_identity(request)?);
    }

    if !request.ca.is_empty() {
        let pem = read(&request.ca, "certificate authority")?;
        let ca = reqwest::Certificate::from_pem(&pem)
            .map_err(|e| LookupError::Transport(format!("invalid CA file {}: {e}", request.ca)))?;
        builder = builder.add_root_certificate(ca);
    }

    if !request.proxy.is_empty() {
        let proxy = reqwest::Proxy::all(&request.proxy)
            .map_err(|e| LookupError::Transport(format!("invalid proxy: {e}")))?;
        builder = builder.proxy(proxy);
    }

    if !request.reject_unauthorized {
        tracing::warn!("TLS certificate verification is disabled");
    }

    tracing::info!(
        client_cert = !request.cert.is_empty(),
        custom_ca = !request.ca.is_empty(),
        proxy = !request.proxy.is_empty(),
        timeout_secs = request.timeout_secs,
        "shared HTTP transport ready"
    );

    builder
        .build()
        .map_err(|e| LookupError::Transport(e.to_string()))
}

/// Client certificate and key as one PEM bundle, decrypting the key if needed.
fn client_identity(request: &RequestConfig) -> Result<reqwest::Identity> {
    if request.key.is_empty() {
        return Err(LookupError::Transport(
            "request.cert is set but request.key is empty".to_string(),
        ));
    }

    let cert = read(&request.cert, "client certificate")?;
    let key = read(&request.key, "client key")?;
    let key = String::from_utf8(key)
        .map_err(|_| LookupError::Transport(format!("client key {} is not PEM", request.key)))?;
    let key = keys::private_key_pem(&key, &request.passphrase)
        .map_err(|reason| LookupError::Transport(format!("client key {}: {reason}", request.key)))?;

    let mut bundle = cert;
    bundle.push(b'\n');
    bundle.extend_from_slice(key.as_bytes());

    reqwest::Identity::from_pem(&bundle)
        .map_err(|e| LookupError::Transport(format!("invalid client identity: {e}")))
}

fn read(path: &str, what: &str) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| LookupError::Transport(format!("failed to read {what} {path}: {e}")))
}
