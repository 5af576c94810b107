//! Shared-secret token flow.
//!
//! Posts `client_id@tenant` and the client secret to
//! `{authHost}/{tenant}/tokens/OAuth/2`, asking for a token whose resource is
//! the SharePoint principal scoped to the search host.

use crate::error::{AuthError, Result};
use crate::token::request_token;
use sharescope_core::IntegrationOptions;
use url::Url;

/// Well-known principal id of SharePoint Online.
pub const SHAREPOINT_PRINCIPAL: &str = "00000003-0000-0ff1-ce00-000000000000";

/// Token endpoint for the configured authentication host and tenant.
#[must_use]
pub fn token_endpoint(options: &IntegrationOptions) -> String {
    format!(
        "{}/{}/tokens/OAuth/2",
        options.auth_host.trim().trim_end_matches('/'),
        options.tenant_id.trim()
    )
}

/// Resource identifier: `{principal}/{host[:port]}@{tenant}`.
pub fn resource(options: &IntegrationOptions) -> Result<String> {
    let host = options.host_trimmed();
    let url = Url::parse(host).map_err(|e| AuthError::InvalidHost {
        host: host.to_string(),
        reason: e.to_string(),
    })?;
    let name = url.host_str().ok_or_else(|| AuthError::InvalidHost {
        host: host.to_string(),
        reason: "missing host name".to_string(),
    })?;

    let authority = match url.port() {
        Some(port) => format!("{name}:{port}"),
        None => name.to_string(),
    };

    Ok(format!(
        "{SHAREPOINT_PRINCIPAL}/{authority}@{}",
        options.tenant_id.trim()
    ))
}

/// Request a new token with the client secret.
pub async fn acquire_token(http: &reqwest::Client, options: &IntegrationOptions) -> Result<String> {
    let tenant = options.tenant_id.trim();
    let client_id = format!("{}@{tenant}", options.client_id.trim());
    let resource = resource(options)?;
    let endpoint = token_endpoint(options);

    tracing::debug!(endpoint = %endpoint, resource = %resource, "requesting shared-secret token");

    request_token(
        http,
        &endpoint,
        &[
            ("grant_type", "client_credentials"),
            ("client_id", client_id.as_str()),
            ("client_secret", options.client_secret.as_str()),
            ("resource", resource.as_str()),
        ],
    )
    .await
}
