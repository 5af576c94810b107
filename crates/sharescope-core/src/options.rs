//! Per-lookup integration options and their validation.
//!
//! An [`IntegrationOptions`] value is an immutable snapshot handed to every
//! lookup call. Field names are snake_case in TOML; the camelCase names used
//! by the calling platform are accepted as aliases and are the keys reported
//! by [`validate_options`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default shared-secret token authority.
pub const DEFAULT_AUTH_HOST: &str = "https://accounts.accesscontrol.windows.net";

/// How the connector authenticates to the search backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Client id + client secret posted to the tenant token endpoint
    #[default]
    Secret,
    /// X.509 certificate identity against the Microsoft identity platform
    Certificate,
}

/// Configuration snapshot for one lookup call.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationOptions {
    /// Search host, e.g. `https://contoso.sharepoint.com`
    pub host: String,
    /// Shared-secret token authority
    #[serde(alias = "authHost")]
    pub auth_host: String,
    /// Directory (tenant) id
    #[serde(alias = "tenantId")]
    pub tenant_id: String,
    /// Application (client) id
    #[serde(alias = "clientId")]
    pub client_id: String,
    /// Client secret (secret mode)
    #[serde(alias = "clientSecret")]
    pub client_secret: String,
    /// Authentication mode
    #[serde(alias = "authMode")]
    pub auth_mode: AuthMode,
    /// PKCS8 PEM private key path (certificate mode)
    #[serde(alias = "privateKeyPath")]
    pub private_key_path: String,
    /// Passphrase for an encrypted private key; empty when unencrypted
    #[serde(alias = "privateKeyPassphrase")]
    pub private_key_passphrase: String,
    /// PEM certificate path (certificate mode)
    #[serde(alias = "publicKeyPath")]
    pub public_key_path: String,
    /// Optional subsite scope: a name, a path on the host, or an absolute URL
    pub subsite: String,
    /// Comma-separated literal values never looked up
    pub blocklist: String,
    /// Domains matching this regex are never looked up
    #[serde(alias = "domainBlocklistRegex")]
    pub domain_blocklist_regex: String,
    /// Public IPv4 addresses matching this regex are never looked up
    #[serde(alias = "ipBlocklistRegex")]
    pub ip_blocklist_regex: String,
    /// Wrap the search term in quotes for exact-match search
    #[serde(alias = "directSearch")]
    pub direct_search: bool,
}

impl Default for IntegrationOptions {
    fn default() -> Self {
        Self {
            host: String::new(),
            auth_host: DEFAULT_AUTH_HOST.to_string(),
            tenant_id: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            auth_mode: AuthMode::Secret,
            private_key_path: "./certs/private.key".to_string(),
            private_key_passphrase: String::new(),
            public_key_path: "./certs/public.crt".to_string(),
            subsite: String::new(),
            blocklist: String::new(),
            domain_blocklist_regex: String::new(),
            ip_blocklist_regex: String::new(),
            direct_search: true,
        }
    }
}

impl IntegrationOptions {
    /// Strip a single leading slash from the subsite option.
    pub fn normalize_subsite(&mut self) {
        if let Some(stripped) = self.subsite.strip_prefix('/') {
            self.subsite = stripped.to_string();
        }
    }

    /// Host without any trailing slash.
    #[must_use]
    pub fn host_trimmed(&self) -> &str {
        self.host.trim().trim_end_matches('/')
    }
}

impl fmt::Debug for IntegrationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegrationOptions")
            .field("host", &self.host)
            .field("auth_host", &self.auth_host)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("auth_mode", &self.auth_mode)
            .field("private_key_path", &self.private_key_path)
            .field("private_key_passphrase", &redact(&self.private_key_passphrase))
            .field("public_key_path", &self.public_key_path)
            .field("subsite", &self.subsite)
            .field("blocklist", &self.blocklist)
            .field("domain_blocklist_regex", &self.domain_blocklist_regex)
            .field("ip_blocklist_regex", &self.ip_blocklist_regex)
            .field("direct_search", &self.direct_search)
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        ""
    } else {
        "<redacted>"
    }
}

/// A field-level validation failure, rendered as form feedback by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Option key (camelCase, as the caller names it)
    pub key: String,
    /// Human-readable message
    pub message: String,
}

impl ValidationError {
    fn new(key: &str, message: &str) -> Self {
        Self {
            key: key.to_string(),
            message: message.to_string(),
        }
    }
}

/// Validate options, returning every field-level error found.
///
/// An empty list means the options are usable for a lookup.
#[must_use]
pub fn validate_options(options: &IntegrationOptions) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    require(&mut errors, &options.host, "host", "You must provide a Host option.");
    require(
        &mut errors,
        &options.tenant_id,
        "tenantId",
        "You must provide a Tenant ID option.",
    );
    require(
        &mut errors,
        &options.client_id,
        "clientId",
        "You must provide a Client ID option.",
    );

    match options.auth_mode {
        AuthMode::Secret => {
            require(
                &mut errors,
                &options.client_secret,
                "clientSecret",
                "You must provide a Client Secret option.",
            );
            require(
                &mut errors,
                &options.auth_host,
                "authHost",
                "You must provide an Authentication Host option.",
            );
        }
        AuthMode::Certificate => {
            require(
                &mut errors,
                &options.private_key_path,
                "privateKeyPath",
                "You must provide a Private Key File Path option.",
            );
            require(
                &mut errors,
                &options.public_key_path,
                "publicKeyPath",
                "You must provide a Public Key File Path option.",
            );
        }
    }

    if options.subsite.trim().starts_with("//") {
        errors.push(ValidationError::new(
            "subsite",
            "The subsite must not begin with `//`.",
        ));
    }

    errors
}

fn require(errors: &mut Vec<ValidationError>, value: &str, key: &str, message: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationError::new(key, message));
    }
}
