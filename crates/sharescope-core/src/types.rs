//! Entities submitted for enrichment.
//!
//! Entities arrive already recognized and tagged by the upstream caller. The
//! wire format is camelCase JSON with the recognizer's derived flags:
//!
//! ```json
//! { "value": "8.8.8.8", "type": "IPv4", "isIPv4": true, "isPrivateIP": false, "isDomain": false }
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::OnceLock;

/// Kinds of observables the connector accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    /// IPv4 or IPv6 address
    #[serde(rename = "IP", alias = "IPv4", alias = "IPv6", alias = "ip")]
    Ip,
    /// File hash (MD5, SHA1, SHA256)
    #[serde(rename = "hash", alias = "MD5", alias = "SHA1", alias = "SHA256")]
    Hash,
    /// Domain name
    #[serde(rename = "domain")]
    Domain,
    /// Free-form string
    #[serde(rename = "string")]
    String,
    /// Email address
    #[serde(rename = "email")]
    Email,
}

impl EntityType {
    /// Name used on the wire and in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ip => "IP",
            Self::Hash => "hash",
            Self::Domain => "domain",
            Self::String => "string",
            Self::Email => "email",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An observable under investigation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    /// Literal value as recognized upstream
    pub value: String,
    /// Entity classification
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// Whether the value is an IPv4 address
    #[serde(rename = "isIPv4", default)]
    pub is_ipv4: bool,
    /// Whether the value is a private (non-routable) IP address
    #[serde(rename = "isPrivateIP", default)]
    pub is_private_ip: bool,
    /// Whether the value is a domain name
    #[serde(rename = "isDomain", default)]
    pub is_domain: bool,
}

impl Entity {
    /// Create an entity with all recognizer flags cleared.
    #[must_use]
    pub fn new(value: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            value: value.into(),
            entity_type,
            is_ipv4: false,
            is_private_ip: false,
            is_domain: false,
        }
    }

    /// Classify a raw string into an entity, deriving the recognizer flags.
    ///
    /// Library callers normally receive entities already tagged; this is a
    /// best-effort stand-in for command-line use.
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        let value = raw.trim();

        if let Ok(ip) = value.parse::<IpAddr>() {
            return match ip {
                IpAddr::V4(v4) => Self {
                    is_ipv4: true,
                    is_private_ip: is_private_ipv4(v4),
                    ..Self::new(value, EntityType::Ip)
                },
                IpAddr::V6(v6) => Self {
                    is_private_ip: v6.is_loopback() || v6.is_unspecified(),
                    ..Self::new(value, EntityType::Ip)
                },
            };
        }

        if is_hash(value) {
            return Self::new(value, EntityType::Hash);
        }

        if email_regex().is_match(value) {
            return Self::new(value, EntityType::Email);
        }

        if domain_regex().is_match(value) {
            return Self {
                is_domain: true,
                ..Self::new(value, EntityType::Domain)
            };
        }

        Self::new(value, EntityType::String)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value, self.entity_type)
    }
}

fn is_private_ipv4(ip: Ipv4Addr) -> bool {
    ip.is_private() || ip.is_loopback() || ip.is_link_local() || ip.is_unspecified()
}

fn is_hash(value: &str) -> bool {
    matches!(value.len(), 32 | 40 | 64) && value.chars().all(|c| c.is_ascii_hexdigit())
}

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[A-Za-z]{2,}$").expect("valid regex")
    })
}

fn domain_regex() -> &'static Regex {
    static DOMAIN_REGEX: OnceLock<Regex> = OnceLock::new();
    DOMAIN_REGEX.get_or_init(|| {
        Regex::new(r"^(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$")
            .expect("valid regex")
    })
}
