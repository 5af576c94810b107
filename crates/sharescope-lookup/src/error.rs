//! Lookup errors and their caller-safe rendering.

use serde::Serialize;
use sharescope_auth::AuthError;
use std::error::Error as _;
use thiserror::Error;

/// Errors that fail a lookup call.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Token acquisition failed
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// Backend kept throttling or failing after every allowed attempt
    #[error("search backend returned HTTP {status} after {attempts} attempts")]
    RetriesExhausted {
        /// Status of the last response
        status: u16,
        /// Number of requests made
        attempts: u32,
    },

    /// Backend returned a non-retryable status
    #[error("search backend returned HTTP {status}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body could not be parsed
    #[error("invalid search response: {0}")]
    InvalidResponse(String),

    /// Blocklist regex does not compile
    #[error("invalid {field} pattern: {source}")]
    InvalidPattern {
        /// Option the pattern came from
        field: &'static str,
        /// Compilation error
        source: regex::Error,
    },

    /// Shared HTTP transport could not be built
    #[error("transport setup failed: {0}")]
    Transport(String),
}

impl LookupError {
    /// Short machine-readable error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Auth(_) => "auth",
            Self::RetriesExhausted { .. } => "retries_exhausted",
            Self::UnexpectedStatus { .. } => "unexpected_status",
            Self::Network(_) => "network",
            Self::InvalidResponse(_) => "invalid_response",
            Self::InvalidPattern { .. } => "invalid_pattern",
            Self::Transport(_) => "transport",
        }
    }

    /// HTTP status involved in the failure, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth(AuthError::TokenEndpoint { status, .. })
            | Self::RetriesExhausted { status, .. }
            | Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    fn body(&self) -> Option<&str> {
        match self {
            Self::Auth(AuthError::TokenEndpoint { body, .. })
            | Self::UnexpectedStatus { body, .. } => Some(body),
            _ => None,
        }
    }

    fn detail(&self) -> &'static str {
        match self {
            Self::Auth(_) => "Failed to obtain an access token",
            Self::InvalidPattern { .. } => "Invalid blocklist pattern",
            Self::Transport(_) => "HTTP transport is misconfigured",
            _ => "Search request failed",
        }
    }
}

/// Result type alias for lookup operations.
pub type Result<T> = std::result::Result<T, LookupError>;

/// Plain-data copy of a [`LookupError`], safe to serialize and hand back to
/// the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{detail}: {}", .error.message)]
pub struct LookupFailure {
    /// Human-readable summary of what failed
    pub detail: String,
    /// Flattened underlying error
    pub error: ErrorSummary,
}

/// Owned fields of an error and its source chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorSummary {
    /// Error kind, see [`LookupError::kind`]
    pub kind: String,
    /// Display form of the error
    pub message: String,
    /// HTTP status, when one was involved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Response body returned with the failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Display forms of the underlying causes, outermost first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl From<&LookupError> for LookupFailure {
    fn from(err: &LookupError) -> Self {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        Self {
            detail: err.detail().to_string(),
            error: ErrorSummary {
                kind: err.kind().to_string(),
                message: err.to_string(),
                status: err.status(),
                body: err.body().map(str::to_string),
                causes,
            },
        }
    }
}

impl From<LookupError> for LookupFailure {
    fn from(err: LookupError) -> Self {
        Self::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failure_is_flattened() {
        let err = LookupError::from(AuthError::TokenEndpoint {
            status: 400,
            body: "bad request".to_string(),
        });
        let failure = LookupFailure::from(&err);

        assert_eq!(failure.detail, "Failed to obtain an access token");
        assert_eq!(failure.error.kind, "auth");
        assert_eq!(failure.error.status, Some(400));
        assert_eq!(failure.error.body.as_deref(), Some("bad request"));
        assert_eq!(
            failure.error.causes,
            vec!["token endpoint returned status 400: bad request".to_string()]
        );

        let json = serde_json::to_value(&failure).expect("serialize failure");
        assert_eq!(json["error"]["status"], 400);
        assert_eq!(json["detail"], "Failed to obtain an access token");
    }

    #[test]
    fn test_retry_failure_omits_empty_fields() {
        let failure = LookupFailure::from(LookupError::RetriesExhausted {
            status: 503,
            attempts: 4,
        });
        let json = serde_json::to_value(&failure).expect("serialize failure");

        assert_eq!(json["error"]["kind"], "retries_exhausted");
        assert_eq!(
            json["error"]["message"],
            "search backend returned HTTP 503 after 4 attempts"
        );
        assert!(json["error"].get("body").is_none());
        assert!(json["error"].get("causes").is_none());
    }

    #[test]
    fn test_invalid_pattern_keeps_regex_cause() {
        let source = regex::Regex::new("(").expect_err("unbalanced group");
        let failure = LookupFailure::from(LookupError::InvalidPattern {
            field: "domainBlocklistRegex",
            source,
        });
        assert_eq!(failure.detail, "Invalid blocklist pattern");
        assert_eq!(failure.error.causes.len(), 1);
        assert!(failure.to_string().starts_with("Invalid blocklist pattern: invalid domainBlocklistRegex pattern"));
    }
}
