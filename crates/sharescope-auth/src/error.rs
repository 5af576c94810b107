//! Error types for token acquisition.

use thiserror::Error;

/// Errors that can occur while obtaining an access token.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Token endpoint answered with something other than HTTP 200
    #[error("token endpoint returned status {status}: {body}")]
    TokenEndpoint {
        /// HTTP status code
        status: u16,
        /// Response body, kept for diagnosis
        body: String,
    },

    /// Token endpoint answered 200 without a usable token
    #[error("invalid token response: {0}")]
    InvalidResponse(String),

    /// The configured search host is not a usable URL
    #[error("invalid host '{host}': {reason}")]
    InvalidHost {
        /// Configured host value
        host: String,
        /// Parse failure reason
        reason: String,
    },

    /// Certificate or private key could not be read or decoded
    #[error("invalid key material in {path}: {reason}")]
    KeyMaterial {
        /// File the material was read from
        path: String,
        /// What was wrong with it
        reason: String,
    },

    /// Client assertion could not be signed
    #[error("failed to sign client assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;
