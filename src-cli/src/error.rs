//! Error type for CLI commands.

use serde::Serialize;
use sharescope_core::{ConfigError, ValidationError};
use sharescope_lookup::{LookupError, LookupFailure};
use std::fmt;

/// Serializable command failure, printed as JSON on stderr.
#[derive(Debug, Serialize)]
pub struct CommandError {
    /// Error code for scripting (e.g., "CONFIG_ERROR")
    pub code: String,
    /// User-friendly error message
    pub message: String,
    /// Optional structured context (never contains secrets)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl CommandError {
    /// Create a new command error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Create a command error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details),
        }
    }

    /// Render as a single JSON line.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{self}"))
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for CommandError {}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound { path } => Self::with_details(
                "CONFIG_NOT_FOUND",
                "Configuration file does not exist",
                serde_json::json!({ "path": path }),
            ),
            other => Self::new("CONFIG_ERROR", format!("Configuration error: {other}")),
        }
    }
}

/// Invalid integration options.
impl From<Vec<ValidationError>> for CommandError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::with_details(
            "INVALID_OPTIONS",
            format!("{} option(s) failed validation", errors.len()),
            serde_json::json!(errors),
        )
    }
}

impl From<LookupFailure> for CommandError {
    fn from(failure: LookupFailure) -> Self {
        let details = serde_json::to_value(&failure.error).ok();
        Self {
            code: "LOOKUP_FAILED".to_string(),
            message: failure.detail,
            details,
        }
    }
}

/// Startup failures (transport construction).
impl From<LookupError> for CommandError {
    fn from(err: LookupError) -> Self {
        Self::new("STARTUP_FAILED", err.to_string())
    }
}

impl From<anyhow::Error> for CommandError {
    fn from(err: anyhow::Error) -> Self {
        Self::new("INVALID_INPUT", format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_new() {
        let err = CommandError::new("TEST_CODE", "Test message");
        assert_eq!(err.code, "TEST_CODE");
        assert_eq!(err.message, "Test message");
        assert!(err.details.is_none());
        assert_eq!(err.to_json(), r#"{"code":"TEST_CODE","message":"Test message"}"#);
    }

    #[test]
    fn test_config_not_found_conversion() {
        let err: CommandError = ConfigError::NotFound {
            path: "/etc/sharescope.toml".to_string(),
        }
        .into();
        assert_eq!(err.code, "CONFIG_NOT_FOUND");
        assert_eq!(
            err.details,
            Some(serde_json::json!({ "path": "/etc/sharescope.toml" }))
        );
    }

    #[test]
    fn test_validation_errors_conversion() {
        let errors = sharescope_core::validate_options(&sharescope_core::IntegrationOptions::default());
        let err: CommandError = errors.into();
        assert_eq!(err.code, "INVALID_OPTIONS");
        let details = err.details.expect("details");
        assert_eq!(details[0]["key"], "host");
    }

    #[test]
    fn test_lookup_failure_conversion() {
        let failure = LookupFailure::from(LookupError::RetriesExhausted {
            status: 429,
            attempts: 4,
        });
        let err: CommandError = failure.into();
        assert_eq!(err.code, "LOOKUP_FAILED");
        assert_eq!(err.message, "Search request failed");
        assert_eq!(err.details.expect("details")["status"], 429);
    }

    #[test]
    fn test_anyhow_conversion_keeps_context() {
        let err: CommandError = anyhow::anyhow!("root cause").context("reading entities").into();
        assert_eq!(err.code, "INVALID_INPUT");
        assert_eq!(err.message, "reading entities: root cause");
    }
}
