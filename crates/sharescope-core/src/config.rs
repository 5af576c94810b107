//! Configuration management for Sharescope.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. Transport settings are consumed once at
//! startup; the `[integration]` section supplies default lookup options.

use crate::error::{ConfigError, ConfigResult};
use crate::options::IntegrationOptions;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration.
///
/// This is loaded from `~/.config/sharescope/config.toml` (or platform
/// equivalent) unless an explicit path is given. Missing sections use
/// default values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging settings
    pub logging: LoggingConfig,
    /// Outbound HTTP transport settings
    pub request: RequestConfig,
    /// Default integration options for lookups
    pub integration: IntegrationOptions,
}

impl AppConfig {
    /// Load configuration from the default location, falling back to
    /// defaults if the file does not exist.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.logging.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `SHARESCOPE_LOG_LEVEL`: Override the log level
    /// - `SHARESCOPE_PROXY`: Override the outbound proxy
    /// - `SHARESCOPE_CLIENT_SECRET`: Supply the client secret
    /// - `SHARESCOPE_PRIVATE_KEY_PASSPHRASE`: Supply the private key passphrase
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    #[must_use]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(val) = lookup("SHARESCOPE_LOG_LEVEL") {
            tracing::debug!("Override logging.level from env: {}", val);
            self.logging.level = val;
        }

        if let Some(val) = lookup("SHARESCOPE_PROXY") {
            tracing::debug!("Override request.proxy from env");
            self.request.proxy = val;
        }

        if let Some(val) = lookup("SHARESCOPE_CLIENT_SECRET") {
            tracing::debug!("Override integration.client_secret from env");
            self.integration.client_secret = val;
        }

        if let Some(val) = lookup("SHARESCOPE_PRIVATE_KEY_PASSPHRASE") {
            tracing::debug!("Override integration.private_key_passphrase from env");
            self.integration.private_key_passphrase = val;
        }

        self
    }

    /// Load from the default location with environment variable overrides.
    pub fn load_with_env() -> ConfigResult<Self> {
        let config = Self::load()?.with_env_overrides();
        config.logging.validate()?;
        Ok(config)
    }

    /// Save configuration to the given path.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let config_dir = path.parent().ok_or_else(|| ConfigError::InvalidValue {
            field: "config_path".to_string(),
            reason: "no parent directory".to_string(),
        })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/sharescope/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "sharescope", "sharescope")
            .ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `trace`, `debug`, `info`, `warn`, `error`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> ConfigResult<()> {
        match self.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("unknown level '{other}'"),
            }),
        }
    }
}

/// Outbound HTTP transport settings.
///
/// Empty strings mean "not set", matching the option file convention.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    /// Path to a PEM client certificate for mutual TLS
    pub cert: String,
    /// Path to the PEM private key for the client certificate
    pub key: String,
    /// Passphrase for an encrypted client key
    pub passphrase: String,
    /// Path to an additional PEM certificate authority
    pub ca: String,
    /// HTTP(S) proxy URL, credentials may be embedded
    pub proxy: String,
    /// Reject invalid server certificates
    pub reject_unauthorized: bool,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            cert: String::new(),
            key: String::new(),
            passphrase: String::new(),
            ca: String::new(),
            proxy: String::new(),
            reject_unauthorized: true,
            timeout_secs: 30,
        }
    }
}

impl std::fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestConfig")
            .field("cert", &self.cert)
            .field("key", &self.key)
            .field("passphrase", &if self.passphrase.is_empty() { "" } else { "<redacted>" })
            .field("ca", &self.ca)
            .field("proxy", &self.proxy)
            .field("reject_unauthorized", &self.reject_unauthorized)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::AuthMode;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.logging.level, "info");
        assert!(config.request.reject_unauthorized);
        assert_eq!(config.request.timeout_secs, 30);
        assert!(config.integration.direct_search);
        assert_eq!(config.integration.auth_mode, AuthMode::Secret);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[logging]"));
        assert!(toml_str.contains("[request]"));
        assert!(toml_str.contains("[integration]"));

        let parsed: AppConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert_eq!(parsed.integration, config.integration);
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.logging.level = "debug".to_string();
        config.integration.host = "https://contoso.sharepoint.com".to_string();
        config.request.proxy = "http://proxy.local:3128".to_string();

        config.save_to(&config_path).expect("save config");
        let loaded = AppConfig::load_from(&config_path).expect("load config");

        assert_eq!(loaded.logging.level, "debug");
        assert_eq!(loaded.integration.host, "https://contoso.sharepoint.com");
        assert_eq!(loaded.request.proxy, "http://proxy.local:3128");
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let result = AppConfig::load_from(&tmp.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");
        fs::write(&config_path, "[logging]\nlevel = \"loud\"\n").expect("write config");

        let result = AppConfig::load_from(&config_path);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[integration]
host = "https://contoso.sharepoint.com"
tenant_id = "tenant"
subsite = "sites/finance"

[request]
reject_unauthorized = false
"#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.integration.tenant_id, "tenant");
        assert_eq!(config.integration.subsite, "sites/finance");
        assert!(!config.request.reject_unauthorized);
        // These should be defaults
        assert_eq!(config.request.timeout_secs, 30);
        assert_eq!(config.logging.level, "info");
        assert!(config.integration.direct_search);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SHARESCOPE_CLIENT_SECRET", "from-env"),
            ("SHARESCOPE_PROXY", "http://env-proxy:8080"),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::default()
            .with_overrides_from(|name| vars.get(name).map(|val| (*val).to_string()));
        assert_eq!(config.integration.client_secret, "from-env");
        assert_eq!(config.request.proxy, "http://env-proxy:8080");
        assert_eq!(config.logging.level, "info");
        assert!(config.integration.private_key_passphrase.is_empty());
    }
}
