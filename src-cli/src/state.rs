//! Application state shared by commands.

use crate::error::CommandError;
use sharescope_core::AppConfig;
use sharescope_lookup::Integration;
use std::path::Path;

/// Started integration plus the configuration it was built from.
pub struct AppState {
    /// Effective configuration
    pub config: AppConfig,
    /// Transport, token cache and blocklist state for this process
    pub integration: Integration,
}

impl AppState {
    /// Start the integration from `config`.
    pub fn new(config: AppConfig) -> Result<Self, CommandError> {
        let integration = Integration::startup(&config.request)?;
        Ok(Self {
            config,
            integration,
        })
    }
}

/// Load config from `path`, or from the default location, then apply env overrides.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, CommandError> {
    let config = match path {
        Some(path) => AppConfig::load_from(path)?.with_env_overrides(),
        None => AppConfig::load_with_env()?,
    };
    Ok(config)
}
