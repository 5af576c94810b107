//! Sharescope Core - Foundation crate for the Sharescope enrichment connector.
//!
//! This crate provides the types that every other Sharescope crate shares:
//! the entities submitted for lookup, the per-call integration options and
//! their validation, the process configuration file, and the error types.
//!
//! # Modules
//!
//! - [`error`] - Configuration error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Entities and entity classification
//! - [`options`] - Per-lookup integration options and field validation
//!
//! # Example
//!
//! ```rust
//! use sharescope_core::{validate_options, IntegrationOptions};
//!
//! let options = IntegrationOptions::default();
//! let errors = validate_options(&options);
//! assert!(errors.iter().any(|e| e.key == "host"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod options;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, LoggingConfig, RequestConfig};
pub use error::{ConfigError, ConfigResult};
pub use options::{validate_options, AuthMode, IntegrationOptions, ValidationError};
pub use types::{Entity, EntityType};
