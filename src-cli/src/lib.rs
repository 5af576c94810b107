//! Sharescope command-line shell.
//!
//! Thin process shell: loads configuration, initialises tracing, starts the
//! integration and dispatches to a command. Lookup logic lives in `crates/`.
//!
//! ```bash
//! sharescope check
//! sharescope validate --config ./sharescope.toml
//! sharescope lookup 8.8.8.8 evil.example.com --subsite sites/soc
//! sharescope lookup --entities entities.json --no-exact
//! ```

mod commands;
mod error;
mod state;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

pub use error::CommandError;

/// Search a document backend for observables.
#[derive(Debug, Parser)]
#[command(name = "sharescope", version, about)]
pub struct Cli {
    /// Path to the TOML configuration file.
    ///
    /// Defaults to the platform config directory
    /// (`~/.config/sharescope/config.toml` on Linux).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured log level (`RUST_LOG` still wins).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load the configuration and build the HTTP transport.
    Check,

    /// Validate the integration options and print field errors as JSON.
    Validate,

    /// Look up entities and print the results as JSON.
    Lookup {
        /// Raw values; their type is inferred (IP, hash, email, domain, string).
        values: Vec<String>,

        /// JSON file holding an array of tagged entities.
        #[arg(long, value_name = "FILE")]
        entities: Option<PathBuf>,

        /// Restrict the search to this subsite.
        #[arg(long)]
        subsite: Option<String>,

        /// Search terms without exact-match quoting.
        #[arg(long)]
        no_exact: bool,
    },
}

/// Initialize tracing subscriber for logging.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // A subscriber may already be installed when embedded in tests.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

/// Run the parsed command line, returning the process exit code.
pub async fn run(cli: Cli) -> ExitCode {
    match execute(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}", err.to_json());
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> Result<ExitCode, CommandError> {
    let mut config = state::load_config(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    init_tracing(&config.logging.level);

    info!("Starting Sharescope v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Check => {
            let state = state::AppState::new(config)?;
            commands::check::run(&state)
        }
        Commands::Validate => Ok(commands::validate::run(&config.integration)),
        Commands::Lookup {
            values,
            entities,
            subsite,
            no_exact,
        } => {
            let state = state::AppState::new(config)?;
            let request = commands::lookup::LookupRequest {
                values,
                entities_file: entities,
                subsite,
                exact: !no_exact,
            };
            commands::lookup::run(&state, request).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_lookup() {
        let cli = Cli::try_parse_from([
            "sharescope",
            "--config",
            "/tmp/sharescope.toml",
            "lookup",
            "8.8.8.8",
            "example.com",
            "--subsite",
            "sites/soc",
            "--no-exact",
        ])
        .expect("valid command line");

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/sharescope.toml")));
        match cli.command {
            Commands::Lookup {
                values,
                entities,
                subsite,
                no_exact,
            } => {
                assert_eq!(values, vec!["8.8.8.8", "example.com"]);
                assert!(entities.is_none());
                assert_eq!(subsite.as_deref(), Some("sites/soc"));
                assert!(no_exact);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["sharescope", "validate", "--log-level", "debug"])
            .expect("valid command line");
        assert!(matches!(cli.command, Commands::Validate));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_missing_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["sharescope"]).is_err());
    }
}
