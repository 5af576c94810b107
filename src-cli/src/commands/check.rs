use crate::error::CommandError;
use crate::state::AppState;
use sharescope_lookup::Integration;
use std::process::ExitCode;

/// Report whether startup succeeded and the options are usable.
pub fn run(state: &AppState) -> Result<ExitCode, CommandError> {
    let errors = Integration::validate_options(&state.config.integration);

    let report = serde_json::json!({
        "status": if errors.is_empty() { "ok" } else { "invalid" },
        "version": env!("CARGO_PKG_VERSION"),
        "host": state.config.integration.host,
        "authMode": state.config.integration.auth_mode,
        "errors": errors,
    });
    println!("{report:#}");

    Ok(if errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
