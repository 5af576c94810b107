use sharescope_core::IntegrationOptions;
use sharescope_lookup::Integration;
use std::process::ExitCode;

/// Print validation errors as a JSON array; fails when any are found.
pub fn run(options: &IntegrationOptions) -> ExitCode {
    let errors = Integration::validate_options(options);
    println!("{:#}", serde_json::json!(errors));

    if errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        tracing::warn!(count = errors.len(), "integration options are invalid");
        ExitCode::FAILURE
    }
}
