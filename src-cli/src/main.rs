use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    sharescope_app::run(sharescope_app::Cli::parse()).await
}
