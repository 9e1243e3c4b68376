//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use tracing_subscriber::EnvFilter;

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    match barri_cli::run() {
        Err(barri_cli::CliError::ArgumentParsing(err)) => err.exit(),
        outcome => Ok(outcome?),
    }
}
