//! `rulematch` binary: evaluate boolean keyword rules against documents.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use eyre::{Context, Result};

use rulematch_cli::cli::{Cli, Outcome, run};
use rulematch_cli::config::CliConfig;
use rulematch_cli::error::{CliError, exit_status};
use rulematch_cli::logging::init_logging;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match start(&cli) {
        Ok(Outcome::Clean) => ExitCode::SUCCESS,
        Ok(Outcome::Warnings(count)) => {
            tracing::warn!(count, "warnings reported in strict mode");
            ExitCode::FAILURE
        }
        Err(e) => {
            // No-op when the configured subscriber is already installed.
            init_logging(&CliConfig::default());
            tracing::error!("rulematch failed: {e:#}");
            ExitCode::from(exit_status(&e))
        }
    }
}

fn start(cli: &Cli) -> Result<Outcome> {
    let config = build_config(cli)?;
    init_logging(&config);
    execute(cli, &config)
}

fn build_config(cli: &Cli) -> Result<CliConfig, CliError> {
    let config = CliConfig::from_env()?;
    Ok(config.apply_overrides(cli.log_level, cli.max_document_bytes))
}

fn execute(cli: &Cli, config: &CliConfig) -> Result<Outcome> {
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    let outcome = run(cli, config, &mut writer)?;
    io::Write::flush(&mut writer).wrap_err("failed to flush output")?;
    Ok(outcome)
}
