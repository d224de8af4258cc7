use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tierwise_cli::logging::init_logging;
use tierwise_cli::Cli;
use tierwise_core::config::{AppConfig, LoggingConfig};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // A broken config is reported by the command itself; logging falls back to defaults.
    let options = cli.load_options();
    let mut logging = AppConfig::load(options.clone())
        .map(|config| config.logging)
        .unwrap_or_else(|_| AppConfig::default().logging);
    apply_flag_overrides(&mut logging, &cli);
    init_logging(&logging).context("logging setup")?;

    tracing::debug!(
        event_name = "cli.invocation.started",
        config_path = ?options.config_path,
        "tierwise invoked"
    );

    Ok(tierwise_cli::run(cli))
}

fn apply_flag_overrides(logging: &mut LoggingConfig, cli: &Cli) {
    if let Some(level) = &cli.log_level {
        logging.level = level.clone();
    }
    if let Some(format) = cli.log_format {
        logging.format = format;
    }
}
