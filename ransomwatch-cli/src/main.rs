//! ransomwatch CLI -- scans DNS and proxy logs for ransomware indicators

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;

use ransomwatch_core::config::{GeneralConfig, RansomwatchConfig};

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

/// Log levels accepted by `--log-level`.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    // `config` loads the file itself so that validation can report errors
    let loaded = RansomwatchConfig::load_or_default(&cli.config).await;

    let mut general = match &loaded {
        Ok(config) => config.general.clone(),
        Err(_) => GeneralConfig::default(),
    };
    if let Some(level) = cli.log_level {
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(CliError::Config(format!(
                "invalid log level '{}' (expected: {})",
                level,
                LOG_LEVELS.join(", ")
            )));
        }
        general.log_level = level;
    }
    logging::init_tracing(&general).map_err(|e| CliError::Config(e.to_string()))?;

    tracing::debug!(config = %cli.config.display(), "ransomwatch starting");

    match cli.command {
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
        Commands::Scan(args) => commands::scan::execute(args, &loaded?, &writer).await,
        Commands::Report(args) => commands::report::execute(args, &loaded?, &writer).await,
        Commands::Blocklist(args) => commands::blocklist::execute(args, &loaded?, &writer).await,
    }
}
