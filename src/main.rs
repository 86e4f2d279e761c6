//! message-parity CLI entry point.

use clap::Parser;

use message_parity::cli::{handle_error, load_config, Cli, Commands};
use message_parity::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let _logger = match LogConfig::try_from(&config.logging)
        .map_err(anyhow::Error::msg)
        .and_then(|log_config| LoggerImpl::init(&log_config))
    {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Run(args) => {
            message_parity::cli::commands::run::execute(args, config, cli.json).await
        }
        Commands::Ledger(args) => {
            message_parity::cli::commands::ledger::execute(args, config, cli.json).await
        }
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
