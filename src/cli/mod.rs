//! Command-line interface for the parity auditor.

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

pub use output::progress::{create_progress_bar, track_reconciliation};

/// Top-level command line.
#[derive(Parser, Debug)]
#[command(name = "message-parity")]
#[command(about = "Audit a replacement message API against the legacy one", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to .parity/config.yaml and .parity/local.yaml)
    #[arg(short, long, global = true, env = "PARITY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay the query corpus against both endpoints and write the report
    Run(commands::run::RunArgs),
    /// Show the persisted missing-message ledger
    Ledger(commands::ledger::LedgerArgs),
}

/// Load configuration from an explicit file or the default hierarchy.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Print `err` and exit with status 1.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let chain: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
        let body = serde_json::json!({
            "success": false,
            "error": err.to_string(),
            "causes": chain,
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
