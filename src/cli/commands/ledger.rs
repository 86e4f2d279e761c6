//! `ledger` command: inspect the persisted missing-message ledger.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::output::table::TableFormatter;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, MessageRecord, MissingLedger};
use crate::domain::ports::LedgerStore;
use crate::infrastructure::tabular::CsvLedgerStore;

/// Arguments of the `ledger` command.
#[derive(Args, Debug)]
pub struct LedgerArgs {
    /// Ledger CSV to read (overrides paths.ledger)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Maximum entries to display
    #[arg(short, long, default_value = "50")]
    pub limit: usize,
}

/// Result of the `ledger` command.
#[derive(Debug, Serialize)]
pub struct LedgerOutput {
    /// Ledger file read.
    pub path: String,
    /// Entries in the ledger.
    pub total: usize,
    /// Rows ignored for repeating an identity key.
    pub duplicates_dropped: usize,
    /// Entries shown, up to the limit.
    pub entries: Vec<MessageRecord>,
}

impl CommandOutput for LedgerOutput {
    fn to_human(&self) -> String {
        if self.total == 0 {
            return format!("No missing messages recorded in {}.", self.path);
        }

        let mut lines = vec![
            format!("Missing messages in {} ({} total):", self.path, self.total),
            TableFormatter::new().format_ledger(&self.entries),
        ];

        if self.entries.len() < self.total {
            lines.push(format!(
                "Showing {} of {} entries",
                self.entries.len(),
                self.total
            ));
        }
        if self.duplicates_dropped > 0 {
            lines.push(format!(
                "{} repeated entr{} ignored",
                self.duplicates_dropped,
                if self.duplicates_dropped == 1 { "y" } else { "ies" }
            ));
        }

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Load the ledger and print it.
pub async fn execute(args: LedgerArgs, config: Config, json_mode: bool) -> Result<()> {
    let path = args
        .path
        .unwrap_or_else(|| PathBuf::from(&config.paths.ledger));
    let store = CsvLedgerStore::new(&path);

    let (ledger, duplicates_dropped) = MissingLedger::from_entries(
        store
            .load()
            .with_context(|| format!("Failed to read ledger {}", path.display()))?,
    );

    let total = ledger.len();
    let ledger_output = LedgerOutput {
        path: path.display().to_string(),
        total,
        duplicates_dropped,
        entries: ledger.into_entries().into_iter().take(args.limit).collect(),
    };
    output(&ledger_output, json_mode);

    Ok(())
}
