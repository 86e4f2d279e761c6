//! `run` command: one full parity audit.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::application::{AuditRunner, AuditSummary};
use crate::cli::output::table::TableFormatter;
use crate::cli::output::{output, truncate, CommandOutput};
use crate::cli::track_reconciliation;
use crate::domain::models::{ComparisonRecord, Config, RecordState};
use crate::infrastructure::http::{HttpClientConfig, HttpEndpointClient};
use crate::infrastructure::tabular::{CsvLedgerStore, CsvQuerySource, CsvReportSink};
use crate::services::{EngineConfig, ReconciliationEngine};

/// Arguments of the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Query corpus CSV (overrides paths.queries)
    #[arg(long)]
    pub queries: Option<PathBuf>,

    /// Missing-message ledger CSV (overrides paths.ledger)
    #[arg(long)]
    pub ledger: Option<PathBuf>,

    /// Report CSV to write (overrides paths.report)
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Queries fetched concurrently per phase
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Skip field comparison; every record is reported unmatched
    #[arg(long)]
    pub skip_verify: bool,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Query whose replacement answer differs from the legacy one.
#[derive(Debug, Serialize)]
pub struct MismatchOutput {
    /// The query fragment.
    pub query: String,
    /// Fields that differ.
    pub fields: Vec<&'static str>,
}

/// Result of the `run` command.
#[derive(Debug, Serialize)]
pub struct RunOutput {
    /// Label of the legacy endpoint.
    pub legacy_label: String,
    /// Label of the replacement endpoint.
    pub replacement_label: String,
    /// Where the report was written.
    pub report_path: String,
    /// Where the ledger was written.
    pub ledger_path: String,
    /// Audit counters.
    pub summary: AuditSummary,
    /// Completed records with differing fields.
    pub mismatches: Vec<MismatchOutput>,
    /// Queries the legacy endpoint answered but the replacement did not.
    pub unanswered: Vec<String>,
}

impl RunOutput {
    fn mismatches_of(records: &[ComparisonRecord]) -> Vec<MismatchOutput> {
        records
            .iter()
            .filter(|r| r.state() == RecordState::Completed && !r.mismatched_fields.is_empty())
            .map(|r| MismatchOutput {
                query: r.query.to_string(),
                fields: r.mismatched_fields.clone(),
            })
            .collect()
    }

    fn unanswered_of(records: &[ComparisonRecord]) -> Vec<String> {
        records
            .iter()
            .filter(|r| r.state() == RecordState::Created)
            .map(|r| r.query.to_string())
            .collect()
    }
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        let formatter = TableFormatter::new();
        let stats = &self.summary.stats;

        let mut lines = vec![
            format!(
                "Audited {} queries in {} batch(es) ({} duplicate(s) skipped)",
                stats.queries, stats.batches, stats.duplicate_queries
            ),
            String::new(),
            formatter.format_endpoint_stats(&[
                (self.legacy_label.as_str(), stats.legacy),
                (self.replacement_label.as_str(), stats.replacement),
            ]),
        ];

        if let Some(verification) = &self.summary.verification {
            lines.push(String::new());
            lines.push(formatter.format_verification(verification));
            lines.push(format!(
                "Match rate: {:.1}%",
                verification.match_rate() * 100.0
            ));
        }

        if !self.mismatches.is_empty() {
            lines.push(String::new());
            lines.push(format!("Mismatched queries ({}):", self.mismatches.len()));
            for mismatch in &self.mismatches {
                lines.push(format!(
                    "  {:<60} {}",
                    truncate(&mismatch.query, 58),
                    mismatch.fields.join(", ")
                ));
            }
        }

        if !self.unanswered.is_empty() {
            lines.push(String::new());
            lines.push(format!(
                "Unanswered by {} ({}):",
                self.replacement_label,
                self.unanswered.len()
            ));
            for query in &self.unanswered {
                lines.push(format!("  {}", truncate(query, 78)));
            }
        }

        lines.push(String::new());
        if stats.lookup_gaps > 0 {
            lines.push(format!(
                "{} {} answer(s) had no {} record and were left out of the report",
                stats.lookup_gaps, self.replacement_label, self.legacy_label
            ));
        }
        lines.push(format!(
            "Ledger: {} missing message(s) (+{} added, -{} resolved) -> {}",
            self.summary.ledger_size, stats.ledger_added, stats.ledger_resolved, self.ledger_path
        ));
        lines.push(format!(
            "Report: {} row(s) -> {}",
            self.summary.records, self.report_path
        ));

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Apply command-line overrides on top of the loaded configuration.
fn apply_overrides(config: &mut Config, args: &RunArgs) {
    if let Some(path) = &args.queries {
        config.paths.queries = path.display().to_string();
    }
    if let Some(path) = &args.ledger {
        config.paths.ledger = path.display().to_string();
    }
    if let Some(path) = &args.report {
        config.paths.report = path.display().to_string();
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
}

/// Run one audit and print its summary.
pub async fn execute(args: RunArgs, mut config: Config, json_mode: bool) -> Result<()> {
    apply_overrides(&mut config, &args);
    crate::infrastructure::config::ConfigLoader::validate(&config)
        .context("Invalid configuration after applying command-line overrides")?;

    let client = HttpEndpointClient::with_config(HttpClientConfig::from(&config.http))?;
    let engine_config = EngineConfig::new(config.legacy.clone(), config.replacement.clone())
        .with_batch_size(config.batch_size);
    let mut engine = ReconciliationEngine::new(Arc::new(client), engine_config);

    let progress = if json_mode || args.no_progress {
        None
    } else {
        let (tx, rx) = mpsc::unbounded_channel();
        engine = engine.with_events(tx);
        Some(tokio::spawn(track_reconciliation(rx)))
    };

    let runner = AuditRunner::new(
        engine,
        Arc::new(CsvQuerySource::new(&config.paths.queries, &config.query)),
        Arc::new(CsvLedgerStore::new(&config.paths.ledger)),
        Arc::new(CsvReportSink::new(
            &config.paths.report,
            &config.legacy.label,
            &config.replacement.label,
        )),
    )
    .with_verification(!args.skip_verify);

    let result = runner.run().await;
    // Dropping the runner closes the event channel so the progress task ends.
    drop(runner);
    if let Some(handle) = progress {
        let _ = handle.await;
    }
    let outcome = result.context("Parity audit failed")?;

    let run_output = RunOutput {
        legacy_label: config.legacy.label.clone(),
        replacement_label: config.replacement.label.clone(),
        report_path: config.paths.report.clone(),
        ledger_path: config.paths.ledger.clone(),
        mismatches: RunOutput::mismatches_of(&outcome.records),
        unanswered: RunOutput::unanswered_of(&outcome.records),
        summary: outcome.summary,
    };
    output(&run_output, json_mode);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{MessageRecord, Payload, Query};

    fn record(query: &str, replacement: Option<&str>, fields: Vec<&'static str>) -> ComparisonRecord {
        let message = |desc: &str| MessageRecord {
            long_description: desc.to_string(),
            ..Default::default()
        };
        let mut record = ComparisonRecord::created(Query::new(query), Payload::Single(message("a")));
        if let Some(desc) = replacement {
            record.complete(Payload::Single(message(desc)));
        }
        record.mismatched_fields = fields;
        record
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default();
        let args = RunArgs {
            queries: Some(PathBuf::from("corpus.csv")),
            ledger: None,
            report: Some(PathBuf::from("out/report.csv")),
            batch_size: Some(7),
            skip_verify: false,
            no_progress: true,
        };

        apply_overrides(&mut config, &args);

        assert_eq!(config.paths.queries, "corpus.csv");
        assert_eq!(config.paths.ledger, "resources/missingMessages.csv");
        assert_eq!(config.paths.report, "out/report.csv");
        assert_eq!(config.batch_size, 7);
    }

    #[test]
    fn test_mismatches_and_unanswered() {
        let records = vec![
            record("?a", Some("a"), vec![]),
            record("?b", Some("b"), vec!["long_description"]),
            record("?c", None, vec![]),
        ];

        let mismatches = RunOutput::mismatches_of(&records);
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].query, "?b");
        assert_eq!(mismatches[0].fields, vec!["long_description"]);

        assert_eq!(RunOutput::unanswered_of(&records), vec!["?c".to_string()]);
    }
}
