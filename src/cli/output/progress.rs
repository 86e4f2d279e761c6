//! Progress bar utilities using indicatif for terminal output
//!
//! The reconciliation engine reports progress as events; this module turns
//! them into a batch progress bar on stderr.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::services::ReconcileEvent;

/// Style template for the batch progress bar
const PROGRESS_TEMPLATE: &str =
    "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} batches {msg} (ETA: {eta})";

/// Progress bar characters for visual effect
const PROGRESS_CHARS: &str = "█▓▒░ ";

/// Create a standard progress bar with ETA calculation
///
/// # Arguments
/// * `total` - Total number of items to process
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_TEMPLATE) {
        pb.set_style(style.progress_chars(PROGRESS_CHARS));
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Render engine events until the sender side is dropped
pub async fn track_reconciliation(mut events: mpsc::UnboundedReceiver<ReconcileEvent>) {
    let mut bar: Option<ProgressBar> = None;

    while let Some(event) = events.recv().await {
        match event {
            ReconcileEvent::RunStarted { batch_count, .. } => {
                bar = Some(create_progress_bar(batch_count as u64));
            }
            ReconcileEvent::BatchStarted {
                batch_number,
                query_count,
            } => {
                if let Some(pb) = &bar {
                    pb.set_message(format!("batch {batch_number}: {query_count} queries"));
                }
            }
            ReconcileEvent::PhaseCompleted {
                batch_number,
                phase,
                hits,
            } => {
                if let Some(pb) = &bar {
                    pb.set_message(format!(
                        "batch {batch_number}: {} phase done, {hits} hits",
                        phase.as_str()
                    ));
                }
            }
            ReconcileEvent::BatchCompleted { ledger_size, .. } => {
                if let Some(pb) = &bar {
                    pb.inc(1);
                    pb.set_message(format!("ledger {ledger_size}"));
                }
            }
            ReconcileEvent::RunCompleted { stats } => {
                if let Some(pb) = bar.take() {
                    pb.finish_with_message(format!("{} queries reconciled", stats.queries));
                }
            }
        }
    }
}
