//! Table output formatting for CLI commands
//!
//! Renders ledger entries and run statistics using comfy-table.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use super::truncate;
use crate::domain::models::MessageRecord;
use crate::services::{EndpointStats, VerificationSummary};

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<u16>,
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl TableFormatter {
    /// Formatter with colors when the terminal supports them.
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    /// Formatter with explicit color and width settings.
    pub const fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// Format ledger entries as a table
    pub fn format_ledger(&self, entries: &[MessageRecord]) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            Cell::new("Show").add_attribute(Attribute::Bold),
            Cell::new("Type").add_attribute(Attribute::Bold),
            Cell::new("Subtype").add_attribute(Attribute::Bold),
            Cell::new("Long Description").add_attribute(Attribute::Bold),
            Cell::new("Action").add_attribute(Attribute::Bold),
        ]);

        for entry in entries {
            table.add_row(vec![
                Cell::new(truncate(&entry.show, 24)),
                Cell::new(&entry.message_type),
                Cell::new(&entry.subtype),
                Cell::new(truncate(entry.long_description.trim(), 60)),
                Cell::new(truncate(&entry.action_text, 20)),
            ]);
        }

        table.to_string()
    }

    /// Format per-endpoint fetch outcomes as a table
    pub fn format_endpoint_stats(&self, rows: &[(&str, EndpointStats)]) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            Cell::new("Endpoint").add_attribute(Attribute::Bold),
            Cell::new("Hits").add_attribute(Attribute::Bold),
            Cell::new("Empty").add_attribute(Attribute::Bold),
            Cell::new("Failures").add_attribute(Attribute::Bold),
        ]);

        for (label, stats) in rows {
            let failures = if self.use_colors && stats.failures > 0 {
                Cell::new(stats.failures).fg(Color::Red)
            } else {
                Cell::new(stats.failures)
            };
            table.add_row(vec![
                Cell::new(label),
                Cell::new(stats.hits),
                Cell::new(stats.empty),
                failures,
            ]);
        }

        table.to_string()
    }

    /// Format the verification outcome as a one-row table
    pub fn format_verification(&self, summary: &VerificationSummary) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            Cell::new("Completed").add_attribute(Attribute::Bold),
            Cell::new("Matched").add_attribute(Attribute::Bold),
            Cell::new("Mismatched").add_attribute(Attribute::Bold),
            Cell::new("Gaps").add_attribute(Attribute::Bold),
        ]);

        let (matched, mismatched) = if self.use_colors {
            (
                Cell::new(summary.matched).fg(Color::Green),
                Cell::new(summary.mismatched).fg(if summary.mismatched > 0 {
                    Color::Red
                } else {
                    Color::Green
                }),
            )
        } else {
            (Cell::new(summary.matched), Cell::new(summary.mismatched))
        };

        table.add_row(vec![
            Cell::new(summary.completed),
            matched,
            mismatched,
            Cell::new(summary.gaps),
        ]);

        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();

        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(width);
        }

        table
    }
}

/// Check if terminal supports colors
fn supports_color() -> bool {
    // Respect NO_COLOR environment variable
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    true
}
