//! CSV persistence for the missing-message ledger.
//!
//! Columns: show, type, subtype, long_description, short_description,
//! content, action_text.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::errors::{ParityError, ParityResult};
use crate::domain::models::MessageRecord;
use crate::domain::ports::LedgerStore;

/// Header row of the ledger file, in column order.
pub const LEDGER_COLUMNS: [&str; 7] = [
    "show",
    "type",
    "subtype",
    "long_description",
    "short_description",
    "content",
    "action_text",
];

/// CSV row of the ledger
///
/// Flat mirror of [`MessageRecord`] without the legacy-only slug and title.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerRow {
    /// `show` column.
    pub show: String,
    /// `type` column.
    #[serde(rename = "type")]
    pub message_type: String,
    /// `subtype` column.
    pub subtype: String,
    /// `long_description` column, the identity of the entry.
    pub long_description: String,
    /// `short_description` column.
    pub short_description: String,
    /// `content` column.
    pub content: String,
    /// `action_text` column.
    pub action_text: String,
}

impl From<&MessageRecord> for LedgerRow {
    fn from(message: &MessageRecord) -> Self {
        Self {
            show: message.show.clone(),
            message_type: message.message_type.clone(),
            subtype: message.subtype.clone(),
            long_description: message.long_description.clone(),
            short_description: message.short_description.clone(),
            content: message.content.clone(),
            action_text: message.action_text.clone(),
        }
    }
}

impl From<LedgerRow> for MessageRecord {
    fn from(row: LedgerRow) -> Self {
        Self {
            show: row.show,
            message_type: row.message_type,
            subtype: row.subtype,
            long_description: row.long_description,
            short_description: row.short_description,
            content: row.content,
            action_text: row.action_text,
            ..Default::default()
        }
    }
}

/// Ledger stored as a CSV file, replaced wholesale on save.
pub struct CsvLedgerStore {
    path: PathBuf,
}

impl CsvLedgerStore {
    /// Ledger file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the ledger file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl LedgerStore for CsvLedgerStore {
    fn load(&self) -> ParityResult<Vec<MessageRecord>> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "no ledger found, starting empty");
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let headers = reader.headers().map_err(|e| ParityError::LedgerCorruption {
            line: 1,
            reason: e.to_string(),
        })?;
        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let present: HashSet<&str> = headers.iter().map(str::trim).collect();
        let missing: Vec<&str> = LEDGER_COLUMNS
            .iter()
            .copied()
            .filter(|column| !present.contains(column))
            .collect();
        if !missing.is_empty() {
            return Err(ParityError::LedgerCorruption {
                line: 1,
                reason: format!("missing required columns: {}", missing.join(", ")),
            });
        }

        let mut entries = Vec::new();
        for (idx, result) in reader.deserialize::<LedgerRow>().enumerate() {
            let row = result.map_err(|e| ParityError::LedgerCorruption {
                line: e
                    .position()
                    .map_or(idx as u64 + 2, csv::Position::line),
                reason: e.to_string(),
            })?;
            entries.push(row.into());
        }

        info!(path = %self.path.display(), entries = entries.len(), "loaded missing ledger");
        Ok(entries)
    }

    fn save(&self, entries: &[MessageRecord]) -> ParityResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.temp_path();
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_path(&temp_path)?;
            writer.write_record(LEDGER_COLUMNS)?;
            for entry in entries {
                writer.serialize(LedgerRow::from(entry))?;
            }
            writer.flush()?;
        }
        fs::rename(&temp_path, &self.path)?;

        info!(path = %self.path.display(), entries = entries.len(), "saved missing ledger");
        Ok(())
    }
}
