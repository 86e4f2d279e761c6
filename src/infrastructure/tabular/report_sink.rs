//! CSV writer for the comparison report.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::errors::ParityResult;
use crate::domain::models::ComparisonRecord;
use crate::domain::ports::ReportSink;

/// Writes the comparison report as CSV, one row per record.
///
/// Header labels come from the endpoint labels, e.g. `V2 RESULT`.
pub struct CsvReportSink {
    path: PathBuf,
    legacy_label: String,
    replacement_label: String,
}

impl CsvReportSink {
    /// Report at `path`, with result columns named after the endpoint labels.
    pub fn new(
        path: impl Into<PathBuf>,
        legacy_label: impl Into<String>,
        replacement_label: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            legacy_label: legacy_label.into(),
            replacement_label: replacement_label.into(),
        }
    }

    /// Location of the report file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Header row of the report.
    pub fn headers(&self) -> [String; 5] {
        [
            "QUERY".to_string(),
            format!("{} RESULT", self.legacy_label),
            format!("{} RESULT", self.replacement_label),
            format!("{} == {}?", self.legacy_label, self.replacement_label),
            "MISMATCHED FIELDS".to_string(),
        ]
    }
}

impl ReportSink for CsvReportSink {
    fn write_report(&self, records: &[ComparisonRecord]) -> ParityResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(self.headers())?;

        for record in records {
            let replacement = match &record.replacement {
                Some(payload) => payload.to_json()?,
                None => String::new(),
            };
            writer.write_record([
                record.query.as_str(),
                record.legacy.to_json()?.as_str(),
                replacement.as_str(),
                if record.matched { "true" } else { "false" },
                record.mismatched_fields.join(";").as_str(),
            ])?;
        }
        writer.flush()?;

        info!(path = %self.path.display(), rows = records.len(), "wrote comparison report");
        Ok(())
    }
}
