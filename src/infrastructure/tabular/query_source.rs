//! Recorded query corpus read from a CSV request log.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::errors::{ParityError, ParityResult};
use crate::domain::models::{Query, QueryConfig};
use crate::domain::ports::QuerySource;

/// Reads one column of a CSV request log and strips the legacy path prefix
/// from each value.
pub struct CsvQuerySource {
    path: PathBuf,
    column: String,
    strip_prefix: String,
}

impl CsvQuerySource {
    /// Corpus at `path`, read with the column and prefix from `config`.
    pub fn new(path: impl Into<PathBuf>, config: &QueryConfig) -> Self {
        Self {
            path: path.into(),
            column: config.column.clone(),
            strip_prefix: config.strip_prefix.clone(),
        }
    }

    /// Location of the corpus file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn to_query(&self, raw: &str) -> Option<Query> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let fragment = raw.strip_prefix(self.strip_prefix.as_str()).unwrap_or(raw);
        Some(Query::new(fragment))
    }
}

impl QuerySource for CsvQuerySource {
    fn load_queries(&self) -> ParityResult<Vec<Query>> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| {
                ParityError::QuerySource(format!("cannot open {}: {e}", self.path.display()))
            })?;

        let column = reader
            .headers()
            .map_err(|e| ParityError::QuerySource(format!("unreadable header row: {e}")))?
            .iter()
            .position(|header| header.trim() == self.column)
            .ok_or_else(|| {
                ParityError::QuerySource(format!(
                    "column '{}' not found in {}",
                    self.column,
                    self.path.display()
                ))
            })?;

        let mut queries = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let line_num = idx + 2; // +1 for 0-index, +1 for header
            let record = record
                .map_err(|e| ParityError::QuerySource(format!("line {line_num}: {e}")))?;
            if let Some(query) = record.get(column).and_then(|raw| self.to_query(raw)) {
                queries.push(query);
            }
        }

        info!(path = %self.path.display(), queries = queries.len(), "loaded query corpus");
        Ok(queries)
    }
}
