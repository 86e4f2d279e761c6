//! CSV adapters for the query corpus, missing ledger and comparison report.

pub mod ledger_store;
pub mod query_source;
pub mod report_sink;

pub use ledger_store::{CsvLedgerStore, LedgerRow, LEDGER_COLUMNS};
pub use query_source::CsvQuerySource;
pub use report_sink::CsvReportSink;
