//! Configuration model.

use serde::{Deserialize, Serialize};

use super::payload::UnwrapStrategy;

/// Main configuration structure for a parity run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Endpoint being retired
    #[serde(default = "default_legacy_endpoint")]
    pub legacy: EndpointConfig,

    /// Endpoint being validated
    #[serde(default = "default_replacement_endpoint")]
    pub replacement: EndpointConfig,

    /// Queries fetched concurrently per phase (1-1000)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpConfig,

    /// Input and output file locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Query corpus parsing
    #[serde(default)]
    pub query: QueryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

const fn default_batch_size() -> usize {
    50
}

impl Default for Config {
    fn default() -> Self {
        Self {
            legacy: default_legacy_endpoint(),
            replacement: default_replacement_endpoint(),
            batch_size: default_batch_size(),
            http: HttpConfig::default(),
            paths: PathsConfig::default(),
            query: QueryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// One message API endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EndpointConfig {
    /// Short label used in logs and report headers (e.g. V2)
    pub label: String,

    /// Base URL the query fragment is appended to
    pub base_url: String,

    /// How the response body is reduced to a payload
    #[serde(default)]
    pub unwrap: UnwrapStrategy,
}

impl EndpointConfig {
    /// Endpoint with the given label, base URL and unwrap strategy.
    pub fn new(label: impl Into<String>, base_url: impl Into<String>, unwrap: UnwrapStrategy) -> Self {
        Self {
            label: label.into(),
            base_url: base_url.into(),
            unwrap,
        }
    }

    /// Full request URL for `query`.
    pub fn url_for(&self, query: &str) -> String {
        format!("{}{}", self.base_url, query)
    }
}

fn default_legacy_endpoint() -> EndpointConfig {
    EndpointConfig::new(
        "V2",
        "https://pbskids.org/kidsactivity/messages/v2/messages.json",
        UnwrapStrategy::Legacy,
    )
}

fn default_replacement_endpoint() -> EndpointConfig {
    EndpointConfig::new(
        "V3",
        "http://cms-dev.pbskids.org/api/messages/v3/messages.json",
        UnwrapStrategy::First,
    )
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Idle connections kept per host
    #[serde(default = "default_pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,
}

const fn default_timeout_secs() -> u64 {
    6000
}

const fn default_pool_max_idle_per_host() -> usize {
    50
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            pool_max_idle_per_host: default_pool_max_idle_per_host(),
        }
    }
}

/// Input and output file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PathsConfig {
    /// Recorded query corpus (CSV)
    #[serde(default = "default_queries_path")]
    pub queries: String,

    /// Missing-message ledger carried between runs (CSV)
    #[serde(default = "default_ledger_path")]
    pub ledger: String,

    /// Comparison report written at the end of a run (CSV)
    #[serde(default = "default_report_path")]
    pub report: String,
}

fn default_queries_path() -> String {
    "resources/queries.csv".to_string()
}

fn default_ledger_path() -> String {
    "resources/missingMessages.csv".to_string()
}

fn default_report_path() -> String {
    "resources/results.csv".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            queries: default_queries_path(),
            ledger: default_ledger_path(),
            report: default_report_path(),
        }
    }
}

/// Query corpus parsing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct QueryConfig {
    /// Column holding the recorded request path
    #[serde(default = "default_query_column")]
    pub column: String,

    /// Prefix stripped from each recorded request to obtain the query fragment
    #[serde(default = "default_strip_prefix")]
    pub strip_prefix: String,
}

fn default_query_column() -> String {
    "request".to_string()
}

fn default_strip_prefix() -> String {
    "/kidsactivity/messages/v2/messages.json".to_string()
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            column: default_query_column(),
            strip_prefix: default_strip_prefix(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files (stderr only when unset)
    #[serde(default)]
    pub log_dir: Option<String>,

    /// Rotation for file output: daily, hourly, never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}
