//! Layered configuration loading with figment.

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::{Config, EndpointConfig};

/// Largest batch accepted; bounds concurrent requests per endpoint.
pub const MAX_BATCH_SIZE: usize = 1000;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Batch size out of range.
    #[error("Invalid batch_size: {0}. Must be between 1 and 1000")]
    InvalidBatchSize(usize),

    /// Endpoint base URL is not http(s).
    #[error("Invalid base_url for endpoint '{label}': {url}")]
    InvalidBaseUrl {
        /// Label of the offending endpoint.
        label: String,
        /// The rejected URL.
        url: String,
    },

    /// Endpoint label is blank.
    #[error("Endpoint label cannot be empty")]
    EmptyEndpointLabel,

    /// Timeout of zero seconds.
    #[error("Invalid timeout_secs: {0}. Must be at least 1")]
    InvalidTimeout(u64),

    /// Unknown log level.
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// Unknown log format.
    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    /// Unknown rotation policy.
    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    /// A configured file path is blank.
    #[error("Path for {0} cannot be empty")]
    EmptyPath(&'static str),

    /// The corpus column name is blank.
    #[error("Query column cannot be empty")]
    EmptyQueryColumn,
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .parity/config.yaml (project config)
    /// 3. .parity/local.yaml (local overrides, optional)
    /// 4. Environment variables (PARITY_* prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".parity/config.yaml"))
            .merge(Yaml::file(".parity/local.yaml"))
            .merge(Env::prefixed("PARITY_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honoring environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("PARITY_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.batch_size == 0 || config.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::InvalidBatchSize(config.batch_size));
        }

        Self::validate_endpoint(&config.legacy)?;
        Self::validate_endpoint(&config.replacement)?;

        if config.http.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(config.http.timeout_secs));
        }

        for (name, path) in [
            ("queries", &config.paths.queries),
            ("ledger", &config.paths.ledger),
            ("report", &config.paths.report),
        ] {
            if path.trim().is_empty() {
                return Err(ConfigError::EmptyPath(name));
            }
        }

        if config.query.column.trim().is_empty() {
            return Err(ConfigError::EmptyQueryColumn);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        Ok(())
    }

    fn validate_endpoint(endpoint: &EndpointConfig) -> Result<(), ConfigError> {
        if endpoint.label.trim().is_empty() {
            return Err(ConfigError::EmptyEndpointLabel);
        }
        let url = endpoint.base_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl {
                label: endpoint.label.clone(),
                url: url.to_string(),
            });
        }
        Ok(())
    }
}
