//! Message API HTTP client implementation

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::domain::errors::FetchError;
use crate::domain::models::{EndpointConfig, HttpConfig, Payload};
use crate::domain::ports::EndpointClient;

/// HTTP client shared by both endpoint versions
///
/// Features:
/// - Connection pooling and reuse (via reqwest::Client)
/// - Long per-request timeout, since corpus completeness matters more than latency
/// - No retries: a failed fetch is reported once and treated as empty upstream
pub struct HttpEndpointClient {
    /// Reusable HTTP client with connection pooling
    http_client: ReqwestClient,
}

impl HttpEndpointClient {
    /// Create a client with default configuration
    ///
    /// # Default Configuration
    /// - Timeout: 6000 seconds
    /// - Idle connections per host: 50
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a client with custom configuration
    ///
    /// # Returns
    /// * `Ok(HttpEndpointClient)` - Successfully created client
    /// * `Err(anyhow::Error)` - Failed to build HTTP client
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .tcp_nodelay(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http_client })
    }

    /// Send a GET and decode the JSON body
    ///
    /// Anything but a 200 is an error; the body of a failed response is not read.
    async fn send_request(&self, url: &str) -> Result<Value, FetchError> {
        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(status.into());
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl EndpointClient for HttpEndpointClient {
    #[instrument(skip(self, endpoint), fields(endpoint = %endpoint.label))]
    async fn fetch(
        &self,
        endpoint: &EndpointConfig,
        query: &str,
    ) -> Result<Option<Payload>, FetchError> {
        let url = endpoint.url_for(query);
        let body = self.send_request(&url).await?;
        debug!(%url, "request succeeded");
        endpoint.unwrap.extract(&body)
    }
}

/// Configuration for the message API client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Idle connections kept per host
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self::from(&HttpConfig::default())
    }
}

impl From<&HttpConfig> for HttpClientConfig {
    fn from(config: &HttpConfig) -> Self {
        Self {
            timeout_secs: config.timeout_secs,
            pool_max_idle_per_host: config.pool_max_idle_per_host,
        }
    }
}
