//! Common test utilities for integration tests
//!
//! Provides a scripted endpoint client and temp-dir fixtures shared across
//! the integration test files.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use message_parity::domain::models::{EndpointConfig, MessageRecord, Payload, UnwrapStrategy};
use message_parity::domain::ports::EndpointClient;
use message_parity::services::EngineConfig;
use message_parity::FetchError;
use serde_json::Value;
use tempfile::TempDir;

pub const LEGACY: &str = "V2";
pub const REPLACEMENT: &str = "V3";

/// Create a temporary directory for test isolation
///
/// Returns a TempDir that will be cleaned up when dropped.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Write `contents` to `name` inside `dir` and return the full path.
pub fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("Failed to write fixture");
    path
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn engine_config(batch_size: usize) -> EngineConfig {
    EngineConfig::new(
        EndpointConfig::new(LEGACY, "http://legacy.test/messages.json", UnwrapStrategy::Legacy),
        EndpointConfig::new(
            REPLACEMENT,
            "http://replacement.test/messages.json",
            UnwrapStrategy::First,
        ),
    )
    .with_batch_size(batch_size)
}

pub fn message(long_description: &str) -> MessageRecord {
    MessageRecord {
        show: "Nature Cat".to_string(),
        message_type: "promo".to_string(),
        subtype: "video".to_string(),
        long_description: long_description.to_string(),
        short_description: "short".to_string(),
        content: "content".to_string(),
        action_text: "Watch".to_string(),
        ..Default::default()
    }
}

pub fn single(long_description: &str) -> Payload {
    Payload::Single(message(long_description))
}

/// One entry of the call log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Start { endpoint: String, query: String },
    End { endpoint: String, query: String },
}

impl Call {
    pub fn endpoint(&self) -> &str {
        match self {
            Call::Start { endpoint, .. } | Call::End { endpoint, .. } => endpoint,
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self, Call::Start { .. })
    }
}

/// Endpoint client answering from a fixed script.
///
/// Unscripted (endpoint, query) pairs answer with an empty result. Raw
/// bodies go through the endpoint's unwrap strategy at fetch time. Every
/// fetch logs a start and an end with a yield in between, so concurrent
/// fetches interleave in the log.
#[derive(Default)]
pub struct ScriptedClient {
    script: HashMap<(String, String), Result<Option<Payload>, FetchError>>,
    bodies: HashMap<(String, String), Value>,
    log: Mutex<Vec<Call>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, endpoint: &str, query: &str, payload: Payload) -> Self {
        self.script
            .insert((endpoint.to_string(), query.to_string()), Ok(Some(payload)));
        self
    }

    pub fn respond_body(mut self, endpoint: &str, query: &str, body: Value) -> Self {
        self.bodies
            .insert((endpoint.to_string(), query.to_string()), body);
        self
    }

    pub fn fail(mut self, endpoint: &str, query: &str, err: FetchError) -> Self {
        self.script
            .insert((endpoint.to_string(), query.to_string()), Err(err));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.calls().iter().filter(|call| call.is_start()).count()
    }
}

#[async_trait]
impl EndpointClient for ScriptedClient {
    async fn fetch(
        &self,
        endpoint: &EndpointConfig,
        query: &str,
    ) -> Result<Option<Payload>, FetchError> {
        self.log.lock().unwrap().push(Call::Start {
            endpoint: endpoint.label.clone(),
            query: query.to_string(),
        });
        tokio::task::yield_now().await;
        let key = (endpoint.label.clone(), query.to_string());
        let result = match self.bodies.get(&key) {
            Some(body) => endpoint.unwrap.extract(body),
            None => self.script.get(&key).cloned().unwrap_or(Ok(None)),
        };
        self.log.lock().unwrap().push(Call::End {
            endpoint: endpoint.label.clone(),
            query: query.to_string(),
        });
        result
    }
}
