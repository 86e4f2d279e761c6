//! HTTP adapter for the message API endpoints.

pub mod client;
pub mod errors;

pub use client::{HttpClientConfig, HttpEndpointClient};
