//! Port for fetching messages from an endpoint.

use async_trait::async_trait;

use crate::domain::errors::FetchError;
use crate::domain::models::{EndpointConfig, Payload};

/// Client interface for the message API endpoints
///
/// One implementation serves both endpoint versions; the endpoint's
/// [`UnwrapStrategy`](crate::domain::models::UnwrapStrategy) decides how the
/// response body is reduced.
#[async_trait]
pub trait EndpointClient: Send + Sync {
    /// Fetch the message payload for `query` from `endpoint`
    ///
    /// # Returns
    /// * `Ok(Some(payload))` - Endpoint answered 200 with at least one message
    /// * `Ok(None)` - Endpoint answered 200 with an empty message list
    /// * `Err(FetchError)` - Non-200 status, timeout, transport or decode failure
    async fn fetch(&self, endpoint: &EndpointConfig, query: &str) -> Result<Option<Payload>, FetchError>;
}
