//! Recorded queries replayed against both endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Path and query fragment appended to an endpoint base URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query(String);

impl Query {
    /// Wrap a fragment such as `?show=arthur`.
    pub fn new(fragment: impl Into<String>) -> Self {
        Self(fragment.into())
    }

    /// The raw fragment.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Query {
    fn from(fragment: &str) -> Self {
        Self::new(fragment)
    }
}

impl From<String> for Query {
    fn from(fragment: String) -> Self {
        Self(fragment)
    }
}
