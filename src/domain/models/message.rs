//! Message records returned by the message API and their identity key.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Normalized message returned by one endpoint fetch.
///
/// Every field is a string. Missing, `null` and non-string JSON values are
/// normalized so that absence is always the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Content title the message was attached to (legacy payloads only)
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "String::is_empty")]
    pub show: String,

    /// Message slug (legacy payloads only)
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "String::is_empty")]
    pub slug: String,

    /// Message title (legacy payloads only)
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "String::is_empty")]
    pub title: String,

    /// Message type, `type` on the wire
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub message_type: String,

    /// Message subtype
    #[serde(default, deserialize_with = "lenient_string")]
    pub subtype: String,

    /// Long description, the message's identity once trimmed
    #[serde(default, deserialize_with = "lenient_string")]
    pub long_description: String,

    /// Short description
    #[serde(default, deserialize_with = "lenient_string")]
    pub short_description: String,

    /// Content body
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: String,

    /// Call-to-action label
    #[serde(default, deserialize_with = "lenient_string")]
    pub action_text: String,
}

impl MessageRecord {
    /// Identity of this message across endpoint versions.
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey::from_description(&self.long_description)
    }

    /// Fields compared when checking parity, in report order.
    pub fn comparable_fields(&self) -> [(&'static str, &str); 8] {
        [
            ("slug", self.slug.as_str()),
            ("title", self.title.as_str()),
            ("type", self.message_type.as_str()),
            ("subtype", self.subtype.as_str()),
            ("long_description", self.long_description.as_str()),
            ("short_description", self.short_description.as_str()),
            ("content", self.content.as_str()),
            ("action_text", self.action_text.as_str()),
        ]
    }

    /// Names of the comparable fields whose values differ between `self` and `other`.
    pub fn diff_fields(&self, other: &Self) -> Vec<&'static str> {
        self.comparable_fields()
            .into_iter()
            .zip(other.comparable_fields())
            .filter(|((_, left), (_, right))| left != right)
            .map(|((name, _), _)| name)
            .collect()
    }
}

/// Trimmed `long_description`, the sole key used to equate messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Key for a raw `long_description`, ignoring surrounding whitespace.
    pub fn from_description(long_description: &str) -> Self {
        Self(long_description.trim().to_string())
    }

    /// The trimmed description.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}
