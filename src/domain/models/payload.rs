//! Endpoint payloads and the per-endpoint strategy that produces them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::message::{IdentityKey, MessageRecord};
use crate::domain::errors::FetchError;

/// How a response body is reduced to a payload.
///
/// The legacy and replacement endpoints do not share a body shape, so each
/// endpoint is configured with its own strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnwrapStrategy {
    /// First message, with `show` taken from `content.title`.
    #[default]
    Legacy,
    /// First message as-is.
    First,
    /// The whole message list.
    All,
}

impl UnwrapStrategy {
    /// Reduce a decoded response body to a payload.
    ///
    /// Returns `Ok(None)` when the endpoint answered with an empty message list.
    /// An empty message object (`{}`) counts as no message at all.
    pub fn extract(self, body: &Value) -> Result<Option<Payload>, FetchError> {
        let messages = body
            .get("messages")
            .and_then(Value::as_array)
            .ok_or_else(|| FetchError::Decode("missing `messages` array".to_string()))?;

        match self {
            UnwrapStrategy::Legacy => {
                let Some(first) = messages.first().filter(|m| !is_empty_object(m)) else {
                    return Ok(None);
                };
                let mut message = decode_message(first)?;
                message.show = body
                    .pointer("/content/title")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                Ok(Some(Payload::Single(message)))
            }
            UnwrapStrategy::First => messages
                .first()
                .filter(|m| !is_empty_object(m))
                .map(decode_message)
                .transpose()
                .map(|message| message.map(Payload::Single)),
            UnwrapStrategy::All => {
                let decoded = messages
                    .iter()
                    .filter(|m| !is_empty_object(m))
                    .map(decode_message)
                    .collect::<Result<Vec<_>, _>>()?;
                if decoded.is_empty() {
                    return Ok(None);
                }
                Ok(Some(Payload::List(decoded)))
            }
        }
    }
}

fn is_empty_object(value: &Value) -> bool {
    value.as_object().is_some_and(Map::is_empty)
}

fn decode_message(value: &Value) -> Result<MessageRecord, FetchError> {
    if !value.is_object() {
        return Err(FetchError::Decode(format!("message is not an object: {value}")));
    }
    Ok(MessageRecord::deserialize(value)?)
}

/// Non-empty result of one endpoint fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    /// One message, from the `legacy` or `first` strategy.
    Single(MessageRecord),
    /// Every message, from the `all` strategy.
    List(Vec<MessageRecord>),
}

impl Payload {
    /// The message compared against the other endpoint.
    pub fn primary(&self) -> Option<&MessageRecord> {
        match self {
            Payload::Single(message) => Some(message),
            Payload::List(messages) => messages.first(),
        }
    }

    /// Every message carried by this payload.
    pub fn messages(&self) -> &[MessageRecord] {
        match self {
            Payload::Single(message) => std::slice::from_ref(message),
            Payload::List(messages) => messages,
        }
    }

    /// Identity keys of every carried message.
    pub fn identity_keys(&self) -> Vec<IdentityKey> {
        self.messages().iter().map(MessageRecord::identity_key).collect()
    }

    /// Serialize for the report's result columns.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
