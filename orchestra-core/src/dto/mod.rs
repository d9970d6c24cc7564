//! Data Transfer Objects for the Orchestra public pipelines API
//!
//! Request bodies sent by the client and the response bodies it expects back.
//! Response DTOs are lenient: unknown fields are ignored and alternative id
//! field names are accepted.

pub mod pipeline;
pub mod run;

use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

/// Deserialize an optional identifier sent as either a string or a number
pub(crate) fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<JsonValue>::deserialize(deserializer)? {
        Some(JsonValue::String(id)) => Some(id),
        Some(JsonValue::Number(id)) => Some(id.to_string()),
        _ => None,
    })
}
