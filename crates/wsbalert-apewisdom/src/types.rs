//! ApeWisdom response types.
//!
//! The endpoint returns `{"count": .., "pages": .., "results": [ .. ]}`.
//! Entries are read field by field so one malformed row does not discard
//! the rest of the page.

use serde::Deserialize;
use serde_json::Value;
use wsbalert_core::TickerMention;

use crate::error::FetchError;

/// Top-level envelope for the `filter/*` endpoints.
#[derive(Debug, Deserialize)]
pub struct MentionsEnvelope {
    pub results: Vec<Value>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub pages: Option<u32>,
}

/// Extracts ticker mentions from a decoded response body.
///
/// # Errors
///
/// Returns [`FetchError::UnexpectedShape`] if `body` has no `results` array.
pub fn parse_mentions(body: &Value) -> Result<Vec<TickerMention>, FetchError> {
    let envelope = MentionsEnvelope::deserialize(body)
        .map_err(|e| FetchError::UnexpectedShape(e.to_string()))?;

    let mentions = envelope
        .results
        .iter()
        .filter_map(|entry| {
            let parsed = parse_entry(entry);
            if parsed.is_none() {
                tracing::debug!(entry = %entry, "skipping result without ticker");
            }
            parsed
        })
        .collect();

    Ok(mentions)
}

fn parse_entry(entry: &Value) -> Option<TickerMention> {
    let ticker = entry
        .get("ticker")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())?;

    Some(TickerMention {
        ticker: ticker.to_string(),
        mentions: count_field(entry.get("mentions")).unwrap_or(0),
        name: entry
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string),
        rank: count_field(entry.get("rank")).and_then(|r| u32::try_from(r).ok()),
        mentions_24h_ago: count_field(entry.get("mentions_24h_ago")),
    })
}

/// Reads a non-negative integer that may be encoded as a number or a string.
fn count_field(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}
