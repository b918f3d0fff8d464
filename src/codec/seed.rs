// Copyright (c) 2024 Mike Tsao

//! Seeds are the shareable form of a tune's event list: the JSON array of
//! events, hex-encoded so it survives being pasted anywhere, behind a short
//! version tag (`td1.`).
//!
//! Seeds without a tag come from before versioning and are read as version 1.

use crate::composition::Event;
use serde_json::Value;
use thiserror::Error;

/// What goes in front of the version number.
pub const SEED_TAG: &str = "td";

/// The version that [encode()] writes.
pub const SEED_VERSION: u32 = 1;

/// Ways that a seed can fail to load.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The body isn't hex.
    #[error("seed isn't valid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// The hex decodes to bytes that aren't text.
    #[error("seed doesn't decode to text: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The text isn't JSON.
    #[error("seed doesn't decode to JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON is something other than a list of events.
    #[error("seed doesn't decode to a list of events")]
    NotASequence,

    /// The seed came from a newer (or unknown) format.
    #[error("seed version {0} isn't supported")]
    UnsupportedVersion(u32),
}

/// Turns an event list into a seed.
pub fn encode(events: &[Event]) -> Result<String, SeedError> {
    let json = serde_json::to_string(events)?;
    Ok(format!("{SEED_TAG}{SEED_VERSION}.{}", hex::encode(json)))
}

/// Turns a seed back into an event list.
///
/// The decoded value must be a JSON array. Elements that aren't events are
/// dropped with a warning; everything else about the events (including
/// pitches that aren't in the table) is kept as is.
pub fn decode(seed: &str) -> Result<Vec<Event>, SeedError> {
    let seed = seed.trim();
    let body = match split_tag(seed) {
        Some((version, body)) => {
            if version != SEED_VERSION {
                return Err(SeedError::UnsupportedVersion(version));
            }
            body
        }
        None => seed,
    };

    let text = String::from_utf8(hex::decode(body)?)?;
    let Value::Array(items) = serde_json::from_str::<Value>(&text)? else {
        return Err(SeedError::NotASequence);
    };

    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value::<Event>(item) {
            Ok(event) => Some(event),
            Err(e) => {
                log::warn!("Seed: dropping element {i}: {e}");
                None
            }
        })
        .collect())
}

// "td12.abcd" -> (12, "abcd")
fn split_tag(seed: &str) -> Option<(u32, &str)> {
    let (tag, body) = seed.split_once('.')?;
    let version = tag.strip_prefix(SEED_TAG)?.parse().ok()?;
    Some((version, body))
}
