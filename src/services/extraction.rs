//! Pulling JSON out of free-form model replies.
//!
//! Models are asked for bare JSON but regularly wrap it in a fenced block or
//! surround it with prose. Nothing here validates the shape of what comes
//! back: any well-formed JSON is accepted.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;

static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)```(?:json)?[ \t]*\r?\n?(.*?)```").expect("fenced block pattern")
});

/// Direct parse first, then the first fenced block.
pub fn extract_json(text: &str) -> Result<JsonValue> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<JsonValue>(trimmed) {
        return Ok(value);
    }

    if let Some(inner) = fenced_block(trimmed) {
        return serde_json::from_str::<JsonValue>(inner.trim())
            .map_err(|e| Error::AiFormat(format!("fenced block is not valid JSON: {}", e)));
    }

    Err(Error::AiFormat(preview(trimmed)))
}

/// Greedy slice from the first `{` to the last `}`.
pub fn extract_embedded_object(text: &str) -> Result<JsonValue> {
    let start = text.find('{');
    let end = text.rfind('}');
    match (start, end) {
        (Some(s), Some(e)) if s < e => serde_json::from_str::<JsonValue>(&text[s..=e])
            .map_err(|err| Error::AiFormat(format!("embedded object is not valid JSON: {}", err))),
        _ => Err(Error::AiFormat(preview(text.trim()))),
    }
}

fn fenced_block(text: &str) -> Option<&str> {
    FENCED_BLOCK
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Numeric rating from a model reply: a number (rounded) or a numeric string.
pub fn parse_rating(value: &JsonValue) -> Option<i32> {
    match value {
        JsonValue::Number(n) => n.as_f64().map(|f| f.round() as i32),
        JsonValue::String(s) => s.trim().parse::<f64>().ok().map(|f| f.round() as i32),
        _ => None,
    }
}

fn preview(text: &str) -> String {
    let head: String = text.chars().take(120).collect();
    format!("no JSON found in reply: {:?}", head)
}
