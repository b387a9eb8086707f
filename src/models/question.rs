use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One generated interview question with its reference answer.
///
/// Generated payloads use capitalized keys (`Question` / `Answer`); lowercase
/// keys are accepted as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaPair {
    #[serde(rename = "Question", alias = "question")]
    pub question: String,
    #[serde(rename = "Answer", alias = "answer", default)]
    pub answer: String,
}

/// Reads question/answer pairs out of a stored payload.
///
/// Accepts a bare array or an object wrapping one under `questions`. Items that
/// do not look like a pair are skipped.
pub fn qa_pairs_from_value(raw: &JsonValue) -> Vec<QaPair> {
    let items = if let Some(arr) = raw.as_array() {
        arr.as_slice()
    } else if let Some(arr) = raw.get("questions").and_then(|a| a.as_array()) {
        arr.as_slice()
    } else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| serde_json::from_value::<QaPair>(item.clone()).ok())
        .collect()
}
