use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CustomQnaSet {
    pub id: i32,
    pub domain: String,
    pub skills: String,
    pub experience: String,
    pub json_qna: JsonValue,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Listing row without the generated payload.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CustomQnaSummary {
    pub id: i32,
    pub domain: String,
    pub skills: String,
    pub experience: String,
    pub created_at: DateTime<Utc>,
}
