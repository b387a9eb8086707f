use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

use crate::models::question::{qa_pairs_from_value, QaPair};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MockInterview {
    pub id: i32,
    pub mock_id: String,
    pub json_mock_resp: JsonValue,
    pub job_position: String,
    pub job_desc: String,
    pub job_experience: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl MockInterview {
    /// Question/answer pairs read leniently from the stored payload.
    pub fn questions(&self) -> Vec<QaPair> {
        qa_pairs_from_value(&self.json_mock_resp)
    }
}
