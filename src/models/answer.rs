use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserAnswer {
    pub id: i32,
    pub mock_id_ref: String,
    pub question: String,
    pub correct_ans: Option<String>,
    pub user_ans: Option<String>,
    pub feedback: Option<String>,
    pub rating: Option<i32>,
    pub user_email: Option<String>,
    pub created_at: DateTime<Utc>,
}
