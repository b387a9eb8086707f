use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordAnswerRequest {
    #[validate(range(min = 0))]
    pub question_index: i32,
    #[validate(length(min = 1))]
    pub user_answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadVideoResponse {
    pub success: bool,
    pub file_path: String,
}
