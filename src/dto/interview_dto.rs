use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::interview::MockInterview;
use crate::models::question::QaPair;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateInterviewPayload {
    #[validate(length(min = 1, max = 255))]
    pub job_position: String,
    #[validate(length(min = 1, max = 2000))]
    pub job_desc: String,
    #[validate(range(min = 0, max = 30))]
    pub job_experience: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LanguageQuery {
    pub lang: Option<String>,
}

impl LanguageQuery {
    pub fn language(&self) -> &str {
        self.lang.as_deref().map(str::trim).filter(|l| !l.is_empty()).unwrap_or("en")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InterviewResponse {
    pub mock_id: String,
    pub job_position: String,
    pub job_desc: String,
    pub job_experience: String,
    pub created_by: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub questions: Vec<QaPair>,
}

impl From<MockInterview> for InterviewResponse {
    fn from(interview: MockInterview) -> Self {
        let questions = interview.questions();
        Self {
            mock_id: interview.mock_id,
            job_position: interview.job_position,
            job_desc: interview.job_desc,
            job_experience: interview.job_experience,
            created_by: interview.created_by,
            created_at: interview.created_at,
            questions,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InterviewSummary {
    pub mock_id: String,
    pub job_position: String,
    pub job_experience: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<MockInterview> for InterviewSummary {
    fn from(interview: MockInterview) -> Self {
        Self {
            mock_id: interview.mock_id,
            job_position: interview.job_position,
            job_experience: interview.job_experience,
            created_at: interview.created_at,
        }
    }
}
