use crate::dto::interview_dto::CreateInterviewPayload;
use crate::error::Result;
use crate::models::interview::MockInterview;
use crate::services::ai_client::PromptClient;
use crate::services::extraction::extract_json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct InterviewService {
    pool: PgPool,
    ai: Arc<dyn PromptClient>,
    question_count: usize,
}

impl InterviewService {
    pub fn new(pool: PgPool, ai: Arc<dyn PromptClient>, question_count: usize) -> Self {
        Self {
            pool,
            ai,
            question_count,
        }
    }

    pub async fn generate(
        &self,
        payload: &CreateInterviewPayload,
        language: &str,
        owner: &str,
    ) -> Result<MockInterview> {
        let prompt = interview_prompt(payload, self.question_count, language);
        let reply = self.ai.send_prompt(&prompt).await?;
        tracing::debug!(len = reply.len(), "Mock interview raw response received");

        let questions = extract_json(&reply).map_err(|e| {
            tracing::error!(error = %e, "Mock interview response could not be parsed");
            e
        })?;

        let mock_id = Uuid::new_v4().to_string();
        let interview = sqlx::query_as::<_, MockInterview>(
            r#"
            INSERT INTO mock_interviews (mock_id, json_mock_resp, job_position, job_desc, job_experience, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&mock_id)
        .bind(&questions)
        .bind(payload.job_position.trim())
        .bind(payload.job_desc.trim())
        .bind(payload.job_experience.to_string())
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(mock_id = %interview.mock_id, owner, "Mock interview created");
        Ok(interview)
    }

    pub async fn find_by_mock_id(&self, mock_id: &str) -> Result<Option<MockInterview>> {
        let interview = sqlx::query_as::<_, MockInterview>(
            r#"SELECT * FROM mock_interviews WHERE mock_id = $1"#,
        )
        .bind(mock_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(interview)
    }

    pub async fn list_for_owner(&self, owner: &str) -> Result<Vec<MockInterview>> {
        let rows = sqlx::query_as::<_, MockInterview>(
            r#"SELECT * FROM mock_interviews WHERE created_by = $1 ORDER BY id DESC"#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

pub fn interview_prompt(payload: &CreateInterviewPayload, count: usize, language: &str) -> String {
    let lang_instruction = if language == "hi" {
        "IMPORTANT:\n- All questions AND answers must be in Hindi.\n- Do NOT mix English except for code, library, or API names."
    } else {
        "IMPORTANT:\n- All questions AND answers must be in English.\n- Do NOT mix any other language."
    };

    format!(
        r#"You are an expert technical interviewer.

Job Position: {}
Job Description / Tech Stack: {}
Years of Experience: {}

Generate {} interview questions WITH detailed answers.

Return STRICTLY a JSON array where each item is:
{{
  "Question": "question text",
  "Answer": "detailed answer text"
}}

{}"#,
        payload.job_position.trim(),
        payload.job_desc.trim(),
        payload.job_experience,
        count,
        lang_instruction
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> CreateInterviewPayload {
        CreateInterviewPayload {
            job_position: " Full Stack Developer ".into(),
            job_desc: "React, Node.js, MongoDB".into(),
            job_experience: 2,
        }
    }

    #[test]
    fn prompt_carries_profile_and_count() {
        let prompt = interview_prompt(&payload(), 5, "en");
        assert!(prompt.contains("Job Position: Full Stack Developer\n"));
        assert!(prompt.contains("Tech Stack: React, Node.js, MongoDB"));
        assert!(prompt.contains("Years of Experience: 2"));
        assert!(prompt.contains("Generate 5 interview questions"));
        assert!(prompt.contains("must be in English"));
    }

    #[test]
    fn hindi_prompt_asks_for_hindi() {
        let prompt = interview_prompt(&payload(), 8, "hi");
        assert!(prompt.contains("must be in Hindi"));
        assert!(!prompt.contains("must be in English"));
    }
}
