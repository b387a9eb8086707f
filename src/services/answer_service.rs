use crate::error::{Error, Result};
use crate::models::answer::UserAnswer;
use crate::models::interview::MockInterview;
use crate::models::question::QaPair;
use crate::services::ai_client::PromptClient;
use crate::services::extraction::{extract_embedded_object, parse_rating};
use crate::services::translation_service::language_name;
use sqlx::PgPool;
use std::sync::Arc;

pub const NO_FEEDBACK: &str = "No feedback generated";

/// Transcripts at or below this many characters are not scored.
pub const MIN_TRANSCRIPT_CHARS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub rating: Option<i32>,
    pub feedback: String,
}

impl Evaluation {
    fn missing() -> Self {
        Self {
            rating: None,
            feedback: NO_FEEDBACK.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct AnswerService {
    pool: PgPool,
    ai: Arc<dyn PromptClient>,
}

impl AnswerService {
    pub fn new(pool: PgPool, ai: Arc<dyn PromptClient>) -> Self {
        Self { pool, ai }
    }

    pub async fn record(
        &self,
        interview: &MockInterview,
        question_index: usize,
        transcript: &str,
        language: &str,
        owner: &str,
    ) -> Result<UserAnswer> {
        let questions = interview.questions();
        let pair = questions
            .get(question_index)
            .ok_or_else(|| Error::NotFound("Interview question not found".to_string()))?;

        let transcript = transcript.trim();
        if transcript.chars().count() <= MIN_TRANSCRIPT_CHARS {
            return Err(Error::BadRequest(format!(
                "Answer must be longer than {} characters",
                MIN_TRANSCRIPT_CHARS
            )));
        }

        let evaluation = self.evaluate(pair, transcript, language).await;

        let answer = sqlx::query_as::<_, UserAnswer>(
            r#"
            INSERT INTO user_answers (mock_id_ref, question, correct_ans, user_ans, feedback, rating, user_email)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&interview.mock_id)
        .bind(&pair.question)
        .bind(&pair.answer)
        .bind(transcript)
        .bind(&evaluation.feedback)
        .bind(evaluation.rating)
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            mock_id = %interview.mock_id,
            question_index,
            rating = ?evaluation.rating,
            "Answer recorded"
        );
        Ok(answer)
    }

    /// Scoring never fails the request; a bad reply degrades to no rating.
    async fn evaluate(&self, pair: &QaPair, transcript: &str, language: &str) -> Evaluation {
        let prompt = evaluation_prompt(&pair.question, transcript, language);
        match self.ai.send_prompt(&prompt).await {
            Ok(reply) => parse_evaluation(&reply).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Answer evaluation reply could not be parsed");
                Evaluation::missing()
            }),
            Err(e) => {
                tracing::error!(error = %e, "Answer evaluation request failed");
                Evaluation::missing()
            }
        }
    }

    pub async fn list_for_interview(&self, mock_id: &str) -> Result<Vec<UserAnswer>> {
        let rows = sqlx::query_as::<_, UserAnswer>(
            r#"SELECT * FROM user_answers WHERE mock_id_ref = $1 ORDER BY id ASC"#,
        )
        .bind(mock_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

pub fn evaluation_prompt(question: &str, transcript: &str, language: &str) -> String {
    format!(
        r#"Question: {}
User Answer: {}

Based on the question and the user's answer, give a rating from 1 to 10 and
3 to 5 lines of feedback on areas of improvement.
Write the feedback in {}.
Return ONLY a JSON object with the fields "rating" and "feedback"."#,
        question,
        transcript,
        language_name(language)
    )
}

pub fn parse_evaluation(reply: &str) -> Result<Evaluation> {
    let value = extract_embedded_object(reply)?;
    let feedback = value
        .get("feedback")
        .and_then(|f| f.as_str())
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .unwrap_or(NO_FEEDBACK)
        .to_string();
    let rating = value.get("rating").and_then(parse_rating);
    Ok(Evaluation { rating, feedback })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_includes_question_answer_and_language() {
        let prompt = evaluation_prompt("What is ownership?", "Each value has one owner.", "hi");
        assert!(prompt.contains("Question: What is ownership?"));
        assert!(prompt.contains("User Answer: Each value has one owner."));
        assert!(prompt.contains("in Hindi"));
        assert!(evaluation_prompt("q", "a", "fr").contains("in English"));
    }

    #[test]
    fn evaluation_is_read_from_prose_wrapped_object() {
        let reply = "Here is my review:\n{\"rating\": \"7\", \"feedback\": \"Mention borrowing.\"}";
        let eval = parse_evaluation(reply).unwrap();
        assert_eq!(eval.rating, Some(7));
        assert_eq!(eval.feedback, "Mention borrowing.");
    }

    #[test]
    fn missing_fields_degrade_gracefully() {
        let eval = parse_evaluation("{\"score\": 4}").unwrap();
        assert_eq!(eval, Evaluation::missing());
        assert!(parse_evaluation("I can't rate this.").is_err());
    }
}
