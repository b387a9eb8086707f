use crate::dto::custom_qna_dto::{
    CreateCustomQnaPayload, ExperienceBracket, PracticeCatalog, PracticeDomain,
};
use crate::error::Result;
use crate::models::custom_qna::{CustomQnaSet, CustomQnaSummary};
use crate::services::ai_client::PromptClient;
use crate::services::extraction::extract_json;
use sqlx::PgPool;
use std::sync::Arc;

const PRACTICE_DOMAINS: [(&str, &str); 5] = [
    ("Full Stack Developer", "fullstack"),
    ("Web Developer", "webdeveloper"),
    ("Data Analyst", "dataanalyst"),
    ("Artificial Intelligence", "ai"),
    ("Machine Learning", "ml"),
];

const EXPERIENCE_BRACKETS: [(&str, &str); 3] = [
    ("0-2 Years", "0-2"),
    ("3-5 Years", "3-5"),
    ("5-10 Years", "5-10"),
];

pub fn practice_catalog() -> PracticeCatalog {
    PracticeCatalog {
        domains: PRACTICE_DOMAINS
            .iter()
            .map(|&(name, slug)| PracticeDomain { name, slug })
            .collect(),
        experiences: EXPERIENCE_BRACKETS
            .iter()
            .map(|&(label, slug)| ExperienceBracket { label, slug })
            .collect(),
    }
}

#[derive(Clone)]
pub struct CustomQnaService {
    pool: PgPool,
    ai: Arc<dyn PromptClient>,
    count: usize,
}

impl CustomQnaService {
    pub fn new(pool: PgPool, ai: Arc<dyn PromptClient>, count: usize) -> Self {
        Self { pool, ai, count }
    }

    pub async fn generate(&self, payload: &CreateCustomQnaPayload, owner: &str) -> Result<CustomQnaSet> {
        let prompt = custom_qna_prompt(payload, self.count);
        let reply = self.ai.send_prompt(&prompt).await?;
        tracing::debug!(len = reply.len(), "Custom Q&A raw response received");

        let items = extract_json(&reply).map_err(|e| {
            tracing::error!(error = %e, domain = %payload.domain, "Custom Q&A response could not be parsed");
            e
        })?;

        let set = sqlx::query_as::<_, CustomQnaSet>(
            r#"
            INSERT INTO custom_interview_qna (domain, skills, experience, json_qna, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(payload.domain.trim())
        .bind(payload.skills.trim())
        .bind(payload.experience.trim())
        .bind(&items)
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(id = set.id, owner, "Custom Q&A set created");
        Ok(set)
    }

    pub async fn find(&self, id: i32) -> Result<Option<CustomQnaSet>> {
        let set = sqlx::query_as::<_, CustomQnaSet>(
            r#"SELECT * FROM custom_interview_qna WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(set)
    }

    pub async fn list_for_owner(&self, owner: &str) -> Result<Vec<CustomQnaSummary>> {
        let rows = sqlx::query_as::<_, CustomQnaSummary>(
            r#"
            SELECT id, domain, skills, experience, created_at
            FROM custom_interview_qna
            WHERE created_by = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

pub fn custom_qna_prompt(payload: &CreateCustomQnaPayload, count: usize) -> String {
    format!(
        r#"I want interview questions and answers for this profile:

Domain/Role: {}
Skills/Tech Stack: {}
Years of Experience: {}

Generate {} INTERVIEW QUESTIONS WITH ANSWERS.
Return STRICTLY a JSON array where each item is:
{{
  "Question": "question text",
  "Answer": "detailed answer text"
}}"#,
        payload.domain.trim(),
        payload.skills.trim(),
        payload.experience.trim(),
        count
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lists_fixed_domains_and_brackets() {
        let catalog = practice_catalog();
        let slugs: Vec<_> = catalog.domains.iter().map(|d| d.slug).collect();
        assert_eq!(slugs, ["fullstack", "webdeveloper", "dataanalyst", "ai", "ml"]);
        let brackets: Vec<_> = catalog.experiences.iter().map(|e| e.slug).collect();
        assert_eq!(brackets, ["0-2", "3-5", "5-10"]);
    }

    #[test]
    fn prompt_uses_configured_count() {
        let payload = CreateCustomQnaPayload {
            domain: "Data Analyst".into(),
            skills: "SQL, Excel, Power BI".into(),
            experience: "3-5".into(),
        };
        let prompt = custom_qna_prompt(&payload, 12);
        assert!(prompt.contains("Domain/Role: Data Analyst"));
        assert!(prompt.contains("Skills/Tech Stack: SQL, Excel, Power BI"));
        assert!(prompt.contains("Generate 12 INTERVIEW QUESTIONS"));
    }
}
