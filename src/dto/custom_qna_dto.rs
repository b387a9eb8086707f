use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCustomQnaPayload {
    #[validate(length(min = 1, max = 255))]
    pub domain: String,
    #[validate(length(min = 1))]
    pub skills: String,
    #[validate(length(min = 1, max = 10))]
    pub experience: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomQnaResponse {
    pub id: i32,
    pub domain: String,
    pub skills: String,
    pub experience: String,
    pub language: String,
    pub translated: bool,
    pub items: JsonValue,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PracticeDomain {
    pub name: &'static str,
    pub slug: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExperienceBracket {
    pub label: &'static str,
    pub slug: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PracticeCatalog {
    pub domains: Vec<PracticeDomain>,
    pub experiences: Vec<ExperienceBracket>,
}
