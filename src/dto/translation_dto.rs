use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TranslateUiRequest {
    #[validate(length(min = 1, max = 100))]
    pub namespace: String,
    #[serde(alias = "lang", default)]
    pub language: String,
    pub texts: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateUiResponse {
    #[serde(alias = "lang", default)]
    pub language: String,
    pub texts: BTreeMap<String, String>,
}
