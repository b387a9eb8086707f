use crate::error::Result;
use crate::services::ai_client::PromptClient;
use crate::services::extraction::{extract_embedded_object, extract_json};
use serde_json::{Map, Value as JsonValue};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

pub const BASE_LANGUAGE: &str = "en";

const UI_QUOTA_COOLDOWN: Duration = Duration::from_secs(5 * 60);

const DEFAULT_CACHE_LIMIT: usize = 1000;

/// Display name used inside prompts. Only Hindi is targeted explicitly.
pub fn language_name(language: &str) -> &'static str {
    if language == "hi" {
        "Hindi"
    } else {
        "English"
    }
}

pub fn is_base_language(language: &str) -> bool {
    language.trim().is_empty() || language.eq_ignore_ascii_case(BASE_LANGUAGE)
}

/// Translates static UI strings and generated content through the model,
/// memoizing results for the lifetime of the process.
#[derive(Clone)]
pub struct TranslationService {
    client: Arc<dyn PromptClient>,
    ui_cache: Arc<RwLock<HashMap<String, BTreeMap<String, String>>>>,
    content_cache: Arc<RwLock<HashMap<String, JsonValue>>>,
    ui_blocked_until: Arc<RwLock<Option<Instant>>>,
    cache_limit: usize,
}

impl TranslationService {
    pub fn new(client: Arc<dyn PromptClient>) -> Self {
        Self {
            client,
            ui_cache: Arc::new(RwLock::new(HashMap::new())),
            content_cache: Arc::new(RwLock::new(HashMap::new())),
            ui_blocked_until: Arc::new(RwLock::new(None)),
            cache_limit: DEFAULT_CACHE_LIMIT,
        }
    }

    /// Caps each memo map; a full map is cleared before the next insert.
    pub fn with_cache_limit(mut self, limit: usize) -> Self {
        self.cache_limit = limit.max(1);
        self
    }

    pub async fn ui_translation_blocked(&self) -> bool {
        match *self.ui_blocked_until.read().await {
            Some(until) => Instant::now() < until,
            None => false,
        }
    }

    /// Never fails: any problem falls back to the base strings.
    pub async fn translate_ui(
        &self,
        namespace: &str,
        base: &BTreeMap<String, String>,
        language: &str,
    ) -> BTreeMap<String, String> {
        if is_base_language(language) || base.is_empty() {
            return base.clone();
        }

        if self.ui_translation_blocked().await {
            tracing::debug!(namespace, "UI translation in quota cooldown, serving base text");
            return base.clone();
        }

        let cache_key = format!("{}_{}", namespace, language);
        if let Some(hit) = self.ui_cache.read().await.get(&cache_key) {
            return hit.clone();
        }

        match self.request_ui_translation(base, language).await {
            Ok(translated) => {
                insert_capped(
                    &mut *self.ui_cache.write().await,
                    cache_key,
                    translated.clone(),
                    self.cache_limit,
                );
                translated
            }
            Err(e) => {
                tracing::error!(namespace, error = %e, "UI auto-translate failed");
                if e.is_quota_exceeded() {
                    let until = Instant::now() + UI_QUOTA_COOLDOWN;
                    *self.ui_blocked_until.write().await = Some(until);
                    tracing::warn!(namespace, "UI translation blocked for five minutes after quota error");
                }
                base.clone()
            }
        }
    }

    async fn request_ui_translation(
        &self,
        base: &BTreeMap<String, String>,
        language: &str,
    ) -> Result<BTreeMap<String, String>> {
        let prompt = format!(
            r#"You are a translation engine.
Translate ONLY the text values (not keys) of this JSON object into "{}".
Do NOT modify object structure or JSON keys.
Return valid JSON only without markdown formatting.

JSON to translate:
{}"#,
            language_name(language),
            serde_json::to_string(base)?
        );

        let reply = self.client.send_prompt(&prompt).await?;
        let parsed = extract_embedded_object(&reply)?;
        Ok(merge_ui_strings(base, &parsed))
    }

    /// Returns `None` when the original feedback should be shown.
    pub async fn translate_feedback(
        &self,
        mock_id: &str,
        items: &[JsonValue],
        language: &str,
    ) -> Option<Vec<JsonValue>> {
        if is_base_language(language) || items.is_empty() {
            return None;
        }

        let minimal: Vec<JsonValue> = items
            .iter()
            .map(|item| {
                serde_json::json!({
                    "question": item.get("question").cloned().unwrap_or(JsonValue::Null),
                    "userAns": item.get("userAns").cloned().unwrap_or(JsonValue::Null),
                    "correctAns": item.get("correctAns").cloned().unwrap_or(JsonValue::Null),
                    "feedback": item.get("feedback").cloned().unwrap_or(JsonValue::Null),
                    "rating": item.get("rating").cloned().unwrap_or(JsonValue::Null),
                })
            })
            .collect();

        let cache_key = format!(
            "feedback_{}_{}_{}_{:x}",
            mock_id,
            language,
            items.len(),
            fingerprint(&minimal)
        );
        if let Some(JsonValue::Array(hit)) = self.content_cache.read().await.get(&cache_key) {
            if hit.len() == items.len() {
                return Some(hit.clone());
            }
        }

        let result: Result<JsonValue> = async {
            let prompt = format!(
                r#"You are a professional translator.
Translate the following interview feedback data to {}.

IMPORTANT:
- The input is a JSON array.
- KEEP THE STRUCTURE EXACTLY THE SAME.
- Only translate the text inside "question", "userAns", "correctAns" and "feedback" fields.
- Do NOT change keys or numeric values like "rating".
- Return ONLY valid JSON, no backticks, no explanation.

JSON:
{}"#,
                language_name(language),
                serde_json::to_string_pretty(&minimal)?
            );
            let reply = self.client.send_prompt(&prompt).await?;
            extract_json(&reply)
        }
        .await;

        match result {
            Ok(parsed) => {
                let merged = merge_by_index(items, &parsed);
                insert_capped(
                    &mut *self.content_cache.write().await,
                    cache_key,
                    JsonValue::Array(merged.clone()),
                    self.cache_limit,
                );
                Some(merged)
            }
            Err(e) => {
                tracing::error!(mock_id, error = %e, "feedback translation failed, keeping original");
                None
            }
        }
    }

    /// Translated custom question set as returned by the model, or `None`.
    pub async fn translate_qna(
        &self,
        set_id: i32,
        items: &JsonValue,
        language: &str,
    ) -> Option<JsonValue> {
        let empty = items.as_array().map(|a| a.is_empty()).unwrap_or(true);
        if is_base_language(language) || empty {
            return None;
        }

        let cache_key = format!("customQnA_{}_{}", set_id, language);
        if let Some(hit) = self.content_cache.read().await.get(&cache_key) {
            return Some(hit.clone());
        }

        let result: Result<JsonValue> = async {
            let prompt = format!(
                r#"You are a professional translator.
Translate the following interview questions and answers to {}.

IMPORTANT:
- The input is a JSON array.
- KEEP THE STRUCTURE EXACTLY THE SAME.
- Only translate the text in "Question" and "Answer" fields.
- Do NOT change keys or add any new fields.
- Return ONLY valid JSON, no backticks, no explanation.

JSON:
{}"#,
                language_name(language),
                serde_json::to_string_pretty(items)?
            );
            let reply = self.client.send_prompt(&prompt).await?;
            extract_json(&reply)
        }
        .await;

        match result {
            Ok(parsed) => {
                insert_capped(
                    &mut *self.content_cache.write().await,
                    cache_key,
                    parsed.clone(),
                    self.cache_limit,
                );
                Some(parsed)
            }
            Err(e) => {
                tracing::error!(set_id, error = %e, "custom Q&A translation failed, keeping original");
                None
            }
        }
    }
}

fn insert_capped<V>(cache: &mut HashMap<String, V>, key: String, value: V, limit: usize) {
    if cache.len() >= limit && !cache.contains_key(&key) {
        tracing::debug!(entries = cache.len(), "translation cache full, clearing");
        cache.clear();
    }
    cache.insert(key, value);
}

/// Content hash of the items sent for translation.
fn fingerprint(items: &[JsonValue]) -> u64 {
    let mut hasher = DefaultHasher::new();
    serde_json::to_string(items).unwrap_or_default().hash(&mut hasher);
    hasher.finish()
}

/// Keeps the base key set; translated string values win where present.
fn merge_ui_strings(base: &BTreeMap<String, String>, parsed: &JsonValue) -> BTreeMap<String, String> {
    base.iter()
        .map(|(key, original)| {
            let value = parsed
                .get(key)
                .and_then(|v| v.as_str())
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(original.as_str());
            (key.clone(), value.to_string())
        })
        .collect()
}

/// Overlays translated objects onto the originals position by position.
fn merge_by_index(originals: &[JsonValue], translated: &JsonValue) -> Vec<JsonValue> {
    let translated = translated.as_array();
    originals
        .iter()
        .enumerate()
        .map(|(idx, orig)| {
            let mut merged: Map<String, JsonValue> = orig.as_object().cloned().unwrap_or_default();
            if let Some(JsonValue::Object(t)) = translated.and_then(|arr| arr.get(idx)) {
                for (k, v) in t {
                    merged.insert(k.clone(), v.clone());
                }
            }
            JsonValue::Object(merged)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::services::ai_client::MockPromptClient;
    use serde_json::json;

    fn base_text() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("next".to_string(), "Next".to_string()),
            ("previous".to_string(), "Previous".to_string()),
        ])
    }

    #[tokio::test]
    async fn english_never_calls_the_model() {
        let mut mock = MockPromptClient::new();
        mock.expect_send_prompt().never();
        let svc = TranslationService::new(Arc::new(mock));

        let ui = svc.translate_ui("startInterviewPage", &base_text(), "en").await;
        assert_eq!(ui, base_text());

        let items = vec![json!({"question": "Q", "feedback": "F"})];
        assert!(svc.translate_feedback("mock-1", &items, "en").await.is_none());
        assert!(svc.translate_qna(1, &json!([{"Question": "Q"}]), "EN").await.is_none());
    }

    #[tokio::test]
    async fn ui_translation_is_cached_per_namespace_and_language() {
        let mut mock = MockPromptClient::new();
        mock.expect_send_prompt()
            .times(1)
            .returning(|_| Ok(r#"Here: {"next": "आगे", "previous": "पीछे"}"#.to_string()));
        let svc = TranslationService::new(Arc::new(mock));

        let first = svc.translate_ui("nav", &base_text(), "hi").await;
        let second = svc.translate_ui("nav", &base_text(), "hi").await;
        assert_eq!(first.get("next").map(String::as_str), Some("आगे"));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn missing_keys_fall_back_to_base() {
        let mut mock = MockPromptClient::new();
        mock.expect_send_prompt()
            .returning(|_| Ok(r#"{"next": "आगे", "extra": "ignored"}"#.to_string()));
        let svc = TranslationService::new(Arc::new(mock));

        let ui = svc.translate_ui("nav", &base_text(), "hi").await;
        assert_eq!(ui.len(), 2);
        assert_eq!(ui.get("previous").map(String::as_str), Some("Previous"));
    }

    #[tokio::test]
    async fn quota_error_blocks_ui_translation() {
        let mut mock = MockPromptClient::new();
        mock.expect_send_prompt().times(1).returning(|_| {
            Err(Error::Upstream {
                status: 429,
                message: "quota exceeded".into(),
            })
        });
        let svc = TranslationService::new(Arc::new(mock));

        let first = svc.translate_ui("nav", &base_text(), "hi").await;
        assert_eq!(first, base_text());
        assert!(svc.ui_translation_blocked().await);

        // Different namespace, still inside the cooldown: no second call.
        let second = svc.translate_ui("footer", &base_text(), "hi").await;
        assert_eq!(second, base_text());
    }

    #[tokio::test]
    async fn non_quota_error_does_not_block() {
        let mut mock = MockPromptClient::new();
        mock.expect_send_prompt()
            .times(2)
            .returning(|_| Ok("no json at all".to_string()));
        let svc = TranslationService::new(Arc::new(mock));

        svc.translate_ui("nav", &base_text(), "hi").await;
        assert!(!svc.ui_translation_blocked().await);
        svc.translate_ui("nav", &base_text(), "hi").await;
    }

    #[tokio::test]
    async fn feedback_translation_merges_over_original_fields() {
        let mut mock = MockPromptClient::new();
        mock.expect_send_prompt().times(1).returning(|_| {
            Ok("```json\n[{\"question\": \"प्रश्न\", \"feedback\": \"अच्छा\", \"rating\": 7}]\n```".to_string())
        });
        let svc = TranslationService::new(Arc::new(mock));

        let items = vec![json!({
            "id": 11,
            "question": "Question",
            "userAns": "Answer",
            "feedback": "Good",
            "rating": 7
        })];
        let translated = svc.translate_feedback("mock-1", &items, "hi").await.unwrap();
        assert_eq!(translated[0]["id"], 11);
        assert_eq!(translated[0]["question"], "प्रश्न");
        assert_eq!(translated[0]["userAns"], "Answer");

        let cached = svc.translate_feedback("mock-1", &items, "hi").await.unwrap();
        assert_eq!(cached, translated);
    }

    #[tokio::test]
    async fn feedback_translation_failure_keeps_original() {
        let mut mock = MockPromptClient::new();
        mock.expect_send_prompt()
            .returning(|_| Err(Error::Upstream { status: 500, message: "down".into() }));
        let svc = TranslationService::new(Arc::new(mock));

        let items = vec![json!({"question": "Q"})];
        assert!(svc.translate_feedback("mock-1", &items, "hi").await.is_none());
    }

    #[tokio::test]
    async fn qna_translation_replaces_items() {
        let mut mock = MockPromptClient::new();
        mock.expect_send_prompt()
            .times(1)
            .returning(|_| Ok(r#"[{"Question": "प्रश्न", "Answer": "उत्तर"}]"#.to_string()));
        let svc = TranslationService::new(Arc::new(mock));

        let items = json!([{"Question": "Q", "Answer": "A"}]);
        let translated = svc.translate_qna(5, &items, "hi").await.unwrap();
        assert_eq!(translated[0]["Answer"], "उत्तर");
        assert_eq!(svc.translate_qna(5, &items, "hi").await.unwrap(), translated);
    }

    #[test]
    fn only_hindi_has_a_dedicated_name() {
        assert_eq!(language_name("hi"), "Hindi");
        assert_eq!(language_name("fr"), "English");
        assert!(is_base_language("en"));
        assert!(is_base_language(""));
        assert!(!is_base_language("hi"));
    }

    #[tokio::test]
    async fn feedback_cache_follows_new_answers() {
        let mut mock = MockPromptClient::new();
        mock.expect_send_prompt().times(2).returning(|prompt| {
            if prompt.contains("Question two") {
                Ok(r#"[{"question": "प्रश्न एक"}, {"question": "प्रश्न दो"}]"#.to_string())
            } else {
                Ok(r#"[{"question": "प्रश्न एक"}]"#.to_string())
            }
        });
        let svc = TranslationService::new(Arc::new(mock));

        let one = vec![json!({"question": "Question one", "rating": 4})];
        let first = svc.translate_feedback("mock-1", &one, "hi").await.unwrap();
        assert_eq!(first.len(), 1);

        let two = vec![
            json!({"question": "Question one", "rating": 4}),
            json!({"question": "Question two", "rating": 8}),
        ];
        let second = svc.translate_feedback("mock-1", &two, "hi").await.unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(second[1]["question"], "प्रश्न दो");
    }

    #[tokio::test]
    async fn caches_are_capped() {
        let mut mock = MockPromptClient::new();
        mock.expect_send_prompt()
            .returning(|_| Ok(r#"{"next": "आगे"}"#.to_string()));
        let svc = TranslationService::new(Arc::new(mock)).with_cache_limit(2);

        for namespace in ["a", "b", "c", "d", "e"] {
            svc.translate_ui(namespace, &base_text(), "hi").await;
            assert!(svc.ui_cache.read().await.len() <= 2);
        }
    }
}
