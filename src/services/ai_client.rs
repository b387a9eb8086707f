use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;

/// Text-in, text-out access to the hosted generative model.
///
/// Question generation, answer scoring and translation all go through this
/// single call and differ only in prompt content.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PromptClient: Send + Sync {
    async fn send_prompt(&self, prompt: &str) -> Result<String>;
}

#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, api_url: String, model: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            api_url,
            model,
        }
    }

    fn build_payload(&self, prompt: &str) -> JsonValue {
        serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "user", "content": prompt}
            ],
            "temperature": 0.7
        })
    }
}

#[async_trait]
impl PromptClient for OpenAiClient {
    async fn send_prompt(&self, prompt: &str) -> Result<String> {
        let payload = self.build_payload(prompt);
        let res = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .timeout(Duration::from_secs(120))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let text = res.text().await.unwrap_or_default();
            tracing::error!(status, "AI request failed");
            return Err(Error::Upstream {
                status,
                message: text,
            });
        }

        let body: JsonValue = res.json().await?;
        message_content(&body)
            .map(str::to_string)
            .ok_or_else(|| Error::AiFormat("missing choices[0].message.content".to_string()))
    }
}

fn message_content(body: &JsonValue) -> Option<&str> {
    body.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_carries_model_and_single_user_message() {
        let client = OpenAiClient::new(
            "sk-test".into(),
            "http://localhost/v1/chat/completions".into(),
            "gpt-4o-mini".into(),
            Client::new(),
        );
        let payload = client.build_payload("Translate this");
        assert_eq!(payload["model"], "gpt-4o-mini");
        assert_eq!(payload["messages"].as_array().map(|m| m.len()), Some(1));
        assert_eq!(payload["messages"][0]["role"], "user");
        assert_eq!(payload["messages"][0]["content"], "Translate this");
    }

    #[test]
    fn content_is_read_from_first_choice() {
        let body = json!({"choices": [{"message": {"role": "assistant", "content": "[1,2]"}}]});
        assert_eq!(message_content(&body), Some("[1,2]"));
        assert_eq!(message_content(&json!({"choices": []})), None);
    }
}
