//! OpenAI-compatible chat completions generator.

use serde_json::{Value, json};

use keeptouch_core::error::GenerateError;
use keeptouch_core::plan::{PlanPrompt, TextGenerator};

use crate::config::OpenAiConfig;

/// Calls `POST {base_url}/v1/chat/completions` with bearer auth.
#[derive(Debug, Clone)]
pub struct OpenAiGenerator {
    http: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiGenerator {
    #[must_use]
    pub fn new(http: reqwest::Client, config: OpenAiConfig) -> Self {
        Self { http, config }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.config.base_url)
    }

    fn request_body(&self, prompt: &PlanPrompt) -> Value {
        let params = &self.config.params;
        json!({
            "model": params.model,
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user}
            ]
        })
    }
}

/// Pull the first choice's message text out of a completions response.
/// A response without any choice text yields an empty string.
fn completion_text(body: &Value) -> String {
    body.get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|msg| msg.get("content"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

#[async_trait::async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &PlanPrompt) -> Result<String, GenerateError> {
        if self.config.api_key.is_empty() {
            return Err(GenerateError::NotConfigured {
                reason: "missing provider credential".to_owned(),
            });
        }

        let resp = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| GenerateError::Provider {
                reason: format!("HTTP error: {e}"),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GenerateError::Provider {
                reason: format!("provider responded with {status}"),
            });
        }

        let body: Value = resp.json().await.map_err(|e| GenerateError::InvalidResponse {
            reason: format!("failed to parse completion: {e}"),
        })?;

        Ok(completion_text(&body))
    }
}
