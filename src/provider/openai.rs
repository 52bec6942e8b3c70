use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::non_empty;
use crate::errors::GenError;

/// Chat completions with the prompt as a single user message.
pub struct OpenAIProvider {
    model: String,
    api_key: String,
    api_base: String,
    client: Client,
    timeout_secs: u64,
}

impl OpenAIProvider {
    pub fn new(model: String, api_key: String, api_base: String, timeout_secs: u64) -> Self {
        Self {
            model,
            api_key,
            api_base,
            client: Client::new(),
            timeout_secs,
        }
    }
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

fn extract_text(body: &str) -> Result<String> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| anyhow!("Failed to parse OpenAI response: {e}\nRaw: {body}"))?;
    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default();
    non_empty(content)
}

#[async_trait]
impl super::Provider for OpenAIProvider {
    fn label(&self) -> String {
        format!("openai/{}", self.model)
    }

    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
            "temperature": temperature,
        });
        let url = format!("{}/v1/chat/completions", self.api_base.trim_end_matches('/'));

        debug!(%url, "openai: POST");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        debug!(%status, bytes = text.len(), "openai: response");

        if !status.is_success() {
            return Err(GenError::Provider(format!("OpenAI API error ({status}): {text}")).into());
        }
        extract_text(&text)
    }
}
