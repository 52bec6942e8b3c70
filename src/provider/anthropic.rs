use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::errors::GenError;
use super::{non_empty, Provider};

pub struct Anthropic {
    pub model: String,
    pub api_key: String,
    pub timeout: Duration,
    pub api_base: String,
    pub api_version: String,
    pub max_tokens: u32,
}

#[derive(Serialize)]
struct MsgRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Msg<'a>>,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MsgResponse {
    content: Vec<Block>,
}

#[derive(Deserialize)]
struct Block {
    #[serde(default)]
    text: String,
    #[serde(default)]
    r#type: String,
}

fn extract_text(body: &str) -> Result<String> {
    let parsed: MsgResponse = serde_json::from_str(body)
        .map_err(|e| anyhow!("anthropic response parse error: {}", e))?;
    let text = parsed
        .content
        .into_iter()
        .filter(|b| b.r#type == "text")
        .map(|b| b.text)
        .collect::<String>();
    non_empty(text)
}

#[async_trait]
impl Provider for Anthropic {
    fn label(&self) -> String {
        format!("anthropic/{}", self.model)
    }

    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String> {
        let url = format!("{}/v1/messages", self.api_base.trim_end_matches('/'));
        let client = Client::builder().timeout(self.timeout).build()?;
        let body = MsgRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature,
            messages: vec![Msg { role: "user", content: prompt }],
        };

        debug!(%url, "anthropic: POST");

        let resp = client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&body)
            .send()
            .await
            .context("anthropic request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("anthropic read body failed")?;
        debug!(%status, bytes = text.len(), "anthropic: response");

        if !status.is_success() {
            return Err(GenError::Provider(format!("Anthropic API error ({status}): {text}")).into());
        }
        extract_text(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_blocks_are_joined() {
        let body = r#"{"content":[{"type":"text","text":"<html>"},{"type":"tool_use","id":"x"},{"type":"text","text":"</html>"}]}"#;
        assert_eq!(extract_text(body).unwrap(), "<html></html>");
    }
}
