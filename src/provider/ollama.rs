use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{non_empty, Provider};

pub struct Ollama {
    pub model: String,
    pub url: String,
    pub timeout: Duration,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: MsgOut,
}

#[derive(Deserialize)]
struct MsgOut {
    content: String,
}

/// Standard chat response, or the raw body when it is not one.
fn extract_text(body: String) -> Result<String> {
    let content = match serde_json::from_str::<ChatResponse>(&body) {
        Ok(c) => c.message.content,
        Err(_) => body,
    };
    non_empty(content)
}

#[async_trait]
impl Provider for Ollama {
    fn label(&self) -> String {
        format!("ollama/{}", self.model)
    }

    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String> {
        let url = format!("{}/api/chat", self.url.trim_end_matches('/'));
        let client = Client::builder().timeout(self.timeout).build()?;
        let body = ChatRequest {
            model: &self.model,
            messages: vec![Msg { role: "user", content: prompt }],
            stream: false,
            options: OllamaOptions { temperature },
        };

        debug!(%url, "ollama: POST");

        let resp = client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("ollama request failed")?
            .error_for_status()
            .context("ollama returned an error status")?;

        let text = resp.text().await.context("ollama read body failed")?;
        extract_text(text)
    }
}
