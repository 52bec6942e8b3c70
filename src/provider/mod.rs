use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

use crate::cli::ProviderKind;
use crate::config::{credential_var, Config};
use crate::errors::GenError;

pub mod anthropic;
pub mod gemini;
pub mod ollama;
pub mod openai;

/// Opaque text-completion service: prompt in, HTML text out.
#[async_trait]
pub trait Provider: Send + Sync {
    fn label(&self) -> String;
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String>;
}

pub type DynProvider = Box<dyn Provider + Send + Sync>;

fn credential(kind: ProviderKind) -> Result<String, GenError> {
    let Some(var) = credential_var(kind) else {
        return Ok(String::new());
    };
    match std::env::var(var) {
        Ok(k) if !k.trim().is_empty() => Ok(k),
        _ => Err(GenError::MissingCredential(provider_name(kind), var)),
    }
}

pub fn provider_name(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Gemini => "gemini",
        ProviderKind::OpenAI => "openai",
        ProviderKind::Anthropic => "anthropic",
        ProviderKind::Ollama => "ollama",
    }
}

/// Build the configured provider. A missing credential is reported before
/// any request is attempted.
pub fn make_provider(cfg: &Config) -> Result<DynProvider, GenError> {
    let api_key = credential(cfg.provider)?;
    let model = cfg.model();
    let timeout = Duration::from_secs(cfg.timeout_secs);
    let p: DynProvider = match cfg.provider {
        ProviderKind::Gemini => Box::new(gemini::Gemini {
            model,
            api_key,
            api_base: cfg.gemini_url.clone(),
            timeout,
        }),
        ProviderKind::OpenAI => Box::new(openai::OpenAIProvider::new(
            model,
            api_key,
            cfg.openai_url.clone(),
            cfg.timeout_secs,
        )),
        ProviderKind::Anthropic => Box::new(anthropic::Anthropic {
            model,
            api_key,
            timeout,
            api_base: cfg.anthropic_url.clone(),
            api_version: cfg.anthropic_version.clone(),
            max_tokens: cfg.max_tokens,
        }),
        ProviderKind::Ollama => Box::new(ollama::Ollama {
            model,
            url: cfg.ollama_url.clone(),
            timeout,
        }),
    };
    Ok(p)
}

/// Model text is trimmed; nothing left is an error.
pub(crate) fn non_empty(text: String) -> Result<String> {
    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(GenError::EmptyResponse.into());
    }
    Ok(text)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ollama_needs_no_credential() {
        let cfg = Config { provider: ProviderKind::Ollama, ..Config::default() };
        let p = make_provider(&cfg).unwrap();
        assert_eq!(p.label(), "ollama/llama3.1");
    }

    #[test]
    fn empty_text_is_an_error() {
        assert!(non_empty("  \n".into()).is_err());
        assert_eq!(non_empty(" <p>x</p>\n".into()).unwrap(), "<p>x</p>");
    }
}
