use anyhow::{Context, Result};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cli::{Args, ProviderKind};
use crate::errors::GenError;

pub const DEFAULT_CONFIG_FILE: &str = "genwebly.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root for `.genwebly/tx/<id>` debug artifacts.
    pub root: String,
    pub out_dir: String,
    pub provider: ProviderKind,
    /// Falls back to the provider's default model when unset.
    pub model: Option<String>,
    pub temperature: f32,
    pub revision_temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub gemini_url: String,
    pub openai_url: String,
    pub anthropic_url: String,
    pub anthropic_version: String,
    pub ollama_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: ".".into(),
            out_dir: "out".into(),
            provider: ProviderKind::Gemini,
            model: None,
            temperature: 0.8,
            revision_temperature: 0.25,
            max_tokens: 8192,
            timeout_secs: 2400,
            gemini_url: "https://generativelanguage.googleapis.com".into(),
            openai_url: "https://api.openai.com".into(),
            anthropic_url: "https://api.anthropic.com".into(),
            anthropic_version: "2023-06-01".into(),
            ollama_url: "http://localhost:11434".into(),
        }
    }
}

pub fn default_model(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Gemini => "gemini-2.5-flash",
        ProviderKind::OpenAI => "gpt-4.1-mini",
        ProviderKind::Anthropic => "claude-sonnet-4-5",
        ProviderKind::Ollama => "llama3.1",
    }
}

/// Environment variable holding the credential, if the provider needs one.
pub fn credential_var(kind: ProviderKind) -> Option<&'static str> {
    match kind {
        ProviderKind::Gemini => Some("GEMINI_API_KEY"),
        ProviderKind::OpenAI => Some("OPENAI_API_KEY"),
        ProviderKind::Anthropic => Some("ANTHROPIC_API_KEY"),
        ProviderKind::Ollama => None,
    }
}

impl Config {
    pub fn model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| default_model(self.provider).to_string())
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| GenError::Config(e.to_string()).into())
    }

    /// Defaults, then the TOML file (explicit path, or `genwebly.toml` when
    /// present in the working directory).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Path::new(DEFAULT_CONFIG_FILE),
            None => return Ok(Self::default()),
        };
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text).with_context(|| format!("loading {}", path.display()))
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(p) = args.provider {
            if p != self.provider {
                // a model configured for another provider does not carry over
                self.model = None;
            }
            self.provider = p;
        }
        if let Some(m) = &args.model {
            self.model = Some(m.clone());
        }
        if let Some(t) = args.temperature {
            self.temperature = t;
        }
        if let Some(t) = args.timeout_secs {
            self.timeout_secs = t;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = Config::from_toml("provider = \"ollama\"\ntemperature = 0.4\n").unwrap();
        assert_eq!(cfg.provider, ProviderKind::Ollama);
        assert_eq!(cfg.temperature, 0.4);
        assert_eq!(cfg.revision_temperature, 0.25);
        assert_eq!(cfg.model(), "llama3.1");
    }

    #[test]
    fn serialized_config_has_only_live_keys() {
        let text = toml::to_string(&Config::default()).unwrap();
        assert!(!text.contains("schema_version"));
        assert!(text.contains("revision_temperature = 0.25"));
        // files written by older versions still load
        assert!(Config::from_toml("schema_version = \"2026-10-01\"").is_ok());
    }

    #[test]
    fn bad_toml_is_config_error() {
        let err = Config::from_toml("provider = 3").unwrap_err();
        assert!(err.downcast_ref::<GenError>().is_some());
    }

    #[test]
    fn cli_overrides_file() {
        let mut cfg = Config::from_toml("model = \"gemini-2.5-pro\"").unwrap();
        assert_eq!(cfg.model(), "gemini-2.5-pro");

        let args = Args::parse_from(["genwebly", "--provider", "openai", "stack"]);
        cfg.apply_args(&args);
        assert_eq!(cfg.model(), "gpt-4.1-mini");

        let args = Args::parse_from(["genwebly", "--model", "m", "--timeout-secs", "5", "--temperature", "0.3", "stack"]);
        cfg.apply_args(&args);
        assert_eq!(cfg.model(), "m");
        assert_eq!(cfg.timeout_secs, 5);
        assert_eq!(cfg.temperature, 0.3);
        assert_eq!(cfg.revision_temperature, 0.25);
    }

    #[test]
    fn credentials_per_provider() {
        assert_eq!(credential_var(ProviderKind::Gemini), Some("GEMINI_API_KEY"));
        assert_eq!(credential_var(ProviderKind::Ollama), None);
    }
}
