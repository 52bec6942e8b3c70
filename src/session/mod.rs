use anyhow::Result;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::image::ImageDirective;
use crate::patch::{Pipeline, Utilities};
use crate::prompt::{self, Revision, DEFAULT_REQUEST};
use crate::provider::Provider;
use crate::stack::StackSelection;

pub const MISSING_KEY_DOC: &str = "<html><body><h2>No API key found in .env</h2></body></html>";
pub const EMPTY_SHELL: &str = "<html><body></body></html>";

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Visible error page; the detail may carry a raw HTTP body, so it is escaped.
pub fn error_doc(detail: &str) -> String {
    format!("<html><body><h2>API Error</h2><pre>{}</pre></body></html>", escape_text(detail))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Empty,
    /// Raw model text stored, final document not built yet.
    Raw,
    Final,
    /// `html` holds an error document.
    Error,
}

/// Prompt sent and text received for one provider call.
#[derive(Debug, Clone, Default)]
pub struct Exchange {
    pub request: String,
    pub response: String,
}

#[derive(Debug, Clone)]
pub struct Revised {
    pub exchange: Exchange,
    pub previous: String,
    /// False when the new document equals the old one up to whitespace.
    pub changed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub raw: String,
    pub html: String,
    pub last_prompt: String,
    pub stack: StackSelection,
    pub utilities: Utilities,
    pub stage: Stage,
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

pub fn normalize(s: &str) -> String {
    whitespace_re().replace_all(s, " ").trim().to_string()
}

impl Session {
    pub fn new(stack: StackSelection, utilities: Utilities) -> Self {
        Self { stack, utilities, ..Self::default() }
    }

    /// Start from an existing document on disk, treated as raw model output.
    pub fn from_document(doc: String, last_prompt: &str) -> Self {
        Self {
            stage: if doc.trim().is_empty() { Stage::Empty } else { Stage::Raw },
            raw: doc,
            last_prompt: last_prompt.to_string(),
            ..Self::default()
        }
    }

    pub fn missing_credential(&mut self) {
        self.html = MISSING_KEY_DOC.to_string();
        self.stage = Stage::Error;
    }

    /// Fresh generation. A provider failure leaves the error document as the
    /// current page; it is not returned as an `Err`.
    pub async fn generate(
        &mut self,
        provider: &dyn Provider,
        user_prompt: &str,
        image: &ImageDirective,
        temperature: f32,
    ) -> Exchange {
        let request_text = if user_prompt.trim().is_empty() { DEFAULT_REQUEST } else { user_prompt };
        let request = prompt::build_prompt(request_text, image, &self.stack.effective_rules(), temperature);

        let response = match provider.generate(&request, temperature).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, provider = %provider.label(), "generation failed");
                self.html = error_doc(&e.to_string());
                self.stage = Stage::Error;
                return Exchange { request, response: String::new() };
            }
        };
        self.raw = response.clone();
        self.stage = Stage::Raw;

        // the theme follows the user's own words, even when empty
        let mut pipeline = Pipeline::new(user_prompt);
        pipeline.utilities = self.utilities;
        pipeline.image = image.patch();
        self.html = pipeline.run(&response);
        self.stage = Stage::Final;
        debug!(bytes = self.html.len(), "document ready");

        self.last_prompt = request_text.to_string();
        Exchange { request, response }
    }

    /// Revise the current document. On failure nothing is mutated.
    pub async fn regenerate(
        &mut self,
        provider: &dyn Provider,
        notes: &str,
        image: Option<&ImageDirective>,
        temperature: f32,
    ) -> Result<Revised> {
        let current = if !self.raw.is_empty() {
            self.raw.as_str()
        } else if !self.html.is_empty() {
            self.html.as_str()
        } else {
            EMPTY_SHELL
        };
        let rules = self.stack.effective_rules();
        let request = prompt::build_revision_prompt(&Revision {
            current_html: current,
            stack_rules: &rules,
            change_list: notes,
            ..Revision::default()
        });

        let response = provider.generate(&request, temperature).await?;

        let prompt_text = format!("{} {}", self.last_prompt, notes);
        let mut pipeline = Pipeline::new(&prompt_text);
        pipeline.utilities = self.utilities;
        pipeline.image = image.and_then(ImageDirective::placed_patch);
        let html = pipeline.run(&response);

        let previous = std::mem::replace(&mut self.html, html);
        self.raw = response.clone();
        self.stage = Stage::Final;
        let changed = normalize(&previous) != normalize(&self.html);
        if !changed {
            warn!("revision produced no visible change");
        }
        Ok(Revised { exchange: Exchange { request, response }, previous, changed })
    }

    /// Document the split export starts from.
    pub fn split_source(&self) -> &str {
        if self.raw.is_empty() {
            &self.html
        } else {
            &self.raw
        }
    }
}
