use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use fs_err as fs;
use std::path::Path;

use crate::theme::detect_visual_intent;

/// Where the page's imagery comes from for one generation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageSource {
    #[default]
    None,
    Url(String),
    /// `data:<mime>;base64,...`
    Embedded(String),
    /// Free-text hint; the model draws inline SVG/CSS art from it.
    VectorHint(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageDirective {
    pub source: ImageSource,
    /// e.g. "bottom left, small, opacity 0.8"
    pub place: Option<String>,
}

impl ImageDirective {
    pub fn none() -> Self {
        Self::default()
    }

    /// Precedence: URL, uploaded file, explicit hint, then visual intent in
    /// the prompt itself.
    pub fn resolve(
        url: Option<&str>,
        file: Option<&Path>,
        hint: Option<&str>,
        prompt: &str,
    ) -> Result<Self> {
        let non_empty = |s: Option<&str>| s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);

        let source = if let Some(u) = non_empty(url) {
            ImageSource::Url(u)
        } else if let Some(path) = file {
            ImageSource::Embedded(file_to_data_url(path)?)
        } else if let Some(h) = non_empty(hint) {
            ImageSource::VectorHint(h)
        } else if detect_visual_intent(prompt) {
            ImageSource::VectorHint(prompt.trim().to_string())
        } else {
            ImageSource::None
        };
        Ok(Self { source, place: None })
    }

    /// A src given directly: data URIs are embedded, anything else is a URL.
    pub fn from_src(src: String) -> Self {
        let source = if src.starts_with("data:") {
            ImageSource::Embedded(src)
        } else {
            ImageSource::Url(src)
        };
        Self { source, place: None }
    }

    pub fn with_place(mut self, place: Option<&str>) -> Self {
        self.place = place.map(str::trim).filter(|p| !p.is_empty()).map(str::to_string);
        self
    }

    /// Image src for the explicit image patch (URL or data URI).
    pub fn src(&self) -> Option<&str> {
        match &self.source {
            ImageSource::Url(s) | ImageSource::Embedded(s) => Some(s),
            _ => None,
        }
    }

    /// `(src, hint)` for the explicit image patch; no hint appends the image.
    pub fn patch(&self) -> Option<(&str, &str)> {
        self.src().map(|s| (s, self.place.as_deref().unwrap_or("")))
    }

    /// Like [`patch`](Self::patch), but only when a placement was given.
    pub fn placed_patch(&self) -> Option<(&str, &str)> {
        match (self.src(), self.place.as_deref()) {
            (Some(s), Some(p)) => Some((s, p)),
            _ => None,
        }
    }
}

pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if ext == "png" {
        "image/png"
    } else {
        "image/jpeg"
    }
}

pub fn encode_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

pub fn file_to_data_url(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("reading image {}", path.display()))?;
    Ok(encode_data_url(&bytes, mime_for(path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn mime_by_extension() {
        assert_eq!(mime_for(Path::new("a.PNG")), "image/png");
        assert_eq!(mime_for(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(mime_for(Path::new("a.webp")), "image/jpeg");
        assert_eq!(mime_for(Path::new("noext")), "image/jpeg");
    }

    #[test]
    fn data_url_encoding() {
        assert_eq!(encode_data_url(b"hi", "image/png"), "data:image/png;base64,aGk=");
    }

    #[test]
    fn url_wins_over_everything() {
        let d = ImageDirective::resolve(Some(" https://x/y.jpg "), None, Some("clouds"), "sparkle").unwrap();
        assert_eq!(d.source, ImageSource::Url("https://x/y.jpg".into()));
        assert_eq!(d.src(), Some("https://x/y.jpg"));
    }

    #[test]
    fn uploaded_file_becomes_embedded() {
        let mut f = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        f.write_all(b"hi").unwrap();
        let d = ImageDirective::resolve(None, Some(f.path()), Some("clouds"), "").unwrap();
        assert_eq!(d.source, ImageSource::Embedded("data:image/png;base64,aGk=".into()));
    }

    #[test]
    fn hint_then_visual_intent_then_none() {
        let d = ImageDirective::resolve(Some("  "), None, Some("watercolor clouds"), "x").unwrap();
        assert_eq!(d.source, ImageSource::VectorHint("watercolor clouds".into()));

        let d = ImageDirective::resolve(None, None, None, " neon bakery ").unwrap();
        assert_eq!(d.source, ImageSource::VectorHint("neon bakery".into()));

        let d = ImageDirective::resolve(None, None, None, "plain page").unwrap();
        assert_eq!(d, ImageDirective::none());
    }

    #[test]
    fn placement_travels_with_the_directive() {
        let d = ImageDirective::from_src("https://i/a.png".into());
        assert_eq!(d.patch(), Some(("https://i/a.png", "")));
        assert_eq!(d.placed_patch(), None);

        let d = d.with_place(Some(" bottom left "));
        assert_eq!(d.placed_patch(), Some(("https://i/a.png", "bottom left")));
        assert_eq!(d.clone().with_place(Some("  ")).place, None);

        let embedded = ImageDirective::from_src("data:image/png;base64,AA".into());
        assert_eq!(embedded.source, ImageSource::Embedded("data:image/png;base64,AA".into()));

        let hint = ImageDirective::resolve(None, None, Some("clouds"), "").unwrap().with_place(Some("hero"));
        assert_eq!(hint.patch(), None);
    }
}
