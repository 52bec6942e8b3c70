pub mod effects;
pub mod image;
pub mod utility;

use regex::{NoExpand, Regex};
use std::sync::OnceLock;
use tracing::debug;

use crate::safety::{
    add_external_targets, insert_before_head_close, rewrite_root_relative, sanitize, strip_fences,
};
use crate::theme::{self, ART_MARKER, THEME_MARKER};

pub use image::apply_explicit_image;
pub use utility::Utilities;

pub const HERO_BG_MARKER: &str = r#"data-genwebly="hero-bg""#;

#[derive(Debug, Clone)]
pub struct PatchOptions<'a> {
    /// The user's own words (prompt, plus revision notes); never the HTML.
    pub prompt_text: &'a str,
    pub hero_image_url: &'a str,
    pub ensure_story_anchor: bool,
}

impl<'a> PatchOptions<'a> {
    pub fn new(prompt_text: &'a str) -> Self {
        Self { prompt_text, hero_image_url: "", ensure_story_anchor: true }
    }

    pub fn hero_image(mut self, url: &'a str) -> Self {
        self.hero_image_url = url;
        self
    }
}

fn theme_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?s)\n?<style data-genwebly="theme">.*?</style>\n?"#).unwrap())
}

fn body_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<body\b[^>]*>").unwrap())
}

/// Wrap a fragment in `<html><head></head><body>...</body></html>`.
pub fn ensure_shell(html: &str) -> String {
    if html.to_lowercase().contains("<html") {
        html.to_string()
    } else {
        format!("<html><head></head><body>{html}</body></html>")
    }
}

/// Insert the palette stylesheet before `</head>`; an existing one is
/// re-rendered in place.
pub fn inject_theme(html: &str, palette: &theme::Palette) -> String {
    let css = theme::render_css(palette);
    if html.contains(THEME_MARKER) {
        return theme_block_re().replacen(html, 1, NoExpand(&css)).into_owned();
    }
    insert_before_head_close(html, &css)
}

/// Point bare `#` links at `#story` when the page has one.
pub fn redirect_placeholder_to_story(html: &str) -> String {
    if html.contains("#story") {
        html.replace(r##"href="#""##, r##"href="#story""##)
    } else {
        html.to_string()
    }
}

pub fn inject_hero_background(html: &str, url: &str, prompt_text: &str) -> String {
    if url.is_empty() || !prompt_text.to_lowercase().contains("hero background") {
        return html.to_string();
    }
    if html.contains(HERO_BG_MARKER) {
        return html.to_string();
    }
    let css = format!(
        "<style {HERO_BG_MARKER}>#hero{{background:url('{}') center/cover no-repeat;}}</style>",
        url.replace('\'', "%27")
    );
    insert_before_head_close(html, &css)
}

/// Themed SVG right after `<body ...>`, once.
pub fn inject_illustration(html: &str, prompt_text: &str) -> String {
    if html.contains(ART_MARKER) {
        return html.to_string();
    }
    let Some(m) = body_open_re().find(html) else {
        return html.to_string();
    };
    let svg = theme::render_svg(&theme::resolve_decoration(prompt_text));
    let mut out = String::with_capacity(html.len() + svg.len());
    out.push_str(&html[..m.end()]);
    out.push_str(&svg);
    out.push_str(&html[m.end()..]);
    out
}

/// Shell, theme CSS (then the link rules again), hero background, effects
/// and illustration, in that order, over an already sanitized document.
/// Every injection is marker-guarded so a second pass changes nothing.
pub fn postprocess(html: &str, opts: &PatchOptions<'_>) -> String {
    let html = strip_fences(html);
    let html = ensure_shell(&html);

    let palette = theme::resolve_palette(opts.prompt_text);
    debug!(palette = palette.name, "injecting theme");
    let html = inject_theme(&html, &palette);

    let mut html = rewrite_root_relative(&html);
    if opts.ensure_story_anchor {
        html = redirect_placeholder_to_story(&html);
    }
    let html = add_external_targets(&html);

    let html = inject_hero_background(&html, opts.hero_image_url, opts.prompt_text);

    if effects::wants_removal(opts.prompt_text) {
        debug!("removing decorative effects");
        return effects::remove(&html);
    }
    let html = if effects::wants_effects(opts.prompt_text) {
        debug!("decorative effects requested");
        effects::inject(&html)
    } else {
        html
    };

    inject_illustration(&html, opts.prompt_text)
}

/// One full pass from raw model text to the final document.
#[derive(Debug, Clone)]
pub struct Pipeline<'a> {
    pub options: PatchOptions<'a>,
    /// `(src, placement hint)` for the explicit image patch.
    pub image: Option<(&'a str, &'a str)>,
    pub utilities: Utilities,
}

impl<'a> Pipeline<'a> {
    pub fn new(prompt_text: &'a str) -> Self {
        Self { options: PatchOptions::new(prompt_text), image: None, utilities: Utilities::default() }
    }

    pub fn run(&self, raw: &str) -> String {
        let safe = sanitize(raw);
        if safe.is_empty() {
            return safe;
        }
        let safe = match self.image {
            Some((src, hint)) if !src.is_empty() => apply_explicit_image(&safe, src, hint),
            _ => safe,
        };
        let out = postprocess(&safe, &self.options);
        self.utilities.apply(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::safety::LINK_GUARD_MARKER;
    use pretty_assertions::assert_eq;

    const RAW: &str = r#"```html
<html><head><title>t</title></head><body>
<nav><a href="/">Home</a><a href="/pricing">Pricing</a><a href="https://x.io">X</a></nav>
<section id="hero"><h1>Hello</h1></section>
</body></html>
```"#;

    #[test]
    fn fragment_gets_shell() {
        assert_eq!(ensure_shell("<p>x</p>"), "<html><head></head><body><p>x</p></body></html>");
        assert_eq!(ensure_shell("<HTML></HTML>"), "<HTML></HTML>");
    }

    #[test]
    fn empty_output_is_terminal() {
        assert_eq!(Pipeline::new("wedding").run("```html\n```"), "");
        assert_eq!(Pipeline::new("wedding").run("   "), "");
    }

    #[test]
    fn full_pass_layout() {
        let out = Pipeline::new("xyz").run(RAW);
        assert!(!out.contains("```"));
        assert_eq!(out.matches(THEME_MARKER).count(), 1);
        assert!(out.find(THEME_MARKER).unwrap() < out.find("</head>").unwrap());
        assert_eq!(out.matches(LINK_GUARD_MARKER).count(), 1);
        assert!(out.contains(r##"<a href="#">Home</a><a href="#">Pricing</a>"##));
        assert!(out.contains(r#"href="https://x.io" target="_blank" rel="noopener noreferrer""#));
        // illustration directly after <body>
        assert!(out.contains("<body>\n<svg id=\"theme-art\""));
        assert!(out.contains("soft pastel sparkles"));
        assert!(!out.contains(effects::EFFECTS_MARKER));
    }

    #[test]
    fn pipeline_is_idempotent() {
        let p = Pipeline::new("neon wedding glow");
        let once = p.run(RAW);
        let twice = p.run(&once);
        assert_eq!(twice, once);
        assert_eq!(once.matches(effects::EFFECTS_MARKER).count(), 1);
        assert_eq!(once.matches(ART_MARKER).count(), 1);
    }

    #[test]
    fn placeholder_redirects_to_story() {
        let raw = r##"<html><body><a href="/">Top</a><section id="story"></section><a href="#story">S</a></body></html>"##;
        let out = Pipeline::new("xyz").run(raw);
        assert!(out.contains(r##"<a href="#story">Top</a>"##));
        assert!(!out.contains(r##"href="#""##));

        let mut p = Pipeline::new("xyz");
        p.options.ensure_story_anchor = false;
        assert!(p.run(raw).contains(r##"<a href="#">Top</a>"##));
    }

    #[test]
    fn theme_follows_prompt_not_html() {
        let out = postprocess("<html><head></head><body>coffee coffee</body></html>", &PatchOptions::new("cyber"));
        assert!(out.contains("--bg: #0b0f1a;"));
        assert!(out.contains("circuit lines and neon glow"));
    }

    #[test]
    fn theme_is_rerendered_not_duplicated() {
        let first = postprocess("<html><head></head><body></body></html>", &PatchOptions::new("coffee"));
        let second = postprocess(&first, &PatchOptions::new("travel"));
        assert_eq!(second.matches(THEME_MARKER).count(), 1);
        assert!(second.contains("--bg: #f1fbff;"));
    }

    #[test]
    fn hero_background_needs_url_and_request() {
        let doc = "<html><head></head><body></body></html>";
        let opts = PatchOptions::new("use it as hero background").hero_image("https://i/h.jpg");
        let out = postprocess(doc, &opts);
        assert!(out.contains("#hero{background:url('https://i/h.jpg') center/cover no-repeat;}"));
        assert_eq!(postprocess(&out, &opts).matches(HERO_BG_MARKER).count(), 1);

        let out = postprocess(doc, &PatchOptions::new("a hero").hero_image("https://i/h.jpg"));
        assert!(!out.contains(HERO_BG_MARKER));
        let out = postprocess(doc, &PatchOptions::new("hero background"));
        assert!(!out.contains(HERO_BG_MARKER));
    }

    #[test]
    fn removal_strips_effects_and_stops() {
        let with_effects = Pipeline::new("sparkle party").run(RAW);
        assert!(with_effects.contains(effects::EFFECTS_MARKER));

        let doc_without_art = with_effects.replace(ART_MARKER, r#"id="other-art""#);
        let out = postprocess(&doc_without_art, &PatchOptions::new("sparkle party, remove sparkles"));
        assert!(!out.contains(effects::EFFECTS_MARKER));
        assert!(!out.contains(r#"data-genwebly="effects""#));
        // no illustration was added after the removal
        assert!(!out.contains(ART_MARKER));
    }

    #[test]
    fn explicit_image_runs_before_theme() {
        let mut p = Pipeline::new("xyz");
        p.image = Some(("https://i/x.jpg", "hero, medium"));
        let out = p.run(RAW);
        assert!(out.contains(r#"<section id="hero"><img src="https://i/x.jpg""#));
        assert!(out.contains("max-width:180px"));
        assert!(!out.contains("<h1>Hello</h1>"));
    }

    #[test]
    fn utilities_are_applied_last() {
        let mut p = Pipeline::new("xyz");
        p.utilities.date_guard = true;
        let out = p.run(RAW);
        assert!(out.contains(utility::DATE_GUARD_MARKER));
    }

    #[test]
    fn illustration_handles_body_attributes() {
        let out = inject_illustration(r#"<body class="x"><p>a</p></body>"#, "travel");
        assert!(out.starts_with("<body class=\"x\">\n<svg id=\"theme-art\""));
        assert!(out.contains("waves and airplane trails"));
    }
}
