use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackTag {
    #[value(alias = "HTML")]
    Html,
    #[value(alias = "CSS")]
    Css,
    #[value(alias = "JS", alias = "javascript")]
    Js,
    #[value(alias = "Tailwind")]
    Tailwind,
    #[value(alias = "Bootstrap")]
    Bootstrap,
    #[value(alias = "jQuery")]
    Jquery,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsMode {
    #[default]
    Static,
    Dynamic,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackSelection {
    pub tags: BTreeSet<StackTag>,
    pub js_mode: JsMode,
    pub js_use: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applicability {
    pub applicable: bool,
    pub reason: &'static str,
}

pub const REASON_DEFAULT: &str =
    "No stack chosen; model will pick a reasonable default (HTML + CSS).";
pub const REASON_MISSING_HTML: &str =
    "Stack not applicable: HTML is required since the output is always an HTML document. Add 'HTML'.";
pub const REASON_CONFLICT: &str =
    "Stack not applicable: Tailwind CSS and Bootstrap are full CSS frameworks that often conflict; pick one of them, not both.";
pub const REASON_OK: &str = "Stack applicable.";

pub fn check_applicability(tags: &BTreeSet<StackTag>) -> Applicability {
    let (applicable, reason) = if tags.is_empty() {
        (true, REASON_DEFAULT)
    } else if !tags.contains(&StackTag::Html) {
        (false, REASON_MISSING_HTML)
    } else if tags.contains(&StackTag::Tailwind) && tags.contains(&StackTag::Bootstrap) {
        (false, REASON_CONFLICT)
    } else {
        (true, REASON_OK)
    };
    Applicability { applicable, reason }
}

/// Natural-language constraints appended to the generation prompt.
pub fn build_rules(tags: &BTreeSet<StackTag>, js_mode: JsMode, js_use: &str) -> String {
    use StackTag::*;

    if tags.is_empty() {
        return String::new();
    }
    let has = |t: StackTag| tags.contains(&t);
    let framework = has(Tailwind) || has(Bootstrap);
    let mut rules: Vec<String> = Vec::new();

    if has(Html) && !has(Css) && !framework {
        rules.push("Output a single self-contained HTML file. Use minimal inline CSS inside a <style> block.".into());
    }
    if has(Html) && has(Css) && !framework && !has(Jquery) {
        rules.push("Use a single HTML file with a <style> block for CSS. Avoid external libraries.".into());
    }
    if has(Tailwind) {
        rules.push("Use Tailwind utility classes. Include CDN <script src='https://cdn.tailwindcss.com'></script> in <head>.".into());
    }
    if has(Bootstrap) {
        rules.push("Use Bootstrap 5 via CDN (CSS and JS). Build layout with Bootstrap components.".into());
    }
    if has(Jquery) {
        rules.push("Include jQuery via CDN and use it for small interactions.".into());
    }

    let js_like = has(Js) || has(Jquery) || has(Bootstrap);
    if js_like {
        rules.push("All code must live in a single HTML file with <style> and <script> blocks.".into());
        match js_mode {
            JsMode::Dynamic => rules.push(
                "Use JavaScript to add interactivity (tabs, modals, form handling, smooth scrolling, localStorage, etc.). Avoid external API requests.".into(),
            ),
            JsMode::Static => rules.push(
                "Keep JavaScript minimal, so the page mostly behaves like a static site (minor enhancements only).".into(),
            ),
        }
        let js_use = js_use.trim();
        if !js_use.is_empty() {
            rules.push(format!("Specific JavaScript behavior requested by the user: {js_use}"));
        }
    }

    rules.join("\n")
}

impl StackSelection {
    /// Rules for the selection, or none when the tag set is not applicable.
    pub fn effective_rules(&self) -> String {
        if check_applicability(&self.tags).applicable {
            build_rules(&self.tags, self.js_mode, &self.js_use)
        } else {
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use StackTag::*;

    fn set(tags: &[StackTag]) -> BTreeSet<StackTag> {
        tags.iter().copied().collect()
    }

    #[test]
    fn applicability_rules_in_order() {
        let cases: &[(&[StackTag], bool, &str)] = &[
            (&[], true, REASON_DEFAULT),
            (&[Css], false, REASON_MISSING_HTML),
            (&[Tailwind, Bootstrap], false, REASON_MISSING_HTML),
            (&[Html, Tailwind, Bootstrap], false, REASON_CONFLICT),
            (&[Html, Css, Js], true, REASON_OK),
        ];
        for (tags, ok, reason) in cases {
            let a = check_applicability(&set(tags));
            assert_eq!(a.applicable, *ok, "tags: {tags:?}");
            assert_eq!(a.reason, *reason, "tags: {tags:?}");
        }
    }

    #[test]
    fn empty_selection_has_no_rules() {
        assert_eq!(build_rules(&set(&[]), JsMode::Dynamic, "tabs"), "");
    }

    #[test]
    fn html_only_is_inline_style() {
        let r = build_rules(&set(&[Html]), JsMode::Static, "");
        assert_eq!(
            r,
            "Output a single self-contained HTML file. Use minimal inline CSS inside a <style> block."
        );
    }

    #[test]
    fn html_css_uses_style_block() {
        let r = build_rules(&set(&[Html, Css]), JsMode::Static, "");
        assert!(r.starts_with("Use a single HTML file with a <style> block"));
        assert!(!r.contains("<script>"));
    }

    #[test]
    fn js_rules_include_mode_and_user_intent() {
        let r = build_rules(&set(&[Html, Js]), JsMode::Dynamic, "  localStorage diary ");
        assert!(r.contains("single HTML file with <style> and <script> blocks"));
        assert!(r.contains("Use JavaScript to add interactivity"));
        assert!(r.ends_with("Specific JavaScript behavior requested by the user: localStorage diary"));

        let r = build_rules(&set(&[Html, Js]), JsMode::Static, "");
        assert!(r.contains("Keep JavaScript minimal"));
        assert!(!r.contains("Specific JavaScript behavior"));
    }

    #[test]
    fn frameworks_get_cdn_rules() {
        let r = build_rules(&set(&[Html, Tailwind]), JsMode::Static, "");
        assert!(r.contains("cdn.tailwindcss.com"));
        let r = build_rules(&set(&[Html, Bootstrap]), JsMode::Static, "");
        assert!(r.contains("Bootstrap 5 via CDN"));
        // Bootstrap ships JS, so the script-block rule applies
        assert!(r.contains("<script> blocks"));
    }

    #[test]
    fn inapplicable_selection_falls_back_to_no_rules() {
        let sel = StackSelection { tags: set(&[Css, Js]), ..Default::default() };
        assert_eq!(sel.effective_rules(), "");
    }
}
