use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::safety::insert_before_head_close;

pub const STYLESHEET_FILE: &str = "styles.css";
pub const SCRIPT_FILE: &str = "script.js";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assets {
    pub markup: String,
    pub stylesheet: String,
    pub script: String,
}

fn style_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<style[^>]*>(.*?)</style>").unwrap())
}

fn script_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<script([^>]*)>(.*?)</script>").unwrap())
}

fn src_attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bsrc\s*=").unwrap())
}

fn join_parts<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Inline `<style>` and `<script>` bodies move out to their own files;
/// `<script src=...>` tags (CDN libraries) stay in the markup.
pub fn split(html: &str) -> Assets {
    let html = html.trim();
    if html.is_empty() {
        return Assets::default();
    }

    let stylesheet = join_parts(style_re().captures_iter(html).map(|c| c.get(1).map_or("", |m| m.as_str())));

    let mut scripts: Vec<String> = Vec::new();
    let without_scripts = script_re().replace_all(html, |c: &Captures| {
        if src_attr_re().is_match(&c[1]) {
            return c[0].to_string();
        }
        scripts.push(c[2].to_string());
        String::new()
    });
    let script = join_parts(scripts.iter().map(String::as_str));

    let mut markup = style_re().replace_all(&without_scripts, "").into_owned();

    let mut inject = String::new();
    if !stylesheet.is_empty() {
        inject.push_str(&format!("<link rel=\"stylesheet\" href=\"{STYLESHEET_FILE}\"/>\n"));
    }
    if !script.is_empty() {
        // deferred so it still runs after the body is parsed
        inject.push_str(&format!("<script src=\"{SCRIPT_FILE}\" defer></script>\n"));
    }
    if !inject.is_empty() {
        markup = insert_before_head_close(&markup, &inject);
    }

    Assets { markup: markup.trim().to_string(), stylesheet, script }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_input_gives_empty_assets() {
        assert_eq!(split("  \n "), Assets::default());
    }

    #[test]
    fn styles_and_scripts_move_out() {
        let html = r#"<html><head><style> body{} </style><STYLE media="print">p{}</STYLE></head>
<body><p>x</p><script>
a();
</script><script type="module">b();</script></body></html>"#;
        let a = split(html);
        assert_eq!(a.stylesheet, "body{}\n\np{}");
        assert_eq!(a.script, "a();\n\nb();");
        assert!(!a.markup.contains("<style"));
        assert!(!a.markup.contains("<STYLE"));
        assert!(!a.markup.contains("a();"));
        assert!(a.markup.contains(
            "<link rel=\"stylesheet\" href=\"styles.css\"/>\n<script src=\"script.js\" defer></script>\n</head>"
        ));
    }

    #[test]
    fn external_scripts_stay_in_markup() {
        let html = r#"<html><head><script src="https://cdn.tailwindcss.com"></script></head><body></body></html>"#;
        let a = split(html);
        assert_eq!(a.script, "");
        assert_eq!(a.markup, html);
    }

    #[test]
    fn no_head_prepends_references() {
        let a = split("<p>x</p><style>p{}</style>");
        assert_eq!(a.markup, "<link rel=\"stylesheet\" href=\"styles.css\"/>\n<p>x</p>");
        assert_eq!(a.stylesheet, "p{}");
    }

    #[test]
    fn reinlining_restores_bodies() {
        let html = "<html><head><style>h1{color:red}</style></head><body><h1>t</h1><script>go()</script></body></html>";
        let a = split(html);
        let rebuilt = a
            .markup
            .replace(
                "<link rel=\"stylesheet\" href=\"styles.css\"/>\n",
                &format!("<style>{}</style>", a.stylesheet),
            )
            .replace(
                "<script src=\"script.js\" defer></script>\n",
                &format!("<script>{}</script>", a.script),
            );
        assert!(rebuilt.contains("<style>h1{color:red}</style>"));
        assert!(rebuilt.contains("<script>go()</script>"));
        assert!(rebuilt.contains("<h1>t</h1>"));
    }
}
