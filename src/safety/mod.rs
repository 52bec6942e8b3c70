use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Marker attribute on the injected click interceptor.
pub const LINK_GUARD_MARKER: &str = r#"data-genwebly="link-guard""#;

const LINK_GUARD_SCRIPT: &str = r#"
<script data-genwebly="link-guard">
document.addEventListener('click', function(e){
  const a = e.target.closest('a'); if(!a) return;
  const href = a.getAttribute('href') || '';
  if (href === '#' || href === '') {
    e.preventDefault();
    window.scrollTo({top: 0, behavior: 'smooth'});
    return;
  }
  if (href.startsWith('#')) {
    const el = document.getElementById(href.slice(1));
    if (el) { e.preventDefault(); el.scrollIntoView({behavior: 'smooth'}); }
    return;
  }
  if (/^https?:\/\//i.test(href) && a.target === '_blank') return;
  e.preventDefault();
});
</script>"#;

fn root_relative_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"href="/(?:[^/"][^"]*)?""#).unwrap())
}

fn absolute_link_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)<a\b[^<>]*\bhref="(https?://[^"]+)"[^<>]*>"#).unwrap())
}

fn target_attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\btarget\s*=").unwrap())
}

/// Remove markdown code fences the model sometimes wraps its answer in.
pub fn strip_fences(raw: &str) -> String {
    raw.replace("```html", "").replace("```", "").trim().to_string()
}

/// `href="/..."` (including bare `/`) becomes the in-page placeholder `#`;
/// protocol-relative `//host` links are left alone.
pub fn rewrite_root_relative(html: &str) -> String {
    root_relative_re().replace_all(html, r##"href="#""##).into_owned()
}

/// Absolute http(s) anchors open in a new context unless the tag already
/// declares a target. `<link>` and other tags are not touched.
pub fn add_external_targets(html: &str) -> String {
    absolute_link_tag_re()
        .replace_all(html, |caps: &regex::Captures| {
            let tag = &caps[0];
            if target_attr_re().is_match(tag) {
                return tag.to_string();
            }
            let href = format!(r#"href="{}""#, &caps[1]);
            tag.replacen(
                &href,
                &format!(r#"{href} target="_blank" rel="noopener noreferrer""#),
                1,
            )
        })
        .into_owned()
}

pub fn insert_before_body_close(html: &str, snippet: &str) -> String {
    if html.contains("</body>") {
        html.replacen("</body>", &format!("{snippet}</body>"), 1)
    } else {
        format!("{html}{snippet}")
    }
}

pub fn insert_before_head_close(html: &str, snippet: &str) -> String {
    if html.contains("</head>") {
        html.replacen("</head>", &format!("{snippet}</head>"), 1)
    } else {
        format!("{snippet}{html}")
    }
}

/// Sanitize raw model output. Empty input (after fence stripping) stays
/// empty; otherwise links are neutralized and the click interceptor is
/// injected once.
pub fn sanitize(raw: &str) -> String {
    let html = strip_fences(raw);
    if html.is_empty() {
        return html;
    }
    let html = rewrite_root_relative(&html);
    let html = add_external_targets(&html);
    if html.contains(LINK_GUARD_MARKER) {
        debug!("link guard already present");
        return html;
    }
    debug!("injecting link guard");
    insert_before_body_close(&html, LINK_GUARD_SCRIPT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fences_and_blank_input() {
        assert_eq!(sanitize("```html\n  \n```"), "");
        assert_eq!(sanitize(""), "");
        assert!(sanitize("```html\n<p>x</p>\n```").starts_with("<p>x</p>"));
    }

    #[test]
    fn root_relative_links_become_placeholder() {
        let out = rewrite_root_relative(r##"<a href="/">a</a><a href="/about/us?x=1">b</a><a href="#c">c</a>"##);
        assert_eq!(out, r##"<a href="#">a</a><a href="#">b</a><a href="#c">c</a>"##);
    }

    #[test]
    fn external_links_get_new_context() {
        let out = add_external_targets(r#"<a class="x" href="https://example.com/a">go</a>"#);
        assert_eq!(
            out,
            r#"<a class="x" href="https://example.com/a" target="_blank" rel="noopener noreferrer">go</a>"#
        );
    }

    #[test]
    fn declared_targets_are_respected() {
        let before = r#"<a target="_self" href="https://a.io">x</a><a href="http://b.io" target="_top">y</a>"#;
        assert_eq!(add_external_targets(before), before);
    }

    #[test]
    fn protocol_relative_links_are_kept() {
        let before = r#"<link href="//fonts.googleapis.com/css2?family=Inter" rel="stylesheet">"#;
        assert_eq!(rewrite_root_relative(before), before);
        assert_eq!(rewrite_root_relative(r#"<a href="/x/y">"#), r##"<a href="#">"##);
    }

    #[test]
    fn stylesheet_links_pass_through_sanitize() {
        let head = r#"<link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css" rel="stylesheet">"#;
        let out = sanitize(&format!("<html><head>{head}</head><body><a href=\"https://x.io\">x</a></body></html>"));
        assert!(out.contains(&format!("<head>{head}</head>")));
        assert_eq!(out.matches("target=").count(), 1);
    }

    #[test]
    fn non_anchor_tags_untouched() {
        let before = r#"<abbr href="https://a.io">a</abbr><area href="https://b.io">"#;
        assert_eq!(add_external_targets(before), before);
        let upper = add_external_targets(r#"<A href="https://a.io">a</A>"#);
        assert!(upper.contains(r#"target="_blank""#));
    }

    #[test]
    fn non_http_links_untouched() {
        let before = r##"<a href="mailto:a@b.c">m</a><a href="#top">t</a>"##;
        assert_eq!(add_external_targets(before), before);
    }

    #[test]
    fn interceptor_goes_before_body_close() {
        let out = sanitize("<html><body><p>x</p></body></html>");
        let guard = out.find(LINK_GUARD_MARKER).unwrap();
        assert!(guard < out.find("</body>").unwrap());
    }

    #[test]
    fn fragment_gets_interceptor_appended() {
        let out = sanitize("<p>x</p>");
        assert!(out.starts_with("<p>x</p>"));
        assert!(out.trim_end().ends_with("</script>"));
    }

    #[test]
    fn sanitize_is_idempotent_on_fragments() {
        let once = sanitize("<p>x</p>");
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn sanitize_is_idempotent() {
        let raw = r#"<html><body><a href="/x">a</a><a href="https://e.com">b</a></body></html>"#;
        let once = sanitize(raw);
        let twice = sanitize(&once);
        assert_eq!(twice, once);
        assert_eq!(once.matches(LINK_GUARD_MARKER).count(), 1);
        assert_eq!(once.matches("target=").count(), 1);
    }
}
