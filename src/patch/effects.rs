use regex::{NoExpand, Regex};
use std::sync::OnceLock;

use crate::safety::insert_before_body_close;

/// Container id; its presence means the overlay is already installed.
pub const EFFECTS_MARKER: &str = r#"id="sparkles""#;

const REMOVAL_PHRASES: &[&str] = &[
    "no sparkle",
    "remove sparkle",
    "remove sparkles",
    "remove snow",
    "remove floating",
];

const EFFECT_KEYWORDS: &[&str] = &[
    "sparkle", "sparkles", "glow", "neon", "bokeh", "confetti", "dreamy", "magic", "fairy",
];

pub const PARTICLE_COUNT: usize = 28;

fn effects_block() -> String {
    format!(
        r#"
<style data-genwebly="effects">
#sparkles{{position:fixed;inset:0;pointer-events:none;z-index:1;}}
.sparkle{{position:absolute;border-radius:50%;
background:radial-gradient(circle, rgba(255,255,255,0.9), rgba(255,255,255,0));
opacity:.6;filter:blur(.5px);animation:float 6s linear infinite;}}
@keyframes float{{from{{transform:translateY(0)}}to{{transform:translateY(-120vh)}}}}
</style>
<div id="sparkles" data-genwebly="effects"></div>
<script data-genwebly="effects">(function(){{const c=document.getElementById('sparkles');if(!c)return;
for(let i=0;i<{PARTICLE_COUNT};i++){{const s=document.createElement('div');s.className='sparkle';
const d=3+Math.random()*7;s.style.width=d+'px';s.style.height=d+'px';
s.style.left=Math.random()*100+'vw';s.style.top=(100+Math.random()*40)+'vh';
s.style.animationDelay=(Math.random()*6)+'s';
s.style.animationDuration=(5+Math.random()*6)+'s';c.appendChild(s);}}}})();</script>
"#
    )
}

fn marked_element_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)\n?<(?:style|script)\b[^>]*data-genwebly="effects"[^>]*>.*?</(?:style|script)>\n?"#)
            .unwrap()
    })
}

fn container_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"\n?<div id="sparkles"[^>]*>\s*</div>\n?"#).unwrap())
}

pub fn wants_removal(text: &str) -> bool {
    let t = text.to_lowercase();
    REMOVAL_PHRASES.iter().any(|p| t.contains(p))
}

pub fn wants_effects(text: &str) -> bool {
    let t = text.to_lowercase();
    EFFECT_KEYWORDS.iter().any(|k| t.contains(k))
}

pub fn is_installed(html: &str) -> bool {
    html.contains(EFFECTS_MARKER)
}

/// Remove the style, container and script of a previously injected overlay.
pub fn remove(html: &str) -> String {
    let html = marked_element_re().replace_all(html, NoExpand(""));
    container_re().replace_all(&html, NoExpand("")).into_owned()
}

/// Install the overlay unless it is already present.
pub fn inject(html: &str) -> String {
    if is_installed(html) {
        return html.to_string();
    }
    insert_before_body_close(html, &effects_block())
}
