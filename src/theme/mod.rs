/// Seven color roles rendered into the injected `:root` custom properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub name: &'static str,
    pub bg: &'static str,
    pub bg2: &'static str,
    pub text: &'static str,
    pub muted: &'static str,
    pub primary: &'static str,
    pub accent: &'static str,
    pub border: &'static str,
}

const fn pal(
    name: &'static str,
    bg: &'static str,
    bg2: &'static str,
    text: &'static str,
    muted: &'static str,
    primary: &'static str,
    accent: &'static str,
    border: &'static str,
) -> Palette {
    Palette { name, bg, bg2, text, muted, primary, accent, border }
}

pub const DEFAULT_PALETTE: Palette =
    pal("default", "#faf6ff", "#e7f1ff", "#0f172a", "#64748b", "#8b5cf6", "#22d3ee", "#dbeafe");

const PALETTE_GROUPS: &[(&[&str], Palette)] = &[
    (
        &["wedding", "love", "invite", "bride", "groom"],
        pal("wedding", "#fff7fb", "#fdeef4", "#2d1f24", "#7a6a70", "#d9c06d", "#f4b6c2", "#ead9b0"),
    ),
    (
        &["tech", "ai", "cyber", "startup", "saas"],
        pal("tech", "#0b0f1a", "#141a2a", "#e6f0ff", "#9db2ce", "#7b2ff7", "#00f0ff", "#27304a"),
    ),
    (
        &["coffee", "cafe", "bakery", "espresso"],
        pal("coffee", "#fff8f0", "#f3e5d8", "#2b211a", "#7a5c49", "#b36a3c", "#d2a679", "#e2c8ad"),
    ),
    (
        &["fashion", "style", "boutique"],
        pal("fashion", "#fffafc", "#fde8f2", "#1f1a1d", "#846877", "#f472b6", "#facc15", "#eed4e1"),
    ),
    (
        &["portfolio", "resume", "personal"],
        pal("portfolio", "#f6f7fb", "#e9edfb", "#0f172a", "#4b5563", "#6366f1", "#22d3ee", "#c7d2fe"),
    ),
    (
        &["travel", "beach", "adventure", "tour"],
        pal("travel", "#f1fbff", "#e6faff", "#0b2a3a", "#4b6b7a", "#38bdf8", "#fbbf24", "#cfe9f6"),
    ),
];

/// Colors and motif used to parameterize the ambient illustration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoration {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub motif: &'static str,
}

const fn deco(primary: &'static str, secondary: &'static str, motif: &'static str) -> Decoration {
    Decoration { primary, secondary, motif }
}

pub const DEFAULT_DECORATION: Decoration = deco("#e0c3fc", "#8ec5fc", "soft pastel sparkles");

// Keyword lists are narrower than PALETTE_GROUPS.
const DECORATION_GROUPS: &[(&[&str], Decoration)] = &[
    (&["wedding", "love", "invite"], deco("#f4b6c2", "#ffd6e0", "roses and cherry blossoms")),
    (&["tech", "ai", "cyber", "startup"], deco("#00f0ff", "#7b2ff7", "circuit lines and neon glow")),
    (&["coffee", "cafe", "bakery"], deco("#b6905b", "#f5deb3", "coffee cups and steam")),
    (&["fashion", "style", "boutique"], deco("#f9a8d4", "#fcd34d", "flowing fabric ribbons")),
    (&["portfolio", "resume", "personal"], deco("#60a5fa", "#a78bfa", "abstract geometric polygons")),
    (&["travel", "beach", "adventure"], deco("#38bdf8", "#facc15", "waves and airplane trails")),
];

const VISUAL_KEYWORDS: &[&str] = &[
    "flowers",
    "floral",
    "cloud",
    "butterfly",
    "sparkle",
    "glow",
    "neon",
    "pattern",
    "illustration",
    "icons",
    "waves",
    "palm",
    "bokeh",
    "confetti",
    "cherries",
    "stars",
    "gradient background",
    "texture",
    "grid",
    "circuit",
];

/// First row with a substring hit in the lower-cased text wins.
fn first_match<T: Copy>(text: &str, table: &[(&[&str], T)], fallback: T) -> T {
    let t = text.to_lowercase();
    table
        .iter()
        .find(|(keys, _)| keys.iter().any(|k| t.contains(k)))
        .map(|(_, v)| *v)
        .unwrap_or(fallback)
}

pub fn resolve_palette(text: &str) -> Palette {
    first_match(text, PALETTE_GROUPS, DEFAULT_PALETTE)
}

pub fn resolve_decoration(text: &str) -> Decoration {
    first_match(text, DECORATION_GROUPS, DEFAULT_DECORATION)
}

/// True when the prompt asks for decorative visuals on its own.
pub fn detect_visual_intent(text: &str) -> bool {
    let t = text.to_lowercase();
    VISUAL_KEYWORDS.iter().any(|k| t.contains(k))
}

/// Marker attribute carried by the injected theme stylesheet.
pub const THEME_MARKER: &str = r#"data-genwebly="theme""#;
/// Marker id of the ambient illustration.
pub const ART_MARKER: &str = r#"id="theme-art""#;

pub fn render_css(p: &Palette) -> String {
    format!(
        r#"
<style {marker}>
:root {{
  --bg: {bg};
  --bg2: {bg2};
  --text: {text};
  --muted: {muted};
  --primary: {primary};
  --accent: {accent};
  --border: {border};
}}
html, body {{
  background: radial-gradient(1200px 700px at 20% 0%, var(--bg2), var(--bg));
  color: var(--text);
}}
section, .card, .panel, .feature {{
  background: rgba(255,255,255,0.6);
  backdrop-filter: blur(6px);
  border: 1px solid var(--border);
  border-radius: 14px;
  padding: 1.25rem; margin: .75rem 0;
}}
#hero {{
  min-height: 70vh; display: flex; align-items: center; justify-content: center;
  position: relative; overflow: hidden;
}}
h1, h2, h3 {{ color: var(--text); letter-spacing: .3px; text-shadow: 0 1px 0 rgba(255,255,255,.25); }}
a, .link {{ color: var(--primary); text-decoration: none; }}
a:hover {{ opacity: .9; }}
button, .btn, .cta, input[type="submit"] {{
  display: inline-block; padding: .75rem 1.1rem; border-radius: 12px;
  border: 1px solid var(--border);
  background: linear-gradient(180deg, var(--primary), var(--accent));
  color: #0d0f12; font-weight: 600; cursor: pointer;
  transition: transform .08s ease, box-shadow .18s ease;
  box-shadow: 0 6px 20px rgba(0,0,0,.12);
}}
button:hover, .btn:hover, .cta:hover, input[type="submit"]:hover {{ transform: translateY(-2px); }}
nav a {{ padding: .35rem .6rem; border-radius: 8px; }}
hr {{ border: 0; height: 1px; background: linear-gradient(90deg, transparent, var(--border), transparent); }}
</style>
"#,
        marker = THEME_MARKER,
        bg = p.bg,
        bg2 = p.bg2,
        text = p.text,
        muted = p.muted,
        primary = p.primary,
        accent = p.accent,
        border = p.border,
    )
}

/// Low-opacity corner illustration; never intercepts pointer events.
pub fn render_svg(d: &Decoration) -> String {
    format!(
        r#"
<svg {marker} viewBox="0 0 220 220" width="240" height="240" aria-hidden="true"
     style="position:absolute;top:-10px;left:-10px;opacity:.15;z-index:0;pointer-events:none;">
  <defs>
    <linearGradient id="theme-art-grad" x1="0" y1="0" x2="1" y2="1">
      <stop offset="0" stop-color="{c1}"/><stop offset="1" stop-color="{c2}"/>
    </linearGradient>
  </defs>
  <g fill="url(#theme-art-grad)" stroke="{c2}" stroke-width="0.6">
    <path d="M40,110 C60,80 90,70 120,70 C145,70 170,80 185,95
             C130,125 90,150 55,170 C35,150 25,130 40,110 Z"/>
    <text x="12" y="205" font-size="10" fill="{c2}" opacity=".6">{motif}</text>
  </g>
</svg>
"#,
        marker = ART_MARKER,
        c1 = d.primary,
        c2 = d.secondary,
        motif = d.motif,
    )
}
