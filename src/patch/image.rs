use regex::{Captures, Regex};
use std::sync::OnceLock;
use tracing::debug;

use crate::safety::insert_before_body_close;

pub const IMAGE_MARKER: &str = r#"data-genwebly="explicit-image""#;

const SECTION_IDS: [&str; 3] = ["contact", "about", "hero"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Replace the contents of `<section id="...">`.
    Section(&'static str),
    Corner(Corner),
    /// Just before `</body>`.
    Append,
}

impl Placement {
    pub fn from_hint(hint: &str) -> Self {
        let h = hint.to_lowercase();
        if let Some(id) = SECTION_IDS.iter().copied().find(|id| h.contains(id)) {
            return Placement::Section(id);
        }
        if h.contains("bottom left") {
            Placement::Corner(Corner::BottomLeft)
        } else if h.contains("bottom right") {
            Placement::Corner(Corner::BottomRight)
        } else {
            Placement::Append
        }
    }
}

fn opacity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"opacity\s*:?\s*([0-9]*\.?[0-9]+)").unwrap())
}

fn section_res() -> &'static [(&'static str, Regex)] {
    static RE: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    RE.get_or_init(|| {
        SECTION_IDS
            .iter()
            .map(|id| {
                let pat = format!(r#"(?is)(<section[^>]*id=["']{id}["'][^>]*>)(.*?)(</section>)"#);
                (*id, Regex::new(&pat).unwrap())
            })
            .collect()
    })
}

fn max_width(hint: &str) -> Option<&'static str> {
    if hint.contains("small") {
        Some("90px")
    } else if hint.contains("medium") {
        Some("180px")
    } else if hint.contains("large") {
        Some("260px")
    } else {
        None
    }
}

/// Opacity from `opacity <n>`; values above 1 are read as percentages.
pub fn parse_opacity(hint: &str) -> Option<f64> {
    let caps = opacity_re().captures(hint)?;
    let v: f64 = caps[1].parse().ok()?;
    Some(if v > 1.0 { v / 100.0 } else { v })
}

pub fn image_tag(src: &str, hint: &str) -> String {
    let hint = hint.to_lowercase();
    let mut styles = vec![
        "width:100%".to_string(),
        "height:100%".to_string(),
        "object-fit:contain".to_string(),
        "display:block".to_string(),
    ];
    if let Some(w) = max_width(&hint) {
        styles.push(format!("max-width:{w}"));
    }
    if let Some(op) = parse_opacity(&hint) {
        styles.push(format!("opacity:{op}"));
    }
    format!(
        r#"<img src="{}" loading="lazy" {IMAGE_MARKER} style="{};" />"#,
        src.replace('"', "&quot;"),
        styles.join(";")
    )
}

fn corner_wrapper(corner: Corner, img: &str) -> String {
    let side = match corner {
        Corner::BottomLeft => "left",
        Corner::BottomRight => "right",
    };
    format!("<div style='position:absolute;{side}:0;bottom:0;z-index:50;'>{img}</div>")
}

/// Place `src` according to `hint`. Re-applying the same image is a no-op.
/// A nested `<section>` inside the target section ends the match early.
pub fn apply_explicit_image(html: &str, src: &str, hint: &str) -> String {
    let img = image_tag(src, hint);
    if html.contains(&img) {
        return html.to_string();
    }
    let placement = Placement::from_hint(hint);
    debug!(?placement, "placing explicit image");
    match placement {
        Placement::Section(id) => {
            let Some((_, re)) = section_res().iter().find(|(sid, _)| *sid == id) else {
                return html.to_string();
            };
            re.replace_all(html, |c: &Captures| format!("{}{}{}", &c[1], img, &c[3]))
                .into_owned()
        }
        Placement::Corner(corner) => insert_before_body_close(html, &corner_wrapper(corner, &img)),
        Placement::Append => insert_before_body_close(html, &img),
    }
}
