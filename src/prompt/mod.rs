use crate::image::{ImageDirective, ImageSource};
use crate::theme::detect_visual_intent;

pub const DEFAULT_REQUEST: &str = "minimal landing page";

fn structure_contract() -> &'static str {
r##"Return ONE complete HTML document (no markdown). Prefer a single file with inline <style> and optional <script>. Make it responsive and accessible with good contrast.
STRUCTURE: header/nav, hero, 3 feature cards/sections, footer.
NAV: in-page anchors only (e.g., href="#about"). Smooth scrolling.
Buttons/links: External links target='_blank' rel='noopener noreferrer'.
Forms: no external navigation.
"##
}

fn image_instruction(user_text: &str, image: &ImageDirective) -> String {
    let svg = |hint: &str| {
        format!(
            "Generate visuals as inline SVG or CSS drawings that match the hint. No external URLs.\nImage Hint: {hint}\n"
        )
    };
    match &image.source {
        ImageSource::Url(_) | ImageSource::Embedded(_) => {
            "Use the user's provided image as the main hero background. Do not include other images.\n".to_string()
        }
        ImageSource::VectorHint(hint) => svg(hint),
        ImageSource::None if detect_visual_intent(user_text) => svg(user_text.trim()),
        ImageSource::None => {
            "Do NOT include external <img> unless asked. Use gradients/SVG if visuals are needed.\n".to_string()
        }
    }
}

/// Full instruction text for a fresh generation.
pub fn build_prompt(user_text: &str, image: &ImageDirective, stack_rules: &str, temperature: f32) -> String {
    let request = if user_text.trim().is_empty() { DEFAULT_REQUEST } else { user_text };
    let mut base = structure_contract().to_string();
    if !stack_rules.is_empty() {
        base.push_str(&format!("\nStack rules:\n{stack_rules}\n"));
    }
    base.push_str(&image_instruction(request, image));
    format!("{base}\nUser request:\n{request}\n(temperature={temperature})")
}

#[derive(Debug, Clone, Default)]
pub struct Revision<'a> {
    pub current_html: &'a str,
    pub stack_rules: &'a str,
    pub change_list: &'a str,
    pub extra_image_src: &'a str,
    pub image_place_hint: &'a str,
    pub svg_hint: &'a str,
    pub logic_fixes: &'a str,
}

/// Instruction text asking the model to edit an existing document in place.
pub fn build_revision_prompt(r: &Revision<'_>) -> String {
    let mut rules: Vec<String> = [
        "Revise the EXISTING HTML below. Do NOT recreate from scratch.",
        "APPLY ONLY the requested changes. Do not remove sections or anchors.",
        "Return ONE full HTML document (no markdown).",
        "IMPORTANT: If a change mentions color, font, placement, or logic, edit the exact CSS/JS/HTML selectors.",
        "Insert an HTML comment per applied change like <!--applied: change-key-->.",
        "Keep responsiveness and accessibility intact.",
        "YOU MUST make at least one visible modification to the HTML, even if the request is minor.",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    if !r.stack_rules.is_empty() {
        rules.push(format!("Respect these stack rules:\n{}", r.stack_rules));
    }

    let changes = r.change_list.trim();
    if changes.is_empty() {
        rules.push("User gave no changes → apply gentle improvements only.".into());
    } else {
        rules.push(format!("Apply these changes:\n{changes}\nALWAYS MODIFY AT LEAST ONE ELEMENT."));
    }

    if !r.logic_fixes.trim().is_empty() {
        rules.push(format!("Logic fixes:\n{}", r.logic_fixes.trim()));
    }
    if !r.extra_image_src.is_empty() && !r.image_place_hint.is_empty() {
        rules.push(format!(
            "PLACE THIS IMAGE EXACTLY at '{}'. USE THIS SRC ONLY: {}.",
            r.image_place_hint, r.extra_image_src
        ));
    }
    if !r.svg_hint.trim().is_empty() {
        rules.push(format!("Add inline SVG art: {}", r.svg_hint.trim()));
    }

    format!(
        "{}\n\n--- CURRENT HTML (EDIT THIS, DO NOT REWRITE) ---\n{}",
        rules.join("\n"),
        r.current_html
    )
}
