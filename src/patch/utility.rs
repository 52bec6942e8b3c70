use serde::{Deserialize, Serialize};

use crate::safety::{insert_before_body_close, insert_before_head_close};

pub const DATE_GUARD_MARKER: &str = r#"data-genwebly="date-guard""#;
pub const CONTACT_TEXT_MARKER: &str = r#"id="contact-enforce-text""#;
pub const ICON_FALLBACK_MARKER: &str = r#"data-genwebly="icon-fallback""#;

const DATE_GUARD_SCRIPT: &str = r#"
<script data-genwebly="date-guard">
(function(){
  function todayStr(){
    const t=new Date();
    const m=String(t.getMonth()+1).padStart(2,'0');
    const d=String(t.getDate()).padStart(2,'0');
    return `${t.getFullYear()}-${m}-${d}`;
  }
  document.querySelectorAll('input[type="date"]').forEach(el=>{
    const td=todayStr();
    if(!el.min || el.min < td) el.min = td;
    if(el.value && el.value < td) el.value = td;
    el.addEventListener('change',()=>{ if(el.value && el.value < td) el.value = td; });
  });
})();
</script>
"#;

const CONTACT_TEXT_STYLE: &str = r#"
<style id="contact-enforce-text">
#contact, section#contact, .contact, .contact-section { color:#000 !important; }
#contact p, .contact p, #contact li, .contact li { color:#000 !important; }
</style>
"#;

const ICON_FALLBACK_SCRIPT: &str = r#"
<script data-genwebly="icon-fallback">
(function(){
  const editSVG = '<svg viewBox="0 0 24 24" width="18" height="18" fill="currentColor" aria-hidden="true"><path d="M3 17.25V21h3.75L17.81 9.94l-3.75-3.75L3 17.25zm14.71-9.04a1 1 0 0 0 0-1.41l-2.51-2.51a1 1 0 0 0-1.41 0l-1.83 1.83 3.75 3.75 2-1.66z"/></svg>';
  const delSVG = '<svg viewBox="0 0 24 24" width="18" height="18" fill="currentColor" aria-hidden="true"><path d="M6 19a2 2 0 0 0 2 2h8a2 2 0 0 0 2-2V7H6v12zM19 4h-3.5l-1-1h-5l-1 1H5v2h14V4z"/></svg>';
  document.querySelectorAll('.icon-edit').forEach(el=>{ if(!el.innerHTML.trim()) el.innerHTML = editSVG; });
  document.querySelectorAll('.icon-delete').forEach(el=>{ if(!el.innerHTML.trim()) el.innerHTML = delSVG; });
})();
</script>
"#;

/// Dates before today (local calendar, `YYYY-MM-DD`) are not selectable.
pub fn ensure_min_date(html: &str) -> String {
    if html.contains(DATE_GUARD_MARKER) {
        return html.to_string();
    }
    insert_before_body_close(html, DATE_GUARD_SCRIPT)
}

pub fn force_contact_text_black(html: &str) -> String {
    if html.contains(CONTACT_TEXT_MARKER) {
        return html.to_string();
    }
    insert_before_head_close(html, CONTACT_TEXT_STYLE)
}

/// Fill empty `.icon-edit` / `.icon-delete` elements with inline SVG icons.
pub fn inject_icon_fallback(html: &str) -> String {
    if html.contains(ICON_FALLBACK_MARKER) {
        return html.to_string();
    }
    insert_before_body_close(html, ICON_FALLBACK_SCRIPT)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utilities {
    pub date_guard: bool,
    pub contact_black: bool,
    pub icon_fallback: bool,
}

impl Utilities {
    pub fn apply(&self, html: &str) -> String {
        let mut out = html.to_string();
        if self.date_guard {
            out = ensure_min_date(&out);
        }
        if self.contact_black {
            out = force_contact_text_black(&out);
        }
        if self.icon_fallback {
            out = inject_icon_fallback(&out);
        }
        out
    }
}
