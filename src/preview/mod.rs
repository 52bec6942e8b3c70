use clap::ValueEnum;

pub const MIN_HEIGHT: u32 = 600;
pub const MAX_HEIGHT: u32 = 1400;
pub const DEFAULT_HEIGHT: u32 = 900;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Device {
    Mobile,
    Tablet,
    Laptop,
    Desktop,
}

impl Device {
    pub fn width(self) -> u32 {
        match self {
            Device::Mobile => 375,
            Device::Tablet => 768,
            Device::Laptop => 1280,
            Device::Desktop => 1440,
        }
    }
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}

/// Dark page with a centered white frame; the document is loaded through
/// `srcdoc` so its own `<html>`/`<head>` stay intact.
pub fn preview(doc: &str, device: Device, height: u32) -> String {
    let w = device.width();
    let h = height.clamp(MIN_HEIGHT, MAX_HEIGHT);
    format!(
        r#"<!doctype html>
<html>
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <style>
    body {{ margin: 0; padding: 24px 12px; background: #0b0f1a; font-family: system-ui, -apple-system, Segoe UI, Roboto; }}
    .frame {{ display: block; width: {w}px; height: {h}px; margin: 0 auto; border-radius: 18px; border: 1px solid rgba(120,130,150,.35); box-shadow: 0 20px 60px rgba(0,0,0,.18); overflow: auto; background: #fff; }}
  </style>
</head>
<body>
  <iframe class="frame" title="preview" srcdoc="{}"></iframe>
</body>
</html>
"#,
        escape_attr(doc)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_widths() {
        let widths: Vec<u32> = [Device::Mobile, Device::Tablet, Device::Laptop, Device::Desktop]
            .into_iter()
            .map(Device::width)
            .collect();
        assert_eq!(widths, vec![375, 768, 1280, 1440]);
    }

    #[test]
    fn height_is_clamped() {
        assert!(preview("", Device::Mobile, 100).contains("width: 375px; height: 600px;"));
        assert!(preview("", Device::Desktop, 5000).contains("width: 1440px; height: 1400px;"));
        assert!(preview("", Device::Tablet, DEFAULT_HEIGHT).contains("height: 900px;"));
    }

    #[test]
    fn document_is_escaped_into_srcdoc() {
        let page = preview(r#"<a href="x">a &amp; b</a>"#, Device::Laptop, 900);
        assert!(page.contains(r#"srcdoc="<a href=&quot;x&quot;>a &amp;amp; b</a>""#));
        assert!(page.contains("background: #0b0f1a;"));
    }
}
