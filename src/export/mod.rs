use anyhow::{Context, Result};
use fs_err as fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::split::{self, Assets};

pub const SINGLE_FILE: &str = "generated.html";
pub const INDEX_FILE: &str = "index.html";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub name: &'static str,
    pub mime: &'static str,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct Written {
    pub path: PathBuf,
    pub mime: &'static str,
    pub bytes: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    pub files: Vec<Written>,
    pub bytes_written: u64,
}

/// `generated.html`, or nothing for an empty document.
pub fn single_payloads(html: &str) -> Vec<Payload> {
    if html.is_empty() {
        return Vec::new();
    }
    vec![Payload { name: SINGLE_FILE, mime: "text/html", body: html.to_string() }]
}

/// `index.html` + `styles.css` + `script.js`, each only when non-empty.
pub fn split_payloads(assets: &Assets) -> Vec<Payload> {
    [
        (INDEX_FILE, "text/html", &assets.markup),
        (split::STYLESHEET_FILE, "text/css", &assets.stylesheet),
        (split::SCRIPT_FILE, "application/javascript", &assets.script),
    ]
    .into_iter()
    .filter(|(_, _, body)| !body.is_empty())
    .map(|(name, mime, body)| Payload { name, mime, body: body.clone() })
    .collect()
}

/// Write each payload atomically into `dir`.
pub fn write_payloads(dir: &Path, payloads: &[Payload]) -> Result<ExportSummary> {
    fs::create_dir_all(dir)?;
    let mut sum = ExportSummary::default();
    for p in payloads {
        let path = dir.join(p.name);
        let tmp = NamedTempFile::new_in(dir)?;
        fs::write(tmp.path(), &p.body)?;
        tmp.persist(&path)
            .with_context(|| format!("persisting {}", path.display()))?;
        let bytes = p.body.len() as u64;
        sum.bytes_written += bytes;
        sum.files.push(Written { path, mime: p.mime, bytes });
    }
    Ok(sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_assets_are_skipped() {
        let assets = Assets { markup: "<p>x</p>".into(), stylesheet: String::new(), script: "go()".into() };
        let names: Vec<_> = split_payloads(&assets).iter().map(|p| (p.name, p.mime)).collect();
        assert_eq!(names, vec![("index.html", "text/html"), ("script.js", "application/javascript")]);
        assert!(single_payloads("").is_empty());
    }

    #[test]
    fn writes_files_into_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("site");
        let sum = write_payloads(&out, &single_payloads("<html></html>")).unwrap();
        assert_eq!(sum.files.len(), 1);
        assert_eq!(sum.bytes_written, 13);
        assert_eq!(std::fs::read_to_string(out.join("generated.html")).unwrap(), "<html></html>");
    }
}
