use crate::config::Config;
use chrono::Utc;
use serde_json::json;
use fs_err as fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Console subscriber; `RUST_LOG` wins over the `--debug` default.
pub fn init(debug: bool) {
    let default = if debug { "genwebly=debug" } else { "genwebly=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

pub struct SavedPaths {
    pub dir: PathBuf,
    pub request: Option<PathBuf>,
    pub response: Option<PathBuf>,
}

fn tx_dir(root: &Path, tx: Uuid) -> PathBuf {
    root.join(".genwebly").join("tx").join(tx.to_string())
}

/// Keep the prompt and raw response of one stage for later inspection.
pub fn save_stage(
    stage: &str,
    prompt: &str,
    response: &str,
    tx: Uuid,
    cfg: &Config,
    save_request: bool,
    save_response: bool,
) -> anyhow::Result<SavedPaths> {
    let dir = tx_dir(Path::new(&cfg.root), tx);
    let mut request_path = None;
    let mut response_path = None;
    if !save_request && !save_response {
        return Ok(SavedPaths { dir, request: None, response: None });
    }
    fs::create_dir_all(&dir)?;

    let meta = json!({
        "tx": tx,
        "stage": stage,
        "saved_at": Utc::now().to_rfc3339(),
        "provider": crate::provider::provider_name(cfg.provider),
        "model": cfg.model(),
    });
    fs::write(dir.join(format!("{stage}.meta.json")), serde_json::to_string_pretty(&meta)?)?;

    if save_request {
        let p = dir.join(format!("{stage}.prompt.txt"));
        fs::write(&p, prompt)?;
        request_path = Some(p);
    }

    if save_response {
        let p = dir.join(format!("{stage}.response.html"));
        fs::write(&p, response)?;
        response_path = Some(p);
    }

    Ok(SavedPaths { dir, request: request_path, response: response_path })
}

pub fn log_saved_paths(stage: &str, saved: &SavedPaths) {
    debug!(stage, dir = %saved.dir.display(), "artifacts directory");
    match &saved.request {
        Some(p) => info!(stage, path = %p.display(), "prompt saved"),
        None => debug!(stage, "prompt not saved (flag off)"),
    }
    match &saved.response {
        Some(p) => info!(stage, path = %p.display(), "response saved"),
        None => debug!(stage, "response not saved (flag off)"),
    }
}
