use anyhow::{Context, Result};
use clap::Parser;
use fs_err as fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

mod cli;
mod config;
mod errors;
mod export;
mod image;
mod log;
mod patch;
mod preview;
mod prompt;
mod provider;
mod safety;
mod session;
mod split;
mod stack;
mod theme;
mod ux;

use cli::{Args, Command, GenerateArgs, OutputArgs, PatchArgs, RegenerateArgs};
use config::Config;
use errors::GenError;
use export::Payload;
use image::ImageDirective;
use provider::Provider;
use session::{Exchange, Session, Stage};

fn out_dir(cfg: &Config, out: Option<&Path>) -> PathBuf {
    out.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(&cfg.out_dir))
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn write_out(dir: &Path, payloads: &[Payload]) -> Result<()> {
    if payloads.is_empty() {
        ux::warn("nothing to export (empty document)");
        return Ok(());
    }
    let sum = export::write_payloads(dir, payloads).map_err(|e| GenError::Export(format!("{e:#}")))?;
    ux::print_export_dashboard(&sum);
    Ok(())
}

/// `generated.html`, or the split of `split_source` when `--split` is set.
fn export_document(cfg: &Config, html: &str, split_source: &str, out: &OutputArgs) -> Result<()> {
    let dir = out_dir(cfg, out.out.as_deref());
    let payloads = if out.split {
        export::split_payloads(&split::split(&safety::strip_fences(split_source)))
    } else {
        export::single_payloads(html)
    };
    write_out(&dir, &payloads)
}

fn save(args: &Args, cfg: &Config, stage: &str, ex: &Exchange, tx: Uuid) -> Result<()> {
    let saved = log::save_stage(stage, &ex.request, &ex.response, tx, cfg, args.save_request, args.save_response)?;
    log::log_saved_paths(stage, &saved);
    Ok(())
}

/// One revision round; failures are reported and leave the session as is.
async fn revise(
    args: &Args,
    cfg: &Config,
    session: &mut Session,
    prov: &dyn Provider,
    notes: &str,
    image: Option<&ImageDirective>,
    stage: &str,
    tx: Uuid,
) -> Result<bool> {
    let pb = ux::spinner("Regenerating...");
    let res = session.regenerate(prov, notes, image, cfg.revision_temperature).await;
    pb.finish_and_clear();

    match res {
        Ok(r) => {
            save(args, cfg, stage, &r.exchange, tx)?;
            if r.changed {
                ux::success("Regenerated successfully");
                ux::print_revision_diff(&r.previous, &session.html);
            } else {
                ux::warn("The model returned the same page; try more specific change notes.");
            }
            Ok(true)
        }
        Err(e) => {
            ux::error(&format!("{e:#}"));
            Ok(false)
        }
    }
}

async fn run_generate(args: &Args, cfg: &Config, g: &GenerateArgs, tx: Uuid) -> Result<()> {
    let image = ImageDirective::resolve(
        g.image_url.as_deref(),
        g.image_file.as_deref(),
        g.image_hint.as_deref(),
        &g.prompt,
    )?;
    let mut session = Session::new(g.stack.selection(), g.utilities.utilities());

    let prov = match provider::make_provider(cfg) {
        Ok(p) => p,
        Err(e) => {
            ux::error(&e.to_string());
            session.missing_credential();
            return export_document(cfg, &session.html, &session.html, &g.output);
        }
    };

    let pb = ux::spinner(&format!("Designing with {}...", prov.label()));
    let ex = session.generate(prov.as_ref(), &g.prompt, &image, cfg.temperature).await;
    pb.finish_and_clear();
    save(args, cfg, "generate", &ex, tx)?;

    if session.stage == Stage::Error {
        ux::error("Generation failed; the error page was exported.");
    } else {
        ux::success("Page generated");
    }
    export_document(cfg, &session.html, session.split_source(), &g.output)?;

    if !g.interactive || session.stage != Stage::Final {
        return Ok(());
    }
    let mut round = 1usize;
    while let Some(notes) = ux::ask("Describe the changes you want (empty line to finish):") {
        let stage = format!("regenerate.{round}");
        if revise(args, cfg, &mut session, prov.as_ref(), &notes, None, &stage, tx).await? {
            export_document(cfg, &session.html, session.split_source(), &g.output)?;
        }
        round += 1;
    }
    Ok(())
}

async fn run_regenerate(args: &Args, cfg: &Config, r: &RegenerateArgs, tx: Uuid) -> Result<()> {
    let prov = provider::make_provider(cfg)?;
    let doc = read_input(&r.input)?;
    let mut session = Session::from_document(doc, &r.prompt);
    session.stack = r.stack.selection();
    session.utilities = r.utilities.utilities();

    let image = match (&r.image_file, &r.place) {
        (Some(file), Some(place)) => {
            Some(ImageDirective::from_src(image::file_to_data_url(file)?).with_place(Some(place.as_str())))
        }
        (Some(_), None) => {
            ux::warn("--image-file is ignored without --place");
            None
        }
        _ => None,
    };

    if revise(args, cfg, &mut session, prov.as_ref(), &r.notes, image.as_ref(), "regenerate", tx).await? {
        export_document(cfg, &session.html, session.split_source(), &r.output)?;
    }
    Ok(())
}

/// `--image` as given, or a data URL when it names a local file.
fn image_src(arg: &str) -> Result<String> {
    let path = Path::new(arg);
    if path.is_file() {
        image::file_to_data_url(path)
    } else {
        Ok(arg.to_string())
    }
}

fn run_patch(cfg: &Config, p: &PatchArgs) -> Result<()> {
    let raw = read_input(&p.input)?;
    let image = p
        .image
        .as_deref()
        .map(image_src)
        .transpose()?
        .map(|src| ImageDirective::from_src(src).with_place(Some(p.place.as_str())));

    let mut pipeline = patch::Pipeline::new(&p.prompt);
    pipeline.options = pipeline.options.hero_image(p.hero_image.as_deref().unwrap_or(""));
    pipeline.utilities = p.utilities.utilities();
    pipeline.image = image.as_ref().and_then(ImageDirective::patch);
    let html = pipeline.run(&raw);
    debug!(bytes_in = raw.len(), bytes_out = html.len(), "patched");
    ux::success(&format!("Patched {}", p.input.display()));
    export_document(cfg, &html, &raw, &p.output)
}

fn run_split(cfg: &Config, input: &Path, out: Option<&Path>) -> Result<()> {
    let doc = read_input(input)?;
    let assets = split::split(&safety::strip_fences(&doc));
    write_out(&out_dir(cfg, out), &export::split_payloads(&assets))
}

fn run_preview(cfg: &Config, input: &Path, device: preview::Device, height: u32, out: Option<&Path>) -> Result<()> {
    let doc = read_input(input)?;
    let page = preview::preview(&doc, device, height);
    let payload = Payload { name: "preview.html", mime: "text/html", body: page };
    write_out(&out_dir(cfg, out), &[payload])
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    log::init(args.debug);

    let mut cfg = Config::load(args.config.as_deref())?;
    cfg.apply_args(&args);

    let tx = Uuid::new_v4();
    debug!(%tx, provider = provider::provider_name(cfg.provider), model = %cfg.model(), "config loaded");

    match &args.command {
        Command::Generate(g) => run_generate(&args, &cfg, g, tx).await,
        Command::Regenerate(r) => run_regenerate(&args, &cfg, r, tx).await,
        Command::Patch(p) => run_patch(&cfg, p),
        Command::Split { input, out } => run_split(&cfg, input, out.as_deref()),
        Command::Stack(s) => {
            let sel = s.selection();
            let check = stack::check_applicability(&sel.tags);
            ux::print_stack_check(&sel, &check, &sel.effective_rules());
            Ok(())
        }
        Command::Preview { input, device, height, out } => {
            run_preview(&cfg, input, *device, *height, out.as_deref())
        }
    }
}
