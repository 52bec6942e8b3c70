use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::patch::Utilities;
use crate::preview::{Device, DEFAULT_HEIGHT};
use crate::stack::{JsMode, StackSelection, StackTag};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[value(alias = "google")]
    Gemini,
    #[value(name = "openai", alias = "open-ai")]
    OpenAI,
    Anthropic,
    Ollama,
}

#[derive(Parser, Debug)]
#[command(name = "genwebly", version, about = "Prompt it. Build it. Generate a themed single-page website with an LLM")]
pub struct Args {
    #[arg(long, value_enum, global = true)]
    pub provider: Option<ProviderKind>,

    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Generation temperature (revisions use the configured revision temperature)
    #[arg(long, global = true)]
    pub temperature: Option<f32>,

    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, default_value_t = false, global = true)]
    pub save_request: bool,

    #[arg(long, default_value_t = false, global = true)]
    pub save_response: bool,

    #[arg(long, default_value_t = false, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a new page from a description
    Generate(GenerateArgs),
    /// Ask the model to revise an existing page
    Regenerate(RegenerateArgs),
    /// Run the post-processing pipeline over a raw HTML file (offline)
    Patch(PatchArgs),
    /// Split an HTML file into index.html, styles.css and script.js
    Split {
        input: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Check a stack selection and print the rules it adds to the prompt
    Stack(StackArgs),
    /// Wrap a page in a device-sized preview frame
    Preview {
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = Device::Desktop)]
        device: Device,
        #[arg(long, default_value_t = DEFAULT_HEIGHT)]
        height: u32,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct StackArgs {
    /// Technology tags, e.g. --stack html --stack css
    #[arg(long = "stack", value_enum)]
    pub tags: Vec<StackTag>,

    #[arg(long, value_enum, default_value_t = JsMode::Static)]
    pub js_mode: JsMode,

    /// What the JavaScript should do (tabs, modal, localStorage diary, ...)
    #[arg(long, default_value = "")]
    pub js_use: String,
}

impl StackArgs {
    pub fn selection(&self) -> StackSelection {
        StackSelection {
            tags: self.tags.iter().copied().collect::<BTreeSet<_>>(),
            js_mode: self.js_mode,
            js_use: self.js_use.clone(),
        }
    }
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct UtilityArgs {
    /// Block dates before today in date inputs
    #[arg(long, default_value_t = false)]
    pub date_guard: bool,

    /// Force black text in the contact section
    #[arg(long, default_value_t = false)]
    pub contact_black: bool,

    /// Inline SVG fallbacks for empty .icon-edit / .icon-delete elements
    #[arg(long, default_value_t = false)]
    pub icon_fallback: bool,
}

impl UtilityArgs {
    pub fn utilities(&self) -> Utilities {
        Utilities {
            date_guard: self.date_guard,
            contact_black: self.contact_black,
            icon_fallback: self.icon_fallback,
        }
    }
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct OutputArgs {
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Export index.html + styles.css + script.js instead of generated.html
    #[arg(long, default_value_t = false)]
    pub split: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct GenerateArgs {
    /// Describe your website
    #[arg(long, short, default_value = "")]
    pub prompt: String,

    /// Background image URL
    #[arg(long)]
    pub image_url: Option<String>,

    /// Image file to embed (png/jpg)
    #[arg(long)]
    pub image_file: Option<PathBuf>,

    /// Without an image, a hint for inline SVG art
    #[arg(long)]
    pub image_hint: Option<String>,

    #[command(flatten)]
    pub stack: StackArgs,

    #[command(flatten)]
    pub utilities: UtilityArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Keep asking for revision notes after generating
    #[arg(long, short, default_value_t = false)]
    pub interactive: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RegenerateArgs {
    /// Current page (raw model output preferred)
    #[arg(long)]
    pub input: PathBuf,

    /// Describe the changes you want
    #[arg(long, default_value = "")]
    pub notes: String,

    /// Original description, used for theming
    #[arg(long, default_value = "")]
    pub prompt: String,

    /// Image to place; used only together with --place
    #[arg(long)]
    pub image_file: Option<PathBuf>,

    /// Where the image should go, e.g. "bottom left, small, opacity 0.8"
    #[arg(long)]
    pub place: Option<String>,

    #[command(flatten)]
    pub stack: StackArgs,

    #[command(flatten)]
    pub utilities: UtilityArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct PatchArgs {
    pub input: PathBuf,

    #[arg(long, default_value = "")]
    pub prompt: String,

    /// Hero background image; applied when the prompt asks for a hero background
    #[arg(long)]
    pub hero_image: Option<String>,

    /// Image src (URL or file) for the explicit image patch
    #[arg(long)]
    pub image: Option<String>,

    #[arg(long, default_value = "")]
    pub place: String,

    #[command(flatten)]
    pub utilities: UtilityArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}
