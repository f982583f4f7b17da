//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use shopcheck::settings::{DEFAULT_EVIDENCE_ROOT, ENV_EVIDENCE_DIR};
use shopcheck::TemplateKind;
use std::path::PathBuf;

/// shopcheck: inspect UI template registries and maintain test evidence
#[derive(Parser, Debug)]
#[command(name = "shopcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, value_enum, default_value_t = ColorArg::Auto, global = true)]
    pub color: ColorArg,

    /// Emit log lines as JSON objects
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect and validate template registries
    #[command(subcommand)]
    Templates(TemplatesCommand),

    /// Maintain the evidence directory tree
    #[command(subcommand)]
    Evidence(EvidenceCommand),
}

/// `templates` subcommands
#[derive(Subcommand, Debug)]
pub enum TemplatesCommand {
    /// List registered template names
    List(ListArgs),

    /// Print one template config
    Show(ShowArgs),

    /// Load and validate a registry file
    Check(CheckArgs),
}

/// `evidence` subcommands
#[derive(Subcommand, Debug)]
pub enum EvidenceCommand {
    /// Create screenshots/, video/ and traces/ under the evidence root
    Init(EvidenceArgs),

    /// Remove empty per-test video directories
    Clean(EvidenceArgs),
}

/// Where templates come from
#[derive(Args, Debug, Clone, Default)]
pub struct RegistrySource {
    /// YAML registry merged over the builtin templates
    #[arg(short, long, value_name = "FILE")]
    pub registry: Option<PathBuf>,

    /// Skip the builtin templates
    #[arg(long)]
    pub no_builtins: bool,
}

/// Arguments for `templates list`
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only list this kind
    #[arg(short, long, value_enum)]
    pub kind: Option<KindArg>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = FormatArg::Text)]
    pub format: FormatArg,

    #[command(flatten)]
    pub source: RegistrySource,
}

/// Arguments for `templates show`
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Template kind
    #[arg(value_enum)]
    pub kind: KindArg,

    /// Registry name (e.g. `signup`, `products`, `confirmation`)
    pub name: String,

    /// Output format (text prints YAML)
    #[arg(short, long, value_enum, default_value_t = FormatArg::Yaml)]
    pub format: FormatArg,

    #[command(flatten)]
    pub source: RegistrySource,
}

/// Arguments for `templates check`
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Registry file to validate
    pub file: PathBuf,
}

/// Arguments for `evidence init` and `evidence clean`
#[derive(Args, Debug)]
pub struct EvidenceArgs {
    /// Evidence root directory
    #[arg(long, env = ENV_EVIDENCE_DIR, default_value = DEFAULT_EVIDENCE_ROOT)]
    pub root: PathBuf,
}

/// Template kind argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindArg {
    /// Form templates
    Form,
    /// List templates
    List,
    /// Modal templates
    Modal,
}

impl From<KindArg> for TemplateKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Form => Self::Form,
            KindArg::List => Self::List,
            KindArg::Modal => Self::Modal,
        }
    }
}

/// Output format argument
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// YAML
    Yaml,
    /// JSON
    Json,
}

/// Color argument
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
