//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Wayfarer - grow a flight-itinerary extraction program one email at a time.
#[derive(Debug, Parser)]
#[command(name = "wayfarer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format for tables and reports
    #[arg(long, value_enum, global = true)]
    pub output_format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.wayfarer/config.toml)
    #[arg(short, long, global = true, env = "WAYFARER_CONFIG")]
    pub config: Option<PathBuf>,

    /// More log output (repeat for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Synthesize an extraction program from matching emails
    Run(RunArgs),

    /// Apply a rule program to documents
    Apply(ApplyArgs),

    /// Print the built-in rule catalogue
    Catalogue(CatalogueArgs),

    /// Show or initialize the configuration file
    Config(ConfigArgs),
}

/// Where documents come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SourceArg {
    /// Gmail REST API
    Gmail,
    /// JSON-lines corpus file
    Jsonl,
}

/// Program representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ProgramFormatArg {
    /// Free-form code text
    Opaque,
    /// JSON rule set
    Rules,
}

/// Oracle provider override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ProviderArg {
    /// Local Ollama server
    Ollama,
    /// OpenAI-compatible API
    Openai,
    /// Canned replies, for dry runs
    Mock,
}

/// Arguments for the run command.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Document source
    #[arg(long, value_enum, default_value = "gmail")]
    pub source: SourceArg,

    /// Corpus file for the jsonl source
    #[arg(long, required_if_eq("source", "jsonl"))]
    pub corpus: Option<PathBuf>,

    /// Search query
    #[arg(long)]
    pub query: Option<String>,

    /// Documents per batch
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Token ceiling per prompt
    #[arg(long)]
    pub token_limit: Option<usize>,

    /// Program representation
    #[arg(long, value_enum)]
    pub format: Option<ProgramFormatArg>,

    /// Oracle provider
    #[arg(long, value_enum)]
    pub provider: Option<ProviderArg>,

    /// Oracle model
    #[arg(long)]
    pub model: Option<String>,

    /// Start from the built-in rule catalogue (rules format only)
    #[arg(long, conflicts_with = "resume")]
    pub seed_catalogue: bool,

    /// Save run state here after every batch
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Resume from a saved run state
    #[arg(long)]
    pub resume: Option<PathBuf>,

    /// Write the final program here
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Stop after this many batches
    #[arg(long)]
    pub max_batches: Option<u64>,
}

/// Arguments for the apply command.
#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Rule program file
    #[arg(short, long)]
    pub program: PathBuf,

    /// Plain-text email body
    #[arg(short, long, conflicts_with = "corpus", required_unless_present = "corpus")]
    pub input: Option<PathBuf>,

    /// JSON-lines corpus
    #[arg(long)]
    pub corpus: Option<PathBuf>,

    /// Only documents matching every term (corpus only)
    #[arg(long, default_value = "")]
    pub query: String,

    /// List documents without itineraries too
    #[arg(long)]
    pub all: bool,
}

/// Arguments for the catalogue command.
#[derive(Debug, Args)]
pub struct CatalogueArgs {
    /// Write the catalogue here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for config management.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config management actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

impl From<ProgramFormatArg> for wayfarer_synthesizer::ProgramFormat {
    fn from(format: ProgramFormatArg) -> Self {
        match format {
            ProgramFormatArg::Opaque => wayfarer_synthesizer::ProgramFormat::Opaque,
            ProgramFormatArg::Rules => wayfarer_synthesizer::ProgramFormat::Rules,
        }
    }
}

impl From<ProviderArg> for crate::config::ProviderKind {
    fn from(provider: ProviderArg) -> Self {
        match provider {
            ProviderArg::Ollama => crate::config::ProviderKind::Ollama,
            ProviderArg::Openai => crate::config::ProviderKind::OpenAi,
            ProviderArg::Mock => crate::config::ProviderKind::Mock,
        }
    }
}
