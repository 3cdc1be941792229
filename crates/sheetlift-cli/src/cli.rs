//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sheetlift - Extract structured JSON from datasheet Markdown with an LLM.
#[derive(Debug, Parser)]
#[command(name = "sheetlift")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "SHEETLIFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Environment file loaded before the API key is read
    #[arg(long, global = true, default_value = ".env")]
    pub env_file: PathBuf,

    /// Model identifier (overrides the configuration)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Completion provider (overrides the configuration)
    #[arg(short, long, value_enum, global = true)]
    pub provider: Option<ProviderArg>,

    /// API key (overrides the environment)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Completion provider options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ProviderArg {
    /// Alibaba DashScope text generation
    Dashscope,
    /// Local Ollama server
    Ollama,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract one Markdown document
    Extract(ExtractArgs),

    /// Extract every Markdown document under a directory
    Batch(BatchArgs),

    /// Merge prior results into a whole-handbook extraction
    Aggregate(AggregateArgs),
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Markdown document to extract
    #[arg(short, long)]
    pub input: PathBuf,

    /// Prompt template file
    #[arg(short, long)]
    pub template: PathBuf,

    /// Output file (default: <input stem>_output.txt next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the batch command.
#[derive(Debug, Parser)]
pub struct BatchArgs {
    /// Directory searched recursively for input documents
    #[arg(short, long)]
    pub input_dir: PathBuf,

    /// Directory receiving one artifact per input
    #[arg(short, long)]
    pub output_dir: PathBuf,

    /// Prompt template file
    #[arg(short, long)]
    pub template: PathBuf,
}

/// Arguments for the aggregate command.
#[derive(Debug, Parser)]
pub struct AggregateArgs {
    /// Full handbook Markdown
    #[arg(long)]
    pub handbook: PathBuf,

    /// Prompt template file
    #[arg(short, long)]
    pub template: PathBuf,

    /// Directories holding prior results
    #[arg(short, long, num_args = 1.., required = true)]
    pub results: Vec<PathBuf>,

    /// Output file
    #[arg(short, long, default_value = "handbook_nodes.json")]
    pub output: PathBuf,
}

impl From<ProviderArg> for crate::config::ProviderKind {
    fn from(provider: ProviderArg) -> Self {
        match provider {
            ProviderArg::Dashscope => crate::config::ProviderKind::Dashscope,
            ProviderArg::Ollama => crate::config::ProviderKind::Ollama,
        }
    }
}
