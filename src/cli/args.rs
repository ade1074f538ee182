//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    cmp::CmpCommands, completions::CompletionsArgs, config::ConfigCommands, import::ImportArgs,
    init::InitArgs, kit::KitCommands, price::PriceArgs, quote::QuoteCommands, sow::SowArgs,
};

#[derive(Parser)]
#[command(name = "kitq")]
#[command(author, version, about = "Kit Quoting Toolkit")]
#[command(
    long_about = "Quote kit-based manufacturing runs from a plain-text component catalog and kit bills of materials."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .kitq/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new KITQ project
    Init(InitArgs),

    /// Component catalog management
    #[command(subcommand)]
    Cmp(CmpCommands),

    /// Kit (bill of materials) management
    #[command(subcommand)]
    Kit(KitCommands),

    /// Customer quote management
    #[command(subcommand)]
    Quote(QuoteCommands),

    /// Price a kit for a given number of kits
    Price(PriceArgs),

    /// Generate a Statement of Work for a quote
    Sow(SowArgs),

    /// Import catalog components from CSV
    Import(ImportArgs),

    /// View and edit configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}
