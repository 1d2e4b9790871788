//! CLI command definitions.

pub mod health;
pub mod search;

use clap::{Parser, Subcommand, ValueEnum};

/// CLI client for the todosearch search endpoint.
#[derive(Debug, Parser)]
#[command(name = "todosearch-client")]
#[command(about = "CLI client for the todosearch search endpoint", long_about = None)]
pub struct Cli {
    /// Search endpoint base URL.
    #[arg(
        long,
        env = "TODOSEARCH_SEARCH_URL",
        default_value = "http://localhost:9200"
    )]
    pub base_url: String,

    /// Index holding the replicated todos.
    #[arg(long, env = "TODOSEARCH_INDEX", default_value = "todo")]
    pub index: String,

    /// Output format.
    #[arg(long, default_value = "pretty")]
    pub format: OutputFormat,

    /// Suppress non-essential output.
    #[arg(long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Raw JSON output.
    Json,
    /// Human-readable output.
    #[default]
    Pretty,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Search todos by content.
    Search(search::SearchCommand),
    /// Search endpoint health checks.
    Health(health::HealthCommand),
}
