//! todosearch-client CLI entry point.

use clap::Parser;
use todosearch_client::cli::health::HealthAction;
use todosearch_client::cli::{Cli, Commands, OutputFormat};
use todosearch_client::client::SearchClient;
use todosearch_client::output::{format_output, format_todos, pretty};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todosearch_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let client = SearchClient::new(&cli.base_url, &cli.index)?;

    match cli.command {
        Commands::Search(search_cmd) => {
            let todos = client.search(&search_cmd.query()).await?;
            if todos.is_empty() && cli.quiet {
                return Ok(());
            }
            println!("{}", format_todos(&todos, cli.format));
        }
        Commands::Health(health_cmd) => match health_cmd.action.unwrap_or(HealthAction::Cluster) {
            HealthAction::Cluster => {
                let health = client.health_cluster().await?;
                match cli.format {
                    OutputFormat::Json => println!("{}", format_output(&health, cli.format)),
                    OutputFormat::Pretty => println!("{}", pretty::format_cluster_health(&health)),
                }
            }
            HealthAction::Index => {
                let status = client.health_index().await?;
                match cli.format {
                    OutputFormat::Json => println!("{}", format_output(&status, cli.format)),
                    OutputFormat::Pretty => println!("{}", pretty::format_index_status(&status)),
                }
            }
        },
    }

    Ok(())
}
