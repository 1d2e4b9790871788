//! See <https://github.com/matklad/cargo-xtask/>
//!
//! This binary defines various auxiliary build commands, which are not
//! expressible with just `cargo`.
//!
//! The binary is integrated into the `cargo` command line by using an
//! alias in `.cargo/config`.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod infra;
mod prelude;

/// Infrastructure tasks for the todosearch repository
#[derive(Debug, Parser)]
#[command(name = "xtask")]
#[command(about = "Infrastructure tasks for todosearch", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: Global,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Silence the command output
    #[clap(long, global = true)]
    pub silent: bool,

    /// Enable verbose output
    #[clap(long, global = true)]
    pub verbose: bool,
}

impl Global {
    pub fn is_silent(&self) -> bool {
        self.silent
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    fn default_filter(&self) -> &'static str {
        if self.verbose {
            "xtask=debug,todosearch_core=debug"
        } else {
            "xtask=warn"
        }
    }
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Synthesize, audit and deploy the search backend
    Infra(infra::InfraCommand),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.global.default_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Infra(infra_cmd) => {
            infra::run(infra_cmd, cli.global).await?;
        }
    }

    Ok(())
}
