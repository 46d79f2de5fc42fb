use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod core;
mod sampler;

#[derive(Parser)]
#[command(name = "route-sampler")]
#[command(author, version, about = "Long-running travel time collector for a routing API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the collection loop
    Run {
        /// Path to the config file (default: user config dir)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Stop after one collection window
        #[arg(long)]
        once: bool,
    },

    /// Print the persisted samples
    Show {
        /// Path to the config file (default: user config dir)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Only show the most recent N samples
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, once } => {
            init_logging();
            cli::run::run(config, once).await
        }
        Commands::Show { config, json, limit } => {
            init_logging();
            cli::show::run(config, json, limit).await
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}
