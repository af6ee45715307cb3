use clap::{Parser, Subcommand};
use fanlog::config::{load_config, resolve_config_path, Config};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "fanlog")]
#[command(about = "Bounded-duration fan-in message collector", long_about = None)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a collection session (the default).
    Run,
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a starter config file.
    Init {
        #[arg(long)]
        stdout: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fanlog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run) | None => {
            let config = match resolve_config_path(cli.config.as_deref()) {
                Some(path) => {
                    info!(config_path = %path.display(), "Loading configuration");
                    load_config(&path)?
                }
                None => Config::default(),
            };

            let summary = fanlog::coordinator::run(&config).await?;
            info!(
                entries = summary.collector.entries_written,
                output = %config.output.display(),
                "Collected log written"
            );
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { stdout } => {
                fanlog::config::generate::init(stdout)?;
            }
        },
    }

    Ok(())
}
