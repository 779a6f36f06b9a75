use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "spectator")]
#[command(version, about = "Spectate, record and queue live matches")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the configuration file (defaults to ./spectator.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Spectate and record the live match of the summoner in a job file
    Spectate {
        /// Path to the job file (JSON)
        job: PathBuf,

        /// Directory the capture tool writes to. Overrides the config file.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// View or initialize configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Print the latest game version from the version feed
    Version,
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Write a default spectator.toml
    Init,
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "spectator=debug"
    } else {
        "spectator=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Spectate { job, output_dir } => {
            cmd::cmd_spectate(&cli, job, output_dir.as_deref()).await?
        }
        Commands::Config { command } => cmd::cmd_config(&cli, command.clone())?,
        Commands::Version => cmd::cmd_version(&cli).await?,
    }

    Ok(())
}
