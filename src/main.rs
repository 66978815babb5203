use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use seqpair::{run_batch, train_and_eval, DefaultAutodiffBackend, ExperimentConfig};

#[derive(Parser)]
#[command(name = "seqpair", about = "Seeded transformer experiments over paired DNA sequences")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single experiment for one seed
    Run {
        /// Model name, used to derive the checkpoint path
        #[arg(long, default_value = "base_transformer")]
        name: String,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Persist the fitted model and reuse an existing checkpoint
        #[arg(long)]
        save: bool,
    },
    /// Run the full seed sweep and write the results table
    Batch {
        /// Model name, used to derive checkpoint paths and the CSV filename
        #[arg(long, default_value = "base_transformer")]
        name: String,
        /// Disable checkpoint persistence and reuse
        #[arg(long)]
        no_save: bool,
    },
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let cfg = ExperimentConfig::load(cli.config.as_deref())
        .context("failed to load configuration")?;

    match cli.command {
        Commands::Run { name, seed, save } => {
            let result = train_and_eval::<DefaultAutodiffBackend>(&cfg, &name, seed, save)?;
            for (key, value) in result.iter() {
                println!("{key}: {value:.6}");
            }
        }
        Commands::Batch { name, no_save } => {
            run_batch::<DefaultAutodiffBackend>(&cfg, &name, !no_save)?;
        }
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
