//! Castle CLI - Train and evaluate a Q-learning agent on the castle puzzle
//!
//! This CLI provides a unified interface for:
//! - Training the agent with checkpointing and early stopping
//! - Evaluating saved value tables, optionally rendering an episode
//! - Inspecting saved value tables

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "castle")]
#[command(version, about = "Grid combat puzzle with a tabular Q-learning agent", long_about = None)]
struct Cli {
    /// Log debug events (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the Q-learning agent
    Train(Box<castle_warrior::cli::commands::train::TrainArgs>),

    /// Evaluate a saved value table with greedy play
    Evaluate(Box<castle_warrior::cli::commands::evaluate::EvaluateArgs>),

    /// Show statistics for a saved value table
    Inspect(castle_warrior::cli::commands::inspect::InspectArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Train(args) => castle_warrior::cli::commands::train::execute(*args),
        Commands::Evaluate(args) => castle_warrior::cli::commands::evaluate::execute(*args),
        Commands::Inspect(args) => castle_warrior::cli::commands::inspect::execute(args),
    }
}
