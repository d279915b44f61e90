use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod report;
mod subject;

#[derive(Parser)]
#[command(name = "flexsort", about = "Flex Sort assessment engine harness")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine configuration file (defaults to the user config, then built-ins)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a session against a scripted subject
    Simulate(commands::simulate::SimulateArgs),
    /// Replay a recorded trial log and print its scorecard
    Score(commands::score::ScoreArgs),
    /// Inspect engine configuration
    Config(commands::config::ConfigArgs),
    /// Show what each report tier unlocks
    Tiers(commands::tiers::TiersArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Simulate(args) => commands::simulate::run(args, config_path),
        Commands::Score(args) => commands::score::run(args, config_path),
        Commands::Config(args) => commands::config::run(args, config_path),
        Commands::Tiers(args) => commands::tiers::run(args),
    }
}
