use std::path::Path;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::config::ConfigLoader;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective engine configuration
    Show,
    /// Show configuration file paths
    Path,
}

pub fn run(args: ConfigArgs, config_path: Option<&Path>) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(config_path),
        ConfigCommands::Path => show_paths(config_path),
    }
}

fn show_config(config_path: Option<&Path>) -> Result<()> {
    let (config, source) = ConfigLoader::load(config_path)?;
    println!("# source: {}", source);
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn show_paths(config_path: Option<&Path>) -> Result<()> {
    if let Some(path) = config_path {
        println!("Explicit config: {:?}", path);
    }
    println!("User config:     {:?}", ConfigLoader::user_config_path());
    println!("Results dir:     {:?}", flexsort_paths::results_dir());
    Ok(())
}
