use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use suggestctl_core::SuggestConfig;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a default config file
    Init(InitArgs),
    /// Show the effective config (file, defaults and env overrides)
    Show,
    /// Show config file path
    Path,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(long, short)]
    pub force: bool,
}

pub fn run_config(args: ConfigArgs, path: Option<&Path>) -> Result<()> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(SuggestConfig::config_path);

    match args.command {
        ConfigCommands::Init(args) => run_init(args, &config_path),
        ConfigCommands::Show => run_show(&config_path),
        ConfigCommands::Path => {
            println!("{}", config_path.display());
            Ok(())
        }
    }
}

fn run_init(args: InitArgs, config_path: &Path) -> Result<()> {
    if config_path.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "Config already exists at {:?}\n\nUse --force to overwrite",
            config_path
        ));
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    std::fs::write(config_path, SuggestConfig::default().to_toml())
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("✅ Config written to {}", config_path.display());
    Ok(())
}

fn run_show(config_path: &Path) -> Result<()> {
    let mut config = SuggestConfig::load(Some(config_path))
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    if config.search.api_token.is_some() {
        config.search.api_token = Some("********".to_string());
    }

    print!("{}", config.to_toml());
    Ok(())
}
