//! suggestctl CLI - debounced, sequence-fenced search suggestions
//!
//! Entry point for the `suggestctl` tool, which provides:
//! - One-shot lookups against the configured provider (`lookup`)
//! - A stdin-driven suggestion session printing every state change (`watch`)
//! - Config file management (`config`)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use suggestctl_core::config::load_dotenv;
use suggestctl_core::SuggestConfig;
use suggestctl_search::LookupArgs;

mod config;
mod render;
mod tracing_setup;
mod watch;

use config::ConfigArgs;
use tracing_setup::{init_tracing, TracingConfig};
use watch::WatchArgs;

#[derive(Parser, Debug)]
#[command(
    name = "suggestctl",
    author,
    version,
    about = "Debounced, sequence-fenced search suggestions",
    long_about = "Turn a stream of input edits into search suggestions. Lookups are debounced, \
                  tagged with a sequence number, and only the newest one is ever shown."
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    /// Config file (default: ~/.suggestctl/config.toml)
    #[arg(long, global = true, env = "SUGGESTCTL_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Look up a query once and print the results
    Lookup(LookupArgs),
    /// Read input edits from stdin and print suggestion state changes
    Watch(WatchArgs),
    /// Manage the config file
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&TracingConfig { debug: cli.debug }).ok();
    load_dotenv();

    match cli.command {
        Commands::Lookup(args) => {
            let config = load_config(cli.config.as_ref())?;
            suggestctl_search::run_lookup(args, &config).await?
        }
        Commands::Watch(args) => {
            let config = load_config(cli.config.as_ref())?;
            watch::run_watch(args, config).await?
        }
        Commands::Config(args) => config::run_config(args, cli.config.as_deref())?,
    }
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<SuggestConfig> {
    SuggestConfig::load(path.map(PathBuf::as_path)).context("Failed to load configuration")
}
