//! `suggestctl watch`: drive a coordinator from stdin
//!
//! Each stdin line is the full content of the input buffer; an empty line
//! clears it. Lines starting with `:` are controls:
//!
//! ```text
//! :dismiss      close the list, keep the query
//! :select N     pick item N (0-based) from the open list
//! :state        print the current snapshot
//! :quit         shut down and exit
//! ```
//!
//! On end of input the driver waits for the last debounced lookup to settle
//! before shutting down, so piped scripts see their results.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use suggestctl_core::{Coordinator, CoordinatorHandle, SuggestConfig, Subscription};
use suggestctl_search::{provider_from_config, OutputFormat};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument};

use crate::render::{format_state, render_event};

/// Watch subcommand arguments
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Output format (text, json)
    #[arg(long, short = 'f', default_value = "text")]
    pub format: OutputFormat,

    /// Search a local JSON symbol list instead of the endpoint
    #[arg(long, value_name = "FILE")]
    pub symbols: Option<PathBuf>,

    /// Debounce window in milliseconds (overrides coordinator.debounce_ms)
    #[arg(long)]
    pub debounce_ms: Option<u64>,
}

#[derive(Debug, PartialEq, Eq)]
enum Line {
    Input(String),
    Dismiss,
    Select(usize),
    State,
    Quit,
}

fn parse_line(line: &str) -> Result<Line> {
    let Some(control) = line.strip_prefix(':') else {
        return Ok(Line::Input(line.to_string()));
    };

    let mut parts = control.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("dismiss"), None) => Ok(Line::Dismiss),
        (Some("state"), None) => Ok(Line::State),
        (Some("quit"), None) => Ok(Line::Quit),
        (Some("select"), Some(index)) => index
            .parse()
            .map(Line::Select)
            .with_context(|| format!("Invalid item index: {}", index)),
        _ => anyhow::bail!("Unknown control line: {}", line),
    }
}

#[instrument(skip_all, fields(format = ?args.format))]
pub async fn run_watch(args: WatchArgs, mut config: SuggestConfig) -> Result<()> {
    if let Some(symbols) = args.symbols {
        config.search.symbols_file = Some(symbols);
    }
    if let Some(debounce_ms) = args.debounce_ms {
        config.coordinator.debounce_ms = debounce_ms;
    }

    let provider = provider_from_config(&config.search)?;
    let handle = Coordinator::spawn(provider, &config.coordinator);
    let subscription = handle.subscribe().await?;
    let printer = tokio::spawn(print_events(subscription, args.format));

    info!(
        debounce_ms = config.coordinator.debounce_ms,
        "watching stdin; one line per input change"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut quit = false;
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => {
                quit = true;
                None
            }
        };
        let Some(line) = line else { break };

        match parse_line(&line) {
            Ok(Line::Input(text)) => handle.input(text)?,
            Ok(Line::Dismiss) => handle.dismiss()?,
            Ok(Line::Select(index)) => {
                if handle.select(index).await?.is_none() {
                    eprintln!("nothing to select at {}", index);
                }
            }
            Ok(Line::State) => print_state(&handle, args.format)?,
            Ok(Line::Quit) => {
                quit = true;
                break;
            }
            Err(e) => eprintln!("{:#}", e),
        }
    }

    if !quit {
        wait_settled(&handle, config.coordinator.debounce()).await;
    }

    handle.shutdown().await;
    printer.await.context("Event printer panicked")??;
    Ok(())
}

fn print_state(handle: &CoordinatorHandle, format: OutputFormat) -> Result<()> {
    let state = handle.state();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&state)?),
        OutputFormat::Text => print!("{}", format_state(&state)),
    }
    Ok(())
}

/// Let a pending debounce fire and the current lookup resolve
async fn wait_settled(handle: &CoordinatorHandle, debounce: Duration) {
    tokio::time::sleep(debounce + Duration::from_millis(20)).await;

    let mut state = handle.watch();
    while state.borrow_and_update().is_loading {
        if state.changed().await.is_err() {
            break;
        }
    }
    debug!("coordinator settled");
}

async fn print_events(mut subscription: Subscription, format: OutputFormat) -> Result<()> {
    let mut stdout = std::io::stdout();
    while let Some(event) = subscription.recv().await {
        if let Some(rendered) = render_event(&event, format)? {
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
