//! suggestctl-search - concrete search providers and the one-shot lookup
//!
//! This crate provides:
//! - `HttpSearchProvider` for a remote JSON search endpoint
//! - `SymbolListProvider` for an offline symbol list
//! - CLI argument handling for the `suggestctl lookup` subcommand
//!
//! ```text
//! LookupArgs + SuggestConfig → provider_from_config → SearchProvider::search → Output
//! ```

pub mod http;
pub mod symbols;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use suggestctl_core::{search_with_deadline, Query, SearchConfig, SearchItem, SearchProvider, SuggestConfig};
use tracing::instrument;

pub use http::{parse_items, HttpSearchProvider};
pub use symbols::SymbolListProvider;

/// Lookup subcommand arguments
#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Query to look up
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Output format (text, json)
    #[arg(long, short = 'f', default_value = "text")]
    pub format: OutputFormat,

    /// Maximum results to return (overrides search.max_results)
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Search a local JSON symbol list instead of the endpoint
    #[arg(long, value_name = "FILE")]
    pub symbols: Option<PathBuf>,

    /// Search endpoint URL (overrides search.endpoint)
    #[arg(long)]
    pub endpoint: Option<String>,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// JSON for machine consumption
    Json,
}

/// Build the provider the `[search]` section points at.
///
/// A symbols file takes precedence over the endpoint.
pub fn provider_from_config(config: &SearchConfig) -> Result<Arc<dyn SearchProvider>> {
    if let Some(path) = &config.symbols_file {
        let provider = SymbolListProvider::from_file(path, config.max_results)?;
        tracing::info!(symbols = provider.len(), "using local symbol list");
        return Ok(Arc::new(provider));
    }

    let provider = HttpSearchProvider::from_config(config)?;
    tracing::info!(endpoint = %provider.endpoint(), "using HTTP search endpoint");
    Ok(Arc::new(provider))
}

/// Execute the lookup command
#[instrument(skip_all, fields(query = %args.query, format = ?args.format))]
pub async fn run_lookup(args: LookupArgs, config: &SuggestConfig) -> Result<()> {
    let query = Query::new(&args.query);
    if query.is_empty() {
        anyhow::bail!("No query provided.");
    }

    let mut search = config.search.clone();
    if let Some(limit) = args.limit {
        search.max_results = limit;
    }
    if let Some(endpoint) = args.endpoint {
        search.endpoint = Some(endpoint);
        search.symbols_file = None;
    }
    if let Some(symbols) = args.symbols {
        search.symbols_file = Some(symbols);
    }

    let provider = provider_from_config(&search)?;
    let items = search_with_deadline(
        provider.as_ref(),
        query.as_str(),
        config.coordinator.lookup_timeout(),
    )
    .await
    .with_context(|| format!("Lookup failed for '{}'", query))?;

    print_items(&items, args.format)
}

fn print_items(items: &[SearchItem], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(items)?),
        OutputFormat::Text => print!("{}", format_items(items)),
    }
    Ok(())
}

/// Render items as aligned `id  label` lines
pub fn format_items(items: &[SearchItem]) -> String {
    if items.is_empty() {
        return "No results.\n".to_string();
    }

    let width = items.iter().map(|i| i.id.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for item in items {
        out.push_str(&format!("{:<width$}  {}\n", item.id, item.label, width = width));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_items_aligns_ids() {
        let items = vec![
            SearchItem::new("T", "AT&T Inc."),
            SearchItem::new("TSLA", "Tesla, Inc."),
        ];
        assert_eq!(format_items(&items), "T     AT&T Inc.\nTSLA  Tesla, Inc.\n");
    }

    #[test]
    fn test_format_items_empty() {
        assert_eq!(format_items(&[]), "No results.\n");
    }

    #[test]
    fn test_provider_requires_endpoint_or_symbols() {
        let err = provider_from_config(&SearchConfig::default()).err().unwrap();
        assert!(err.to_string().contains("search.endpoint"));
    }
}
