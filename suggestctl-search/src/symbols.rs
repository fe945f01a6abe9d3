//! Offline provider over a local symbol list

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use suggestctl_core::{LookupError, SearchItem, SearchProvider};

use crate::http::parse_items;

/// Matches queries against an in-memory list of items.
///
/// Items whose id starts with the query rank first, then items whose label
/// contains it. Matching ignores case and keeps file order within each group.
#[derive(Debug, Clone)]
pub struct SymbolListProvider {
    items: Vec<SearchItem>,
    max_results: usize,
}

impl SymbolListProvider {
    pub fn new(items: Vec<SearchItem>, max_results: usize) -> Self {
        Self { items, max_results }
    }

    /// Load a JSON file holding an array of items (or a `results` envelope)
    pub fn from_file(path: &Path, max_results: usize) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read symbols file: {}", path.display()))?;
        let items = parse_items(&content)
            .with_context(|| format!("Failed to parse symbols file: {}", path.display()))?;
        tracing::debug!(count = items.len(), "loaded symbol list from {}", path.display());
        Ok(Self::new(items, max_results))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn matches(&self, query: &str) -> Vec<SearchItem> {
        let needle = query.to_lowercase();
        let by_id = self
            .items
            .iter()
            .filter(|item| item.id.to_lowercase().starts_with(&needle));
        let by_label = self.items.iter().filter(|item| {
            !item.id.to_lowercase().starts_with(&needle)
                && item.label.to_lowercase().contains(&needle)
        });

        by_id
            .chain(by_label)
            .take(self.max_results)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SearchProvider for SymbolListProvider {
    async fn search(&self, query: &str) -> Result<Vec<SearchItem>, LookupError> {
        Ok(self.matches(query))
    }
}
