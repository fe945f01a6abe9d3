//! The external search capability consumed by the coordinator

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LookupError;

/// One suggestion returned by the search capability.
///
/// The coordinator treats items as opaque and preserves the order in which
/// the provider returned them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchItem {
    /// Stable identifier (ticker symbol for the market dashboard)
    #[serde(alias = "symbol")]
    pub id: String,
    /// Human-readable label shown in the suggestion list
    #[serde(alias = "name", alias = "description")]
    pub label: String,
    /// Extra figures shown next to the label (price, change, exchange...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metrics: BTreeMap<String, serde_json::Value>,
}

impl SearchItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            metrics: BTreeMap::new(),
        }
    }

    /// Attach an auxiliary metric
    pub fn with_metric(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metrics.insert(key.into(), value.into());
        self
    }
}

/// Async lookup capability (remote endpoint, local index, test double).
///
/// Implementations must be safe to call concurrently and repeatedly; the
/// coordinator deduplicates through sequencing, not the provider.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchItem>, LookupError>;
}

#[async_trait]
impl<P: SearchProvider + ?Sized> SearchProvider for Arc<P> {
    async fn search(&self, query: &str) -> Result<Vec<SearchItem>, LookupError> {
        (**self).search(query).await
    }
}

#[async_trait]
impl<P: SearchProvider + ?Sized> SearchProvider for Box<P> {
    async fn search(&self, query: &str) -> Result<Vec<SearchItem>, LookupError> {
        (**self).search(query).await
    }
}

/// Run a lookup with an optional hard deadline; expiry is a lookup failure
pub async fn search_with_deadline(
    provider: &dyn SearchProvider,
    query: &str,
    deadline: Option<Duration>,
) -> Result<Vec<SearchItem>, LookupError> {
    match deadline {
        None => provider.search(query).await,
        Some(limit) => match tokio::time::timeout(limit, provider.search(query)).await {
            Ok(result) => result,
            Err(_) => Err(LookupError::Timeout {
                millis: limit.as_millis() as u64,
            }),
        },
    }
}
