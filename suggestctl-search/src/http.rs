//! HTTP search endpoint client
//!
//! `GET {endpoint}?{query_param}={query}&limit={max_results}` with an
//! optional bearer token. The endpoint may answer with a bare JSON array of
//! items or with an envelope (`results`, `items` or `data`).

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use suggestctl_core::{LookupError, SearchConfig, SearchItem, SearchProvider};
use tracing::instrument;
use url::Url;

/// Error bodies longer than this are cut before they reach logs or events
const MAX_ERROR_BODY: usize = 500;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ResponseBody {
    Bare(Vec<SearchItem>),
    Envelope(Envelope),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(alias = "items", alias = "data")]
    results: Vec<SearchItem>,
}

/// Search provider backed by a remote HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpSearchProvider {
    client: Client,
    endpoint: Url,
    query_param: String,
    max_results: usize,
    api_token: Option<String>,
}

impl HttpSearchProvider {
    /// Create a provider for `endpoint` with default request options
    pub fn new(endpoint: &str) -> Result<Self> {
        let config = SearchConfig {
            endpoint: Some(endpoint.to_string()),
            ..Default::default()
        };
        Self::from_config(&config)
    }

    /// Create a provider from the `[search]` config section
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .as_deref()
            .context("search.endpoint is not set (config file or SUGGESTCTL_ENDPOINT)")?;
        let endpoint =
            Url::parse(endpoint).with_context(|| format!("Invalid search endpoint: {}", endpoint))?;

        let client = Client::builder()
            .user_agent(concat!("suggestctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint,
            query_param: config.query_param.clone(),
            max_results: config.max_results,
            api_token: config.api_token.clone(),
        })
    }

    /// Create a provider from SUGGESTCTL_ENDPOINT and SUGGESTCTL_API_TOKEN
    pub fn from_env() -> Result<Self> {
        let endpoint = std::env::var("SUGGESTCTL_ENDPOINT").context("SUGGESTCTL_ENDPOINT not set")?;
        let config = SearchConfig {
            endpoint: Some(endpoint),
            api_token: std::env::var("SUGGESTCTL_API_TOKEN").ok(),
            ..Default::default()
        };
        Self::from_config(&config)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl SearchProvider for HttpSearchProvider {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn search(&self, query: &str) -> Result<Vec<SearchItem>, LookupError> {
        let limit = self.max_results.to_string();
        let mut request = self
            .client
            .get(self.endpoint.clone())
            .query(&[(self.query_param.as_str(), query), ("limit", limit.as_str())])
            .header("Accept", "application/json");
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LookupError::transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LookupError::transport(e.to_string()))?;

        if !status.is_success() {
            return Err(LookupError::Status {
                status: status.as_u16(),
                body: truncate(body),
            });
        }

        let mut items = parse_items(&body)?;
        items.truncate(self.max_results);
        tracing::debug!(count = items.len(), "search endpoint answered");
        Ok(items)
    }
}

/// Decode a response body into items, keeping the endpoint's order
pub fn parse_items(body: &str) -> Result<Vec<SearchItem>, LookupError> {
    match serde_json::from_str::<ResponseBody>(body) {
        Ok(ResponseBody::Bare(items)) => Ok(items),
        Ok(ResponseBody::Envelope(envelope)) => Ok(envelope.results),
        Err(e) => Err(LookupError::decode(e.to_string())),
    }
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push_str("...");
    }
    body
}
