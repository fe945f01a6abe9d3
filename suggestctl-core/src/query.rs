//! Query normalization

use std::fmt;

use serde::{Deserialize, Serialize};

/// A trimmed search query.
///
/// Constructed from raw input buffer contents; leading and trailing
/// whitespace never reaches the search capability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query(String);

impl Query {
    /// Normalize raw input into a query
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in characters (not bytes)
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    /// Whether this query is long enough to be sent to the search capability
    pub fn is_searchable(&self, min_len: usize) -> bool {
        !self.is_empty() && self.char_len() >= min_len
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Query {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Query {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}
