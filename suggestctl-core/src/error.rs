//! Structured error types for suggestctl-core.
//!
//! The coordinator never lets a lookup failure escape to the host: a
//! `LookupError` is turned into a closed, empty suggestion list and a
//! `LookupFailed` event. `ResolveError` is internal bookkeeping for stale
//! tickets and is swallowed at the coordinator boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of the external search capability. Every variant is a network
/// failure from the coordinator's point of view.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Request could not be sent or the connection dropped
    #[error("transport error: {reason}")]
    Transport { reason: String },

    /// Endpoint answered with a non-success status
    #[error("search endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body could not be decoded into search items
    #[error("failed to decode search response: {reason}")]
    Decode { reason: String },

    /// Lookup exceeded the configured deadline
    #[error("lookup timed out after {millis}ms")]
    Timeout { millis: u64 },

    /// Provider is not able to serve lookups at all
    #[error("search provider unavailable: {reason}")]
    Unavailable { reason: String },
}

impl LookupError {
    /// Create a transport error
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Create a decode error
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    /// Create an unavailable error
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

/// A lookup resolved for a ticket that is no longer current.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveError {
    #[error("stale response for ticket #{seq} (latest issued is #{latest})")]
    Stale { seq: u64, latest: u64 },
}

/// Errors surfaced by a `CoordinatorHandle`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    /// The coordinator task has shut down (widget unmounted)
    #[error("coordinator is closed")]
    Closed,
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid TOML in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

impl ConfigError {
    /// Create an invalid value error
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
