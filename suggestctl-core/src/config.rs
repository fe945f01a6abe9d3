use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::debounce::DEFAULT_DEBOUNCE_MS;
use crate::error::{ConfigError, Result};

/// Default minimum number of characters before a lookup is issued
pub const DEFAULT_MIN_QUERY_LENGTH: usize = 1;

/// Coordinator tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Quiet period before a query is dispatched
    pub debounce_ms: u64,
    /// Shorter queries close the list instead of searching
    pub min_query_length: usize,
    /// Hard deadline per lookup; expiry counts as a network failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup_timeout_ms: Option<u64>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            min_query_length: DEFAULT_MIN_QUERY_LENGTH,
            lookup_timeout_ms: None,
        }
    }
}

impl CoordinatorConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn lookup_timeout(&self) -> Option<Duration> {
        self.lookup_timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_query_length == 0 {
            return Err(ConfigError::invalid(
                "coordinator.min_query_length",
                "must be at least 1",
            ));
        }
        if self.lookup_timeout_ms == Some(0) {
            return Err(ConfigError::invalid(
                "coordinator.lookup_timeout_ms",
                "must be greater than 0 when set",
            ));
        }
        Ok(())
    }
}

/// Where lookups are sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// HTTP search endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Name of the query string parameter carrying the query
    pub query_param: String,
    /// Upper bound on items requested per lookup
    pub max_results: usize,
    /// Bearer token sent with every request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Local JSON symbol list, used instead of the endpoint when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbols_file: Option<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            query_param: "q".to_string(),
            max_results: 10,
            api_token: None,
            symbols_file: None,
        }
    }
}

/// Contents of ~/.suggestctl/config.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestConfig {
    #[serde(default)]
    pub coordinator: CoordinatorConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

impl SuggestConfig {
    /// Load config from `path`, or the default location when `None`.
    ///
    /// A missing file yields defaults. Environment overrides are applied on
    /// top and the result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path(),
        };

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env_overrides()?;
        config.coordinator.validate()?;
        Ok(config)
    }

    /// Parse a config file without env overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(symbols) = config.search.symbols_file.take() {
            config.search.symbols_file = Some(expand_home(&symbols));
        }

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Config file path: $SUGGESTCTL_CONFIG or ~/.suggestctl/config.toml
    pub fn config_path() -> PathBuf {
        if let Ok(path) = env::var("SUGGESTCTL_CONFIG") {
            return PathBuf::from(path);
        }
        config_dir()
            .unwrap_or_else(|| PathBuf::from(".suggestctl"))
            .join("config.toml")
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(value) = env::var("SUGGESTCTL_DEBOUNCE_MS") {
            self.coordinator.debounce_ms = value.parse().map_err(|_| {
                ConfigError::invalid("SUGGESTCTL_DEBOUNCE_MS", format!("not a number: {value}"))
            })?;
        }
        if let Ok(value) = env::var("SUGGESTCTL_MIN_QUERY_LENGTH") {
            self.coordinator.min_query_length = value.parse().map_err(|_| {
                ConfigError::invalid(
                    "SUGGESTCTL_MIN_QUERY_LENGTH",
                    format!("not a number: {value}"),
                )
            })?;
        }
        if let Ok(endpoint) = env::var("SUGGESTCTL_ENDPOINT") {
            self.search.endpoint = Some(endpoint);
        }
        if let Ok(token) = env::var("SUGGESTCTL_API_TOKEN") {
            self.search.api_token = Some(token);
        }
        Ok(())
    }

    /// Render as TOML (for `config show` and `config init`)
    pub fn to_toml(&self) -> String {
        // Plain structs of strings and numbers always serialize
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

/// The suggestctl config directory (~/.suggestctl)
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".suggestctl"))
}

/// Load environment variables from .env files.
///
/// Current directory first, then ~/.suggestctl/.env. Variables that are
/// already set are never overwritten.
pub fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        debug!("Loaded .env from current directory: {}", path.display());
    }

    if let Some(env_file) = config_dir().map(|dir| dir.join(".env")) {
        if env_file.exists() {
            match dotenvy::from_path(&env_file) {
                Ok(_) => debug!("Loaded .env from {}", env_file.display()),
                Err(e) => debug!("Failed to load {}: {}", env_file.display(), e),
            }
        }
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}
