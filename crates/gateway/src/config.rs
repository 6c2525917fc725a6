//! Store connection settings
//!
//! Resolved in layers: built-in defaults, then an optional TOML file, then
//! `NETMAP_STORE_*` environment variables. The CLI applies its own flags on
//! top of the result.

use netmap_core::{NetmapError, NetmapResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Minimum request timeout in seconds
pub const MIN_TIMEOUT_SECS: u64 = 1;

/// Maximum request timeout in seconds
pub const MAX_TIMEOUT_SECS: u64 = 300;

pub const ENV_URL: &str = "NETMAP_STORE_URL";
pub const ENV_KEY: &str = "NETMAP_STORE_KEY";
pub const ENV_SCHEMA: &str = "NETMAP_STORE_SCHEMA";
pub const ENV_TIMEOUT: &str = "NETMAP_STORE_TIMEOUT";

/// Connection settings for the hosted store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,

    /// Anonymous/public API key sent as `apikey` and bearer token
    pub api_key: String,

    /// Optional non-default schema (sent as Accept-Profile/Content-Profile)
    pub schema: Option<String>,

    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            schema: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl StoreConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Defaults, overlaid with `path` (if given) and then the environment
    pub fn load(path: Option<&Path>) -> NetmapResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> NetmapResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| NetmapError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&text)
            .map_err(|e| NetmapError::InvalidConfig(format!("{}: {}", path.display(), e)))
    }

    /// Overlay `NETMAP_STORE_*` variables that are set and non-empty
    pub fn apply_env(&mut self) {
        if let Some(url) = env_var(ENV_URL) {
            self.url = url;
        }
        if let Some(key) = env_var(ENV_KEY) {
            self.api_key = key;
        }
        if let Some(schema) = env_var(ENV_SCHEMA) {
            self.schema = Some(schema);
        }
        if let Some(timeout) = env_var(ENV_TIMEOUT).and_then(|v| v.parse::<u64>().ok()) {
            self.timeout_secs = timeout;
        }
    }

    /// Check the settings are usable for the REST store
    pub fn validate(&self) -> NetmapResult<()> {
        if self.url.trim().is_empty() {
            return Err(NetmapError::MissingConfig(format!(
                "store url (set {} or --store-url)",
                ENV_URL
            )));
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(NetmapError::InvalidConfig(format!(
                "store url must start with http:// or https://, got '{}'",
                self.url
            )));
        }
        if self.api_key.trim().is_empty() {
            return Err(NetmapError::MissingConfig(format!(
                "store api key (set {} or --store-key)",
                ENV_KEY
            )));
        }
        Ok(())
    }

    /// Request timeout, clamped to a sane range
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS))
    }

    /// `{url}/rest/v1`, without a trailing slash
    pub fn rest_base(&self) -> String {
        format!("{}/rest/v1", self.url.trim_end_matches('/'))
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ============================================================================
// Tests
// ============================================================================
