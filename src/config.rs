//! Client configuration.
//!
//! Loaded from YAML or from the environment:
//!
//! ```yaml
//! default_metadata:
//!   client: "rdk-rust"
//! cache_proxies: true
//! watch_resource_events: true
//! ```
//!
//! Environment variables (all optional):
//! - `RDK_CLIENT_METADATA`: default metadata as `key=value,key2=value2`
//! - `RDK_CLIENT_CACHE_PROXIES`: `true` / `false`
//! - `RDK_CLIENT_WATCH_EVENTS`: `true` / `false`

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::resource::Metadata;

pub const ENV_METADATA: &str = "RDK_CLIENT_METADATA";
pub const ENV_CACHE_PROXIES: &str = "RDK_CLIENT_CACHE_PROXIES";
pub const ENV_WATCH_EVENTS: &str = "RDK_CLIENT_WATCH_EVENTS";

fn default_true() -> bool {
    true
}

/// Settings applied by the resolver to every proxy it builds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Metadata attached to every call; callers override it key by key.
    #[serde(default)]
    pub default_metadata: Metadata,

    /// Reuse proxies across resolutions of the same name and type.
    #[serde(default = "default_true")]
    pub cache_proxies: bool,

    /// Follow the peer's resource events to invalidate removed proxies.
    #[serde(default = "default_true")]
    pub watch_resource_events: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_metadata: Metadata::new(),
            cache_proxies: true,
            watch_resource_events: true,
        }
    }
}

impl ClientConfig {
    /// Parse a YAML document; absent keys take their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Defaults overridden by whatever the environment sets.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_METADATA) {
            config.default_metadata = parse_metadata(&raw)?;
        }
        if let Some(raw) = lookup(ENV_CACHE_PROXIES) {
            config.cache_proxies = parse_bool(ENV_CACHE_PROXIES, &raw)?;
        }
        if let Some(raw) = lookup(ENV_WATCH_EVENTS) {
            config.watch_resource_events = parse_bool(ENV_WATCH_EVENTS, &raw)?;
        }
        Ok(config)
    }
}

fn parse_metadata(raw: &str) -> Result<Metadata, ConfigError> {
    let mut metadata = Metadata::new();
    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').ok_or_else(|| ConfigError::InvalidValue {
            key: ENV_METADATA.to_string(),
            value: pair.to_string(),
        })?;
        metadata.insert(key.trim(), value.trim());
    }
    Ok(metadata)
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}
