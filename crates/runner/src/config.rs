//! Configuration loading for the marketplace
//!
//! Supports a JSON configuration file for:
//! - Listen endpoints of the store and both gateways
//! - Session idle timeout and the optional sweep interval
//! - Gateway connection pool sizing
//! - Feature flags
//!
//! Every field has a default, so `{}` is a valid file. Environment variables
//! override whatever the file says.

use std::path::Path;
use std::time::Duration;

use bazaar_gateway::PoolConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value {value:?} for {key}")]
    InvalidOverride { key: &'static str, value: String },
}

/// Root configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketConfig {
    #[serde(default = "default_store_endpoint")]
    pub store: Endpoint,

    #[serde(default = "default_buyer_endpoint")]
    pub buyer_gateway: Endpoint,

    #[serde(default = "default_seller_endpoint")]
    pub seller_gateway: Endpoint,

    #[serde(default)]
    pub session: SessionSettings,

    #[serde(default)]
    pub pool: PoolSettings,

    #[serde(default)]
    pub features: Features,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            store: default_store_endpoint(),
            buyer_gateway: default_buyer_endpoint(),
            seller_gateway: default_seller_endpoint(),
            session: SessionSettings::default(),
            pool: PoolSettings::default(),
            features: Features::default(),
        }
    }
}

impl MarketConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Apply `BAZAAR_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key/value source
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("BAZAAR_HOST") {
            self.store.host = host.clone();
            self.buyer_gateway.host = host.clone();
            self.seller_gateway.host = host;
        }
        if let Some(port) = parsed(&lookup, "BAZAAR_STORE_PORT")? {
            self.store.port = port;
        }
        if let Some(port) = parsed(&lookup, "BAZAAR_BUYER_PORT")? {
            self.buyer_gateway.port = port;
        }
        if let Some(port) = parsed(&lookup, "BAZAAR_SELLER_PORT")? {
            self.seller_gateway.port = port;
        }
        if let Some(secs) = parsed(&lookup, "BAZAAR_SESSION_TIMEOUT_SECS")? {
            self.session.timeout_secs = secs;
        }
        if let Some(enabled) = parsed(&lookup, "BAZAAR_ENABLE_MAKE_PURCHASE")? {
            self.features.enable_make_purchase = enabled;
        }
        Ok(())
    }
}

fn parsed<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidOverride { key, value }),
    }
}

/// Listen address of one service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// `host:port`
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_store_endpoint() -> Endpoint {
    Endpoint::new(default_host(), 5300)
}

fn default_buyer_endpoint() -> Endpoint {
    Endpoint::new(default_host(), 5100)
}

fn default_seller_endpoint() -> Endpoint {
    Endpoint::new(default_host(), 5200)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Idle timeout; the store raises anything under one second to one second
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Run the background sweeper at this period when set
    #[serde(default)]
    pub sweep_interval_secs: Option<u64>,
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            sweep_interval_secs: None,
        }
    }
}

impl SessionSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        self.sweep_interval_secs.map(Duration::from_secs)
    }
}

/// Gateway to store connection pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSettings {
    #[serde(default = "default_pool_size")]
    pub size: usize,
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
}

fn default_pool_size() -> usize {
    4
}

fn default_call_timeout_ms() -> u64 {
    5000
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            size: default_pool_size(),
            call_timeout_ms: default_call_timeout_ms(),
        }
    }
}

impl PoolSettings {
    pub fn to_pool_config(&self) -> PoolConfig {
        PoolConfig {
            size: self.size,
            call_timeout: Duration::from_millis(self.call_timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    #[serde(default)]
    pub enable_make_purchase: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = MarketConfig::from_json("{}").unwrap();
        assert_eq!(config, MarketConfig::default());
        assert_eq!(config.store.addr(), "127.0.0.1:5300");
        assert_eq!(config.buyer_gateway.port, 5100);
        assert_eq!(config.seller_gateway.port, 5200);
        assert_eq!(config.session.timeout_secs, 300);
        assert_eq!(config.pool.to_pool_config(), PoolConfig::default());
        assert!(!config.features.enable_make_purchase);
    }

    #[test]
    fn test_partial_sections() {
        let config = MarketConfig::from_json(
            r#"{
                "store": {"port": 7000},
                "session": {"timeout_secs": 30, "sweep_interval_secs": 5},
                "features": {"enable_make_purchase": true}
            }"#,
        )
        .unwrap();
        assert_eq!(config.store, Endpoint::new("127.0.0.1", 7000));
        assert_eq!(config.session.sweep_interval(), Some(Duration::from_secs(5)));
        assert_eq!(config.pool.size, 4);
        assert!(config.features.enable_make_purchase);
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        assert!(matches!(
            MarketConfig::from_json("{\"store\": 5}"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = MarketConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("BAZAAR_HOST", "0.0.0.0"),
            ("BAZAAR_BUYER_PORT", "6100"),
            ("BAZAAR_SESSION_TIMEOUT_SECS", "12"),
            ("BAZAAR_ENABLE_MAKE_PURCHASE", "true"),
        ]
        .into_iter()
        .collect();

        let mut config = MarketConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.seller_gateway.addr(), "0.0.0.0:5200");
        assert_eq!(config.buyer_gateway.port, 6100);
        assert_eq!(config.session.timeout_secs, 12);
        assert!(config.features.enable_make_purchase);
    }

    #[test]
    fn test_invalid_override_names_key() {
        let mut config = MarketConfig::default();
        let err = config
            .apply_overrides(|key| (key == "BAZAAR_STORE_PORT").then(|| "lots".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidOverride { key: "BAZAAR_STORE_PORT", .. }
        ));
    }
}
