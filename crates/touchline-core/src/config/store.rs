//! State store and relay configuration.

use serde::{Deserialize, Serialize};

/// Which backend holds room and user state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreProvider {
    /// In-process maps. State is lost on restart and not shared between processes.
    Memory,
    /// Remote Redis instance shared by every server process.
    Redis,
}

/// Top-level state store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend selection.
    #[serde(default = "default_provider")]
    pub provider: StoreProvider,
    /// Redis connection settings (used when `provider = "redis"`).
    #[serde(default)]
    pub redis: RedisStoreConfig,
    /// Cross-process relay settings.
    #[serde(default)]
    pub relay: RelayConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            redis: RedisStoreConfig::default(),
            relay: RelayConfig::default(),
        }
    }
}

/// Redis backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisStoreConfig {
    /// Redis connection URL.
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Key prefix for every Touchline key.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_key_prefix(),
        }
    }
}

/// Publish/subscribe relay configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Relay room events to peer processes. Requires the Redis provider.
    #[serde(default)]
    pub enabled: bool,
}

fn default_provider() -> StoreProvider {
    StoreProvider::Memory
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_key_prefix() -> String {
    "touchline:".to_string()
}
