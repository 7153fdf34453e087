//! Application configuration schemas.
//!
//! Every section deserializes from TOML via the `config` crate and falls
//! back to defaults, so the server starts without any file on disk.

pub mod app;
pub mod auction;
pub mod catalog;
pub mod logging;
pub mod realtime;
pub mod room;
pub mod store;

use serde::{Deserialize, Serialize};

use self::app::ServerConfig;
use self::auction::AuctionConfig;
use self::catalog::CatalogConfig;
use self::logging::LoggingConfig;
use self::realtime::RealtimeConfig;
use self::room::RoomConfig;
use self::store::StoreConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// State store and relay settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Real-time WebSocket settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Room lifecycle settings.
    #[serde(default)]
    pub room: RoomConfig,
    /// Auction timing.
    #[serde(default)]
    pub auction: AuctionConfig,
    /// Player catalog source.
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default`, an environment-specific overlay and
    /// environment variables prefixed with `TOUCHLINE_` (nested keys use `__`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("TOUCHLINE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
