//! Player catalog configuration.

use serde::{Deserialize, Serialize};

/// Where the player catalog is loaded from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path to a JSON array of players.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

fn default_path() -> String {
    "data/players.json".to_string()
}
