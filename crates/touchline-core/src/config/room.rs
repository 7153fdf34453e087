//! Room lifecycle configuration.

use serde::{Deserialize, Serialize};

/// Room defaults and expiry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Capacity applied when a room's own `max_users` is unset.
    #[serde(default = "default_max_users")]
    pub default_max_users: usize,
    /// Rooms idle for longer than this are destroyed by the reaper.
    #[serde(default = "default_inactivity_timeout")]
    pub inactivity_timeout_minutes: i64,
    /// Interval between expiry sweeps.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// Oldest chat messages are dropped beyond this length.
    #[serde(default = "default_max_chat_history")]
    pub max_chat_history: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            default_max_users: default_max_users(),
            inactivity_timeout_minutes: default_inactivity_timeout(),
            sweep_interval_seconds: default_sweep_interval(),
            max_chat_history: default_max_chat_history(),
        }
    }
}

fn default_max_users() -> usize {
    4
}

fn default_inactivity_timeout() -> i64 {
    30
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_max_chat_history() -> usize {
    200
}
