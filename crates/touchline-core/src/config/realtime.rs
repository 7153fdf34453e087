//! Real-time WebSocket engine configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Outbound queue capacity per connection. A full queue evicts the connection.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Maximum accepted inbound frame size in bytes.
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
    /// Reply with an `error` frame instead of dropping rejected requests.
    #[serde(default)]
    pub error_replies: bool,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer(),
            max_message_size: default_max_message_size(),
            error_replies: false,
        }
    }
}

fn default_channel_buffer() -> usize {
    256
}

fn default_max_message_size() -> usize {
    65_536
}
