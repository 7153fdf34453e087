//! Room chat entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single chat line posted in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Author's connection id.
    pub user_id: String,
    /// Author's display name at the time of posting.
    pub username: String,
    /// Message body.
    pub message: String,
    /// Server-side receive time.
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a chat message stamped with `timestamp`.
    pub fn new(
        user_id: impl Into<String>,
        username: impl Into<String>,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            message: message.into(),
            timestamp,
        }
    }
}
