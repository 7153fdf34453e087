//! Room participant entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A participant bound to exactly one room.
///
/// The id is the connection identifier, so it stays stable for as long as
/// the connection lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Connection identifier.
    pub id: String,
    /// Display name.
    pub username: String,
    /// The room this user belongs to.
    pub room_id: String,
    /// Mirrors `Room::host_id == id`.
    #[serde(default)]
    pub is_host: bool,
    /// Ready flag toggled by the user.
    #[serde(default)]
    pub ready: bool,
    /// Opaque resume credential. Carried but not validated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconnect_token: Option<String>,
    /// Join time, used for host reassignment ordering.
    pub joined_at: DateTime<Utc>,
}

impl User {
    /// Create a non-host, not-ready member of `room_id`.
    pub fn new(
        id: impl Into<String>,
        username: impl Into<String>,
        room_id: impl Into<String>,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            room_id: room_id.into(),
            is_host: false,
            ready: false,
            reconnect_token: None,
            joined_at,
        }
    }
}
