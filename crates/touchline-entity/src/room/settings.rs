//! Room settings value object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Host-controlled room configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSettings {
    /// Join password, checked only for private rooms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Private rooms are hidden from listings and require the password.
    #[serde(default)]
    pub private: bool,
    /// Capacity. Zero means "use the server default".
    #[serde(default)]
    pub max_users: usize,
    /// Free-form game mode label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_mode: Option<String>,
    /// Round timer in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer: Option<u64>,
    /// Any further options the client wants to keep with the room.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub custom: Map<String, Value>,
}

impl RoomSettings {
    /// Effective capacity given the server default.
    pub fn capacity(&self, default_max_users: usize) -> usize {
        if self.max_users == 0 {
            default_max_users
        } else {
            self.max_users
        }
    }

    /// Whether `candidate` unlocks the room. Public rooms accept anything.
    pub fn accepts_password(&self, candidate: Option<&str>) -> bool {
        if !self.private {
            return true;
        }
        self.password.as_deref().unwrap_or_default() == candidate.unwrap_or_default()
    }
}
