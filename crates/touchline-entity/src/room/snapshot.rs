//! Client-facing projections of a room.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Room, RoomStatus};

/// Full room view broadcast in `roomStateUpdate`.
///
/// Never carries the password or reconnect tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub id: String,
    pub host_id: String,
    /// Members ordered by join time.
    pub members: Vec<MemberView>,
    pub settings: SettingsView,
    pub status: RoomStatus,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

/// A member as seen by other clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub id: String,
    pub username: String,
    pub is_host: bool,
    pub ready: bool,
    pub joined_at: DateTime<Utc>,
}

/// Room settings with the password replaced by a flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub has_password: bool,
    pub private: bool,
    pub max_users: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<u64>,
    #[serde(skip_serializing_if = "Map::is_empty", default)]
    pub custom: Map<String, Value>,
}

/// Short entry used by room listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: String,
    pub host_id: String,
    pub members: usize,
    pub max_users: usize,
    pub status: RoomStatus,
}

impl RoomSummary {
    /// Summarize `room` with the effective capacity.
    pub fn new(room: &Room, default_max_users: usize) -> Self {
        Self {
            id: room.id.clone(),
            host_id: room.host_id.clone(),
            members: room.members.len(),
            max_users: room.settings.capacity(default_max_users),
            status: room.status,
        }
    }
}

impl From<&Room> for RoomSnapshot {
    fn from(room: &Room) -> Self {
        let mut members: Vec<MemberView> = room
            .members
            .values()
            .map(|u| MemberView {
                id: u.id.clone(),
                username: u.username.clone(),
                is_host: u.id == room.host_id,
                ready: u.ready,
                joined_at: u.joined_at,
            })
            .collect();
        members.sort_by(|a, b| a.joined_at.cmp(&b.joined_at).then_with(|| a.id.cmp(&b.id)));

        let settings = &room.settings;
        Self {
            id: room.id.clone(),
            host_id: room.host_id.clone(),
            members,
            settings: SettingsView {
                has_password: settings.password.as_deref().is_some_and(|p| !p.is_empty()),
                private: settings.private,
                max_users: settings.max_users,
                game_mode: settings.game_mode.clone(),
                timer: settings.timer,
                custom: settings.custom.clone(),
            },
            status: room.status,
            created_at: room.created_at,
            last_activity: room.last_activity,
        }
    }
}
