//! Room entity model.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{RoomSettings, RoomSnapshot, RoomStatus};
use crate::chat::ChatMessage;
use crate::user::User;

/// A bounded group session with one host.
///
/// `host_id` always names a key of `members` except while the room is being
/// destroyed. Member records here are copies of the authoritative user
/// records and are rewritten together with them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// Externally chosen room id.
    pub id: String,
    /// Connection id of the current host.
    pub host_id: String,
    /// Members keyed by connection id.
    pub members: HashMap<String, User>,
    /// Host-controlled settings.
    #[serde(default)]
    pub settings: RoomSettings,
    /// Lifecycle phase.
    #[serde(default)]
    pub status: RoomStatus,
    /// Chat log, oldest first.
    #[serde(default)]
    pub chat: Vec<ChatMessage>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time, drives expiry.
    pub last_activity: DateTime<Utc>,
}

impl Room {
    /// Create a room with `host` as its sole member.
    pub fn new(id: impl Into<String>, mut host: User, settings: RoomSettings, now: DateTime<Utc>) -> Self {
        let id = id.into();
        host.room_id = id.clone();
        host.is_host = true;
        let host_id = host.id.clone();
        let mut members = HashMap::new();
        members.insert(host_id.clone(), host);
        Self {
            id,
            host_id,
            members,
            settings,
            status: RoomStatus::Waiting,
            chat: Vec::new(),
            created_at: now,
            last_activity: now,
        }
    }

    /// Whether `user_id` is a member.
    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.contains_key(user_id)
    }

    /// Whether `user_id` is the host.
    pub fn is_host(&self, user_id: &str) -> bool {
        self.host_id == user_id
    }

    /// Whether no further member fits.
    pub fn is_full(&self, default_max_users: usize) -> bool {
        self.members.len() >= self.settings.capacity(default_max_users)
    }

    /// Whether the room shows up in public listings.
    pub fn is_listed(&self, default_max_users: usize) -> bool {
        !self.settings.private && !self.is_full(default_max_users)
    }

    /// Whether the room has been idle for longer than `timeout`.
    pub fn is_expired(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        now - self.last_activity > timeout
    }

    /// Insert a member bound to this room.
    pub fn add_member(&mut self, mut user: User) {
        user.room_id = self.id.clone();
        user.is_host = user.id == self.host_id;
        self.members.insert(user.id.clone(), user);
    }

    /// Remove a member. If it was the host, the host role moves to the
    /// earliest-joined remaining member.
    pub fn remove_member(&mut self, user_id: &str) -> Option<User> {
        let removed = self.members.remove(user_id)?;
        if self.host_id == user_id {
            if let Some(next) = self.next_host() {
                self.set_host(&next);
            }
        }
        Some(removed)
    }

    /// Earliest-joined member, ties broken by smallest id.
    pub fn next_host(&self) -> Option<String> {
        self.members
            .values()
            .min_by(|a, b| a.joined_at.cmp(&b.joined_at).then_with(|| a.id.cmp(&b.id)))
            .map(|u| u.id.clone())
    }

    /// Make `user_id` the host and refresh every member's host flag.
    /// Returns `false` when `user_id` is not a member.
    pub fn set_host(&mut self, user_id: &str) -> bool {
        if !self.members.contains_key(user_id) {
            return false;
        }
        self.host_id = user_id.to_string();
        for member in self.members.values_mut() {
            member.is_host = member.id == user_id;
        }
        true
    }

    /// Append a chat message, dropping the oldest beyond `cap`.
    pub fn push_chat(&mut self, message: ChatMessage, cap: usize) {
        self.chat.push(message);
        if cap > 0 && self.chat.len() > cap {
            let overflow = self.chat.len() - cap;
            self.chat.drain(..overflow);
        }
    }

    /// Record activity at `now`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }

    /// Client-facing view without secrets.
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot::from(self)
    }
}
