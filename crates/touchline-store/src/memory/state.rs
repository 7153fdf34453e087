//! In-memory state store using `DashMap`.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use touchline_core::AppResult;
use touchline_entity::{Room, User};

use crate::traits::StateStore;

/// Rooms and users held in sharded concurrent maps.
///
/// Entries never expire on their own; the room reaper removes idle rooms.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    rooms: Arc<DashMap<String, Room>>,
    users: Arc<DashMap<String, User>>,
}

impl MemoryStateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get_room(&self, room_id: &str) -> AppResult<Option<Room>> {
        Ok(self.rooms.get(room_id).map(|r| r.value().clone()))
    }

    async fn save_room(&self, room: &Room) -> AppResult<()> {
        self.rooms.insert(room.id.clone(), room.clone());
        Ok(())
    }

    async fn delete_room(&self, room_id: &str) -> AppResult<()> {
        if self.rooms.remove(room_id).is_some() {
            debug!(room_id = %room_id, "Room removed from memory store");
        }
        Ok(())
    }

    async fn list_rooms(&self) -> AppResult<Vec<Room>> {
        Ok(self.rooms.iter().map(|r| r.value().clone()).collect())
    }

    async fn get_user(&self, user_id: &str) -> AppResult<Option<User>> {
        Ok(self.users.get(user_id).map(|u| u.value().clone()))
    }

    async fn save_user(&self, user: &User) -> AppResult<()> {
        self.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> AppResult<()> {
        self.users.remove(user_id);
        Ok(())
    }
}
