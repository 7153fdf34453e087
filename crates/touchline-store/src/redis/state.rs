//! Redis-backed state store.

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::{debug, warn};

use touchline_core::AppResult;
use touchline_entity::{Room, User};

use super::client::RedisClient;
use super::map_err;
use crate::keys;
use crate::traits::StateStore;

/// Rooms and users stored as JSON strings.
///
/// Writes are plain load-modify-store; concurrent writers in different
/// processes can overwrite each other.
#[derive(Debug, Clone)]
pub struct RedisStateStore {
    client: RedisClient,
}

impl RedisStateStore {
    /// Create a store on an established client.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let raw: Option<String> = conn.get(&full_key).await.map_err(map_err)?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn set_json<T: serde::Serialize + Sync>(&self, key: &str, value: &T) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let payload = serde_json::to_string(value)?;
        let mut conn = self.client.conn_mut();
        let _: () = conn.set(&full_key, payload).await.map_err(map_err)?;
        Ok(())
    }

    async fn delete_key(&self, key: &str) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let _: () = conn.del(&full_key).await.map_err(map_err)?;
        Ok(())
    }
}

#[async_trait]
impl StateStore for RedisStateStore {
    async fn get_room(&self, room_id: &str) -> AppResult<Option<Room>> {
        self.get_json(&keys::room(room_id)).await
    }

    async fn save_room(&self, room: &Room) -> AppResult<()> {
        self.set_json(&keys::room(&room.id), room).await
    }

    async fn delete_room(&self, room_id: &str) -> AppResult<()> {
        self.delete_key(&keys::room(room_id)).await
    }

    async fn list_rooms(&self) -> AppResult<Vec<Room>> {
        let pattern = self.client.prefixed_key(&keys::room_pattern());
        let mut conn = self.client.conn_mut();
        let found: Vec<String> = conn.keys(&pattern).await.map_err(map_err)?;
        debug!(count = found.len(), "Listing rooms from Redis");

        let mut rooms = Vec::with_capacity(found.len());
        for full_key in found {
            let raw: Option<String> = conn.get(&full_key).await.map_err(map_err)?;
            let Some(raw) = raw else { continue };
            match serde_json::from_str::<Room>(&raw) {
                Ok(room) => rooms.push(room),
                Err(e) => warn!(key = %full_key, error = %e, "Skipping undecodable room record"),
            }
        }
        Ok(rooms)
    }

    async fn get_user(&self, user_id: &str) -> AppResult<Option<User>> {
        self.get_json(&keys::user(user_id)).await
    }

    async fn save_user(&self, user: &User) -> AppResult<()> {
        self.set_json(&keys::user(&user.id), user).await
    }

    async fn delete_user(&self, user_id: &str) -> AppResult<()> {
        self.delete_key(&keys::user(user_id)).await
    }
}
