//! Capability traits implemented by the store backends.

use std::fmt::Debug;

use async_trait::async_trait;
use tokio::sync::mpsc;

use touchline_core::AppResult;
use touchline_entity::{Player, Room, User};

/// CRUD access to rooms and users.
///
/// `get_*` returns `Ok(None)` for a missing record. `save_*` upserts by id.
#[async_trait]
pub trait StateStore: Send + Sync + Debug + 'static {
    /// Load a room.
    async fn get_room(&self, room_id: &str) -> AppResult<Option<Room>>;

    /// Insert or replace a room.
    async fn save_room(&self, room: &Room) -> AppResult<()>;

    /// Remove a room. Missing rooms are not an error.
    async fn delete_room(&self, room_id: &str) -> AppResult<()>;

    /// Every stored room, in no particular order.
    async fn list_rooms(&self) -> AppResult<Vec<Room>>;

    /// Load a user.
    async fn get_user(&self, user_id: &str) -> AppResult<Option<User>>;

    /// Insert or replace a user.
    async fn save_user(&self, user: &User) -> AppResult<()>;

    /// Remove a user. Missing users are not an error.
    async fn delete_user(&self, user_id: &str) -> AppResult<()>;
}

/// A message received from the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayMessage {
    /// Concrete channel the message was published on.
    pub channel: String,
    /// Raw payload.
    pub payload: String,
}

/// Cross-process publish/subscribe.
#[async_trait]
pub trait PubSubRelay: Send + Sync + Debug + 'static {
    /// Publish `payload` on `channel`.
    async fn publish(&self, channel: &str, payload: &str) -> AppResult<()>;

    /// Subscribe to every channel matching `pattern` (a trailing `*` matches
    /// any suffix). The stream ends when the receiver is dropped or the
    /// backend connection is lost.
    async fn subscribe(&self, pattern: &str) -> AppResult<mpsc::Receiver<RelayMessage>>;
}

/// Source of random player pools.
#[async_trait]
pub trait Catalog: Send + Sync + Debug + 'static {
    /// Up to `count` distinct random players.
    async fn fetch_random(&self, count: usize) -> AppResult<Vec<Player>>;

    /// Up to `count` distinct random players playing `position`.
    async fn fetch_random_by_position(&self, position: &str, count: usize) -> AppResult<Vec<Player>>;
}

/// Records which players each room member bought.
#[async_trait]
pub trait TeamLedger: Send + Sync + Debug + 'static {
    /// Append `player` to the user's team in `room_id`.
    async fn credit_item(&self, room_id: &str, user_id: &str, player: &Player) -> AppResult<()>;

    /// Players credited to the user in `room_id`, in purchase order.
    async fn team(&self, room_id: &str, user_id: &str) -> AppResult<Vec<Player>>;
}

/// Whether `channel` matches a relay subscription `pattern`.
pub fn channel_matches(pattern: &str, channel: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => channel.starts_with(prefix),
        None => pattern == channel,
    }
}
