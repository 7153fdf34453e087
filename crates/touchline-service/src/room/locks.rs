//! Keyed per-room mutex registry.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per room id, created on demand and dropped once nobody
/// holds or waits for it.
#[derive(Debug, Default, Clone)]
pub struct RoomLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl RoomLocks {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `room_id`.
    pub async fn acquire(&self, room_id: &str) -> RoomGuard {
        let lock = Arc::clone(self.locks.entry(room_id.to_string()).or_default().value());
        let guard = lock.lock_owned().await;
        RoomGuard {
            room_id: room_id.to_string(),
            locks: Arc::clone(&self.locks),
            _guard: guard,
        }
    }

    /// Number of rooms with a live lock entry.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no lock entry is live.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Exclusive access to one room. Released on drop.
#[derive(Debug)]
pub struct RoomGuard {
    room_id: String,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for RoomGuard {
    fn drop(&mut self) {
        // registry entry + our guard; anything more is a waiter
        self.locks
            .remove_if(&self.room_id, |_, lock| Arc::strong_count(lock) <= 2);
    }
}
