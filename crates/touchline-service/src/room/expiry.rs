//! Idle room collection.

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use touchline_core::AppResult;
use touchline_realtime::message::OutboundMessage;

use super::service::RoomEngine;

/// Reason sent in `roomClosed` when a room is reaped.
pub const EXPIRED_REASON: &str = "expired";

impl RoomEngine {
    /// Destroys every room idle for longer than the configured timeout,
    /// regardless of membership. Returns how many rooms were removed.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let timeout = Duration::minutes(self.config.inactivity_timeout_minutes);
        let candidates: Vec<String> = self
            .store
            .list_rooms()
            .await?
            .into_iter()
            .filter(|r| r.is_expired(now, timeout))
            .map(|r| r.id)
            .collect();

        let mut removed = 0;
        for room_id in candidates {
            match self.expire_room(&room_id, now, timeout).await {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) => warn!(room_id = %room_id, error = %e, "Failed to expire room"),
            }
        }
        if removed > 0 {
            info!(removed = removed, "Expired idle rooms");
        }
        Ok(removed)
    }

    async fn expire_room(&self, room_id: &str, now: DateTime<Utc>, timeout: Duration) -> AppResult<bool> {
        let _guard = self.locks.acquire(room_id).await;
        // re-check under the lock; the room may have seen activity since listing
        let Some(room) = self.store.get_room(room_id).await? else {
            return Ok(false);
        };
        if !room.is_expired(now, timeout) {
            return Ok(false);
        }

        self.bridge
            .emit(
                room_id,
                &OutboundMessage::RoomClosed {
                    room_id: room_id.to_string(),
                    reason: EXPIRED_REASON.to_string(),
                },
            )
            .await;
        self.destroy_locked(&room).await?;
        info!(room_id = %room_id, members = room.members.len(), "Room expired");
        Ok(true)
    }
}
