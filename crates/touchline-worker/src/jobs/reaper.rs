//! Idle room reaper.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use touchline_core::AppResult;
use touchline_service::RoomEngine;

/// Sweeps rooms whose last activity is older than the inactivity timeout.
#[derive(Debug, Clone)]
pub struct RoomReaper {
    rooms: Arc<RoomEngine>,
}

impl RoomReaper {
    /// Create a new reaper over `rooms`
    pub fn new(rooms: Arc<RoomEngine>) -> Self {
        Self { rooms }
    }

    /// One sweep against the wall clock.
    pub async fn run(&self) -> AppResult<usize> {
        self.run_at(Utc::now()).await
    }

    /// One sweep treating `now` as the current time.
    pub async fn run_at(&self, now: DateTime<Utc>) -> AppResult<usize> {
        tracing::debug!("Running idle room sweep");
        let removed = self.rooms.sweep_expired(now).await?;
        if removed > 0 {
            tracing::info!("Reaped {} idle rooms", removed);
        }
        Ok(removed)
    }
}
