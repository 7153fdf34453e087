//! Scheduler for periodic maintenance tasks.

use std::time::Duration;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use touchline_core::error::AppError;

use crate::jobs::RoomReaper;

/// Interval-based scheduler for periodic background tasks
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new scheduler
    pub async fn new() -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self { scheduler })
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Scheduler shut down");
        Ok(())
    }

    /// Idle room sweep, every `interval`
    pub async fn register_room_sweep(
        &self,
        reaper: RoomReaper,
        interval: Duration,
    ) -> Result<(), AppError> {
        if interval.is_zero() {
            return Err(AppError::configuration("Room sweep interval must be positive"));
        }

        let job = CronJob::new_repeated_async(interval, move |_uuid, _lock| {
            let reaper = reaper.clone();
            Box::pin(async move {
                if let Err(e) = reaper.run().await {
                    tracing::error!("Idle room sweep failed: {}", e);
                }
            })
        })
        .map_err(|e| AppError::internal(format!("Failed to create room_sweep schedule: {}", e)))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add room_sweep schedule: {}", e)))?;

        tracing::info!("Registered: room_sweep (every {}s)", interval.as_secs());
        Ok(())
    }
}
