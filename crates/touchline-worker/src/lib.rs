//! Scheduled background tasks for Touchline.
//!
//! This crate provides:
//! - A scheduler wrapping `tokio-cron-scheduler`
//! - The room reaper, which destroys rooms idle past the inactivity timeout

pub mod jobs;
pub mod scheduler;

pub use jobs::RoomReaper;
pub use scheduler::CronScheduler;
