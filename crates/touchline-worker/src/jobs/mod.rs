//! Periodic job implementations.

pub mod reaper;

pub use reaper::RoomReaper;
