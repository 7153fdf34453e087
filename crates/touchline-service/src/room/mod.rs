//! Room lifecycle engine.

pub mod expiry;
pub mod locks;
pub mod service;

pub use locks::{RoomGuard, RoomLocks};
pub use service::RoomEngine;
