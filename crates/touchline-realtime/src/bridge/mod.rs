//! Fan-out of room events to local sockets and peer processes.

pub mod broadcast;

pub use broadcast::BroadcastBridge;
