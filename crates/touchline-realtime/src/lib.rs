//! # touchline-realtime
//!
//! Real-time delivery layer for Touchline:
//!
//! - Connection hub with bounded per-connection queues and eviction of
//!   consumers that stop draining
//! - Room channels (`room:{id}`) for fan-out
//! - Closed inbound/outbound message enums on a `{type, payload}` envelope
//! - Broadcast bridge with an optional cross-process relay

pub mod bridge;
pub mod channel;
pub mod connection;
pub mod message;
pub mod server;

pub use bridge::BroadcastBridge;
pub use channel::ChannelRegistry;
pub use connection::{ConnectionHandle, ConnectionHub};
pub use message::{InboundMessage, OutboundMessage};
pub use server::RealtimeEngine;
