//! WebSocket connection management: handles and the hub.

pub mod handle;
pub mod hub;

pub use handle::{ConnectionHandle, ConnectionId, SendOutcome};
pub use hub::ConnectionHub;
