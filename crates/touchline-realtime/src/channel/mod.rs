//! Room channels and their subscriber sets.

pub mod channel;
pub mod registry;
pub mod subscription;

pub use registry::ChannelRegistry;

/// Channel carrying every event of one room.
pub fn room_channel(room_id: &str) -> String {
    format!("room:{room_id}")
}

/// Pattern matching every room channel.
pub const ROOM_CHANNEL_PATTERN: &str = "room:*";
