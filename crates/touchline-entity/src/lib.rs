//! # touchline-entity
//!
//! Domain entities for Touchline. Every struct here is a serializable value
//! object that both state store backends persist as JSON. Wire-facing views
//! (such as [`room::RoomSnapshot`]) live next to the entity they project.

pub mod chat;
pub mod player;
pub mod room;
pub mod user;

pub use chat::ChatMessage;
pub use player::Player;
pub use room::{Room, RoomSettings, RoomSnapshot, RoomStatus};
pub use user::User;
