//! Room domain entities.

pub mod model;
pub mod settings;
pub mod snapshot;
pub mod status;

pub use model::Room;
pub use settings::RoomSettings;
pub use snapshot::{MemberView, RoomSnapshot, RoomSummary, SettingsView};
pub use status::RoomStatus;
