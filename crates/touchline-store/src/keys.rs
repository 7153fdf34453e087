//! Key builders for every state store entry.
//!
//! Keys are relative; the Redis client adds the configured prefix.

/// Key for a room record.
pub fn room(room_id: &str) -> String {
    format!("room:{room_id}")
}

/// Pattern matching every room record.
pub fn room_pattern() -> String {
    "room:*".to_string()
}

/// Key for a user record.
pub fn user(user_id: &str) -> String {
    format!("user:{user_id}")
}

/// Key for the players a user bought in a room.
pub fn team(room_id: &str, user_id: &str) -> String {
    format!("team:{room_id}:{user_id}")
}
