//! Envelope carried over the cross-process relay.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A room event as published to peer processes.
///
/// `data` is the already-encoded client frame, so peers forward it without
/// re-encoding. `origin` lets the publisher ignore its own messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayEnvelope {
    /// Unique message ID for deduplication.
    pub id: Uuid,
    /// Node that published the message.
    pub origin: Uuid,
    /// Channel this message was sent on.
    pub channel: String,
    /// Encoded `{type, payload}` frame.
    pub data: String,
    /// When the message was created.
    pub timestamp: DateTime<Utc>,
}

impl RelayEnvelope {
    /// Wrap an encoded frame published by `origin` on `channel`.
    pub fn new(origin: Uuid, channel: &str, data: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin,
            channel: channel.to_string(),
            data,
            timestamp: Utc::now(),
        }
    }
}
