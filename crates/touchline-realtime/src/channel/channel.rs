//! Single channel with subscriber tracking.

use std::collections::HashSet;

use crate::connection::ConnectionId;

/// A named channel and the connections subscribed to it.
#[derive(Debug, Clone)]
pub struct Channel {
    /// Channel name.
    pub name: String,
    subscribers: HashSet<ConnectionId>,
}

impl Channel {
    /// Creates a new empty channel.
    pub fn new(name: String) -> Self {
        Self {
            name,
            subscribers: HashSet::new(),
        }
    }

    /// Adds a subscriber.
    pub fn subscribe(&mut self, conn_id: ConnectionId) {
        self.subscribers.insert(conn_id);
    }

    /// Removes a subscriber.
    pub fn unsubscribe(&mut self, conn_id: &str) {
        self.subscribers.remove(conn_id);
    }

    /// Returns whether the channel has any subscribers.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Returns all subscriber connection IDs.
    pub fn subscribers(&self) -> Vec<ConnectionId> {
        self.subscribers.iter().cloned().collect()
    }
}
