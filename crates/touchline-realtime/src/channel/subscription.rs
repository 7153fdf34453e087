//! Reverse index from connection to channels.

use std::collections::HashSet;

use dashmap::DashMap;

use crate::connection::ConnectionId;

/// Which channels each connection is subscribed to.
#[derive(Debug, Default)]
pub struct SubscriptionTracker {
    conn_to_channels: DashMap<ConnectionId, HashSet<String>>,
}

impl SubscriptionTracker {
    /// Creates a new subscription tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a subscription.
    pub fn add(&self, conn_id: &str, channel: &str) {
        self.conn_to_channels
            .entry(conn_id.to_string())
            .or_default()
            .insert(channel.to_string());
    }

    /// Removes a subscription.
    pub fn remove(&self, conn_id: &str, channel: &str) {
        let now_empty = match self.conn_to_channels.get_mut(conn_id) {
            Some(mut channels) => {
                channels.remove(channel);
                channels.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.conn_to_channels.remove_if(conn_id, |_, c| c.is_empty());
        }
    }

    /// Gets all channels a connection is subscribed to.
    pub fn channels_of(&self, conn_id: &str) -> HashSet<String> {
        self.conn_to_channels
            .get(conn_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Removes all subscriptions for a connection.
    pub fn remove_all(&self, conn_id: &str) -> HashSet<String> {
        self.conn_to_channels
            .remove(conn_id)
            .map(|(_, channels)| channels)
            .unwrap_or_default()
    }
}
