//! Channel registry: every channel and its subscriptions.

use dashmap::DashMap;

use crate::connection::ConnectionId;

use super::channel::Channel;
use super::subscription::SubscriptionTracker;

/// Registry of all active channels.
///
/// Empty channels are dropped as soon as their last subscriber leaves.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    channels: DashMap<String, Channel>,
    subscriptions: SubscriptionTracker,
}

impl ChannelRegistry {
    /// Creates a new channel registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a connection to a channel.
    pub fn subscribe(&self, channel_name: &str, conn_id: &str) {
        self.channels
            .entry(channel_name.to_string())
            .or_insert_with(|| Channel::new(channel_name.to_string()))
            .subscribe(conn_id.to_string());
        self.subscriptions.add(conn_id, channel_name);
    }

    /// Unsubscribes a connection from a channel.
    pub fn unsubscribe(&self, channel_name: &str, conn_id: &str) {
        self.detach(channel_name, conn_id);
        self.subscriptions.remove(conn_id, channel_name);
    }

    /// Unsubscribes a connection from all channels.
    pub fn unsubscribe_all(&self, conn_id: &str) {
        for channel_name in self.subscriptions.remove_all(conn_id) {
            self.detach(&channel_name, conn_id);
        }
    }

    /// Drops a channel and returns its former subscribers.
    pub fn close(&self, channel_name: &str) -> Vec<ConnectionId> {
        let Some((_, channel)) = self.channels.remove(channel_name) else {
            return Vec::new();
        };
        let subscribers = channel.subscribers();
        for conn_id in &subscribers {
            self.subscriptions.remove(conn_id, channel_name);
        }
        subscribers
    }

    /// Returns all subscriber connection IDs for a channel.
    pub fn subscribers(&self, channel_name: &str) -> Vec<ConnectionId> {
        self.channels
            .get(channel_name)
            .map(|ch| ch.subscribers())
            .unwrap_or_default()
    }

    /// Whether `conn_id` is subscribed to `channel_name`.
    pub fn is_subscribed(&self, channel_name: &str, conn_id: &str) -> bool {
        self.subscriptions.channels_of(conn_id).contains(channel_name)
    }

    /// Returns total number of active channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn detach(&self, channel_name: &str, conn_id: &str) {
        if let Some(mut channel) = self.channels.get_mut(channel_name) {
            channel.unsubscribe(conn_id);
            if channel.is_empty() {
                drop(channel);
                self.channels.remove_if(channel_name, |_, ch| ch.is_empty());
            }
        }
    }
}
