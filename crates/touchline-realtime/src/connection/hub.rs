//! Connection hub: the live connection set and its fan-out.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

use crate::channel::ChannelRegistry;

use super::handle::{ConnectionHandle, ConnectionId, SendOutcome};

/// Owns every live connection and delivers frames to them.
///
/// The connection set is only touched under one mutex, so a broadcast sees
/// either all or none of a concurrent register/unregister. Delivery never
/// waits: a connection whose queue is full is closed and dropped.
#[derive(Debug)]
pub struct ConnectionHub {
    connections: Mutex<HashMap<ConnectionId, Arc<ConnectionHandle>>>,
    channels: ChannelRegistry,
    buffer_size: usize,
}

impl ConnectionHub {
    /// Create a hub whose connections queue up to `buffer_size` frames.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
            channels: ChannelRegistry::new(),
            buffer_size: buffer_size.max(1),
        }
    }

    /// Registers a connection.
    ///
    /// A live connection with the same id is closed and replaced; its
    /// channel subscriptions carry over to the new one.
    pub async fn register(
        &self,
        id: impl Into<ConnectionId>,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.buffer_size);
        let handle = Arc::new(ConnectionHandle::new(id, tx));

        let mut connections = self.connections.lock().await;
        if let Some(previous) = connections.insert(handle.id.clone(), Arc::clone(&handle)) {
            previous.mark_replaced();
            previous.close();
            warn!(conn_id = %handle.id, "Connection id reused, previous connection closed");
        }
        let total = connections.len();
        drop(connections);

        info!(conn_id = %handle.id, instance = %handle.instance, total = total, "WebSocket connection registered");
        (handle, rx)
    }

    /// Unregisters a connection and cleans up subscriptions.
    ///
    /// Only removes the entry if it still belongs to `handle`, so a stale
    /// socket cannot evict its replacement. Returns whether it did.
    pub async fn unregister(&self, handle: &ConnectionHandle) -> bool {
        let mut connections = self.connections.lock().await;
        let owned = connections
            .get(&handle.id)
            .is_some_and(|current| current.instance == handle.instance);
        if owned {
            connections.remove(&handle.id);
            self.channels.unsubscribe_all(&handle.id);
        }
        drop(connections);

        handle.close();
        if owned {
            info!(conn_id = %handle.id, "WebSocket connection unregistered");
        }
        owned
    }

    /// Sends a raw frame to every registered connection.
    pub async fn broadcast(&self, raw: &str) -> usize {
        let mut connections = self.connections.lock().await;
        let targets: Vec<ConnectionId> = connections.keys().cloned().collect();
        self.deliver(&mut connections, &targets, raw)
    }

    /// Sends a raw frame to one connection.
    pub async fn send_to(&self, conn_id: &str, raw: &str) -> bool {
        let mut connections = self.connections.lock().await;
        self.deliver(&mut connections, &[conn_id.to_string()], raw) == 1
    }

    /// Sends a raw frame to every subscriber of `channel`.
    pub async fn broadcast_to_channel(&self, channel: &str, raw: &str) -> usize {
        let mut connections = self.connections.lock().await;
        let targets = self.channels.subscribers(channel);
        let sent = self.deliver(&mut connections, &targets, raw);
        debug!(channel = %channel, sent = sent, "Channel broadcast");
        sent
    }

    /// Subscribes a connection to a channel.
    pub fn subscribe(&self, channel: &str, conn_id: &str) {
        self.channels.subscribe(channel, conn_id);
    }

    /// Unsubscribes a connection from a channel.
    pub fn unsubscribe(&self, channel: &str, conn_id: &str) {
        self.channels.unsubscribe(channel, conn_id);
    }

    /// Drops a channel, returning its former subscribers.
    pub fn close_channel(&self, channel: &str) -> Vec<ConnectionId> {
        self.channels.close(channel)
    }

    /// Channel registry (read access for diagnostics and tests).
    pub fn channels(&self) -> &ChannelRegistry {
        &self.channels
    }

    /// Returns the total connection count.
    pub async fn connection_count(&self) -> usize {
        self.connections.lock().await.len()
    }

    /// Whether a connection with `conn_id` is registered.
    pub async fn is_connected(&self, conn_id: &str) -> bool {
        self.connections.lock().await.contains_key(conn_id)
    }

    /// Closes all connections.
    pub async fn close_all(&self) {
        let mut connections = self.connections.lock().await;
        let count = connections.len();
        for (id, handle) in connections.drain() {
            handle.close();
            self.channels.unsubscribe_all(&id);
        }
        info!(count = count, "All connections closed");
    }

    fn deliver(
        &self,
        connections: &mut HashMap<ConnectionId, Arc<ConnectionHandle>>,
        targets: &[ConnectionId],
        raw: &str,
    ) -> usize {
        let mut sent = 0;
        let mut dropped = Vec::new();
        for conn_id in targets {
            let Some(handle) = connections.get(conn_id) else {
                continue;
            };
            match handle.try_deliver(raw.to_string()) {
                SendOutcome::Delivered => sent += 1,
                SendOutcome::Full => {
                    warn!(conn_id = %conn_id, "Send buffer full, evicting unresponsive connection");
                    dropped.push(conn_id.clone());
                }
                SendOutcome::Closed => {
                    debug!(conn_id = %conn_id, "Dropping closed connection");
                    dropped.push(conn_id.clone());
                }
            }
        }
        for conn_id in dropped {
            if let Some(handle) = connections.remove(&conn_id) {
                handle.close();
                self.channels.unsubscribe_all(&conn_id);
            }
        }
        sent
    }
}
