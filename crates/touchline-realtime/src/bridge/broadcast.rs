//! Broadcast bridge between the room engines and the connection hub.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use touchline_core::AppResult;
use touchline_store::PubSubRelay;

use crate::channel::{ROOM_CHANNEL_PATTERN, room_channel};
use crate::connection::ConnectionHub;
use crate::message::serializer::encode_outbound;
use crate::message::{OutboundMessage, RelayEnvelope};

/// Delivers room events to every local member and, when a relay is
/// configured, to members connected to peer processes.
///
/// Peer delivery is best effort: a relayed event for a room with no local
/// subscribers is dropped.
pub struct BroadcastBridge {
    hub: Arc<ConnectionHub>,
    relay: Option<Arc<dyn PubSubRelay>>,
    node_id: Uuid,
}

impl std::fmt::Debug for BroadcastBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastBridge")
            .field("node_id", &self.node_id)
            .field("relay", &self.relay.is_some())
            .finish()
    }
}

impl BroadcastBridge {
    /// Create a bridge over `hub`, publishing to `relay` when given.
    pub fn new(hub: Arc<ConnectionHub>, relay: Option<Arc<dyn PubSubRelay>>) -> Self {
        Self {
            hub,
            relay,
            node_id: Uuid::new_v4(),
        }
    }

    /// Identifier stamped on everything this node publishes.
    pub fn node_id(&self) -> Uuid {
        self.node_id
    }

    /// Sends `message` to every member of `room_id`. Returns the number of
    /// local connections reached.
    pub async fn emit(&self, room_id: &str, message: &OutboundMessage) -> usize {
        let frame = match encode_outbound(message) {
            Ok(f) => f,
            Err(e) => {
                error!(room_id = %room_id, error = %e, "Failed to serialize room event");
                return 0;
            }
        };
        let channel = room_channel(room_id);
        let sent = self.hub.broadcast_to_channel(&channel, &frame).await;

        if let Some(relay) = &self.relay {
            let envelope = RelayEnvelope::new(self.node_id, &channel, frame);
            match serde_json::to_string(&envelope) {
                Ok(payload) => {
                    if let Err(e) = relay.publish(&channel, &payload).await {
                        warn!(room_id = %room_id, error = %e, "Relay publish failed");
                    }
                }
                Err(e) => error!(error = %e, "Failed to serialize relay envelope"),
            }
        }

        debug!(room_id = %room_id, event = message.tag(), sent = sent, "Room event emitted");
        sent
    }

    /// Sends `message` to one connection only.
    pub async fn send_to(&self, conn_id: &str, message: &OutboundMessage) -> bool {
        match encode_outbound(message) {
            Ok(frame) => self.hub.send_to(conn_id, &frame).await,
            Err(e) => {
                error!(conn_id = %conn_id, error = %e, "Failed to serialize direct message");
                false
            }
        }
    }

    /// Subscribes a connection to the room's channel.
    pub fn join_room(&self, room_id: &str, conn_id: &str) {
        self.hub.subscribe(&room_channel(room_id), conn_id);
    }

    /// Unsubscribes a connection from the room's channel.
    pub fn leave_room(&self, room_id: &str, conn_id: &str) {
        self.hub.unsubscribe(&room_channel(room_id), conn_id);
    }

    /// Drops the room's channel.
    pub fn close_room(&self, room_id: &str) {
        let former = self.hub.close_channel(&room_channel(room_id));
        debug!(room_id = %room_id, subscribers = former.len(), "Room channel closed");
    }

    /// Re-fans one relayed payload to local subscribers. Payloads this node
    /// published itself are ignored.
    pub async fn deliver_relayed(&self, payload: &str) -> usize {
        let envelope: RelayEnvelope = match serde_json::from_str(payload) {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "Dropping undecodable relay envelope");
                return 0;
            }
        };
        if envelope.origin == self.node_id {
            return 0;
        }
        self.hub
            .broadcast_to_channel(&envelope.channel, &envelope.data)
            .await
    }

    /// Consumes the relay until `shutdown` fires or the subscription ends.
    /// Returns immediately when no relay is configured.
    pub async fn run_relay(self: Arc<Self>, shutdown: CancellationToken) -> AppResult<()> {
        let Some(relay) = self.relay.clone() else {
            return Ok(());
        };
        let mut rx = relay.subscribe(ROOM_CHANNEL_PATTERN).await?;
        info!(node_id = %self.node_id, "Relay listener started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                received = rx.recv() => match received {
                    Some(msg) => {
                        self.deliver_relayed(&msg.payload).await;
                    }
                    None => {
                        warn!("Relay subscription closed");
                        break;
                    }
                },
            }
        }

        info!(node_id = %self.node_id, "Relay listener stopped");
        Ok(())
    }
}
