//! Redis `PUBLISH`/`PSUBSCRIBE` relay.

use async_trait::async_trait;
use futures::StreamExt;
use redis::AsyncCommands;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use touchline_core::{AppError, AppResult, ErrorKind};

use super::client::RedisClient;
use crate::traits::{PubSubRelay, RelayMessage};

/// Relay between server processes sharing one Redis.
///
/// Channel names are used as given, without the key prefix.
#[derive(Debug, Clone)]
pub struct RedisRelay {
    client: RedisClient,
    buffer_size: usize,
}

impl RedisRelay {
    /// Create a relay; subscriptions buffer `buffer_size` messages.
    pub fn new(client: RedisClient, buffer_size: usize) -> Self {
        Self {
            client,
            buffer_size: buffer_size.max(1),
        }
    }
}

#[async_trait]
impl PubSubRelay for RedisRelay {
    async fn publish(&self, channel: &str, payload: &str) -> AppResult<()> {
        let mut conn = self.client.conn_mut();
        let receivers: i64 = conn
            .publish(channel, payload)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Relay, "Redis PUBLISH failed", e))?;
        debug!(channel = %channel, receivers = receivers, "Published relay message");
        Ok(())
    }

    async fn subscribe(&self, pattern: &str) -> AppResult<mpsc::Receiver<RelayMessage>> {
        let mut pubsub = self
            .client
            .client()
            .get_async_pubsub()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Relay, "Failed to open Redis pub/sub", e))?;
        pubsub
            .psubscribe(pattern)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Relay, "Redis PSUBSCRIBE failed", e))?;
        info!(pattern = %pattern, "Subscribed to Redis relay");

        let (tx, rx) = mpsc::channel(self.buffer_size);
        let pattern = pattern.to_string();
        tokio::spawn(async move {
            let mut stream = pubsub.into_on_message();
            while let Some(msg) = stream.next().await {
                let payload: String = match msg.get_payload() {
                    Ok(p) => p,
                    Err(e) => {
                        warn!(error = %e, "Dropping non-text relay payload");
                        continue;
                    }
                };
                let message = RelayMessage {
                    channel: msg.get_channel_name().to_string(),
                    payload,
                };
                if tx.send(message).await.is_err() {
                    break;
                }
            }
            info!(pattern = %pattern, "Redis relay subscription ended");
        });

        Ok(rx)
    }
}
