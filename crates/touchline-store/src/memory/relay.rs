//! In-process relay over a tokio broadcast channel.

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

use touchline_core::AppResult;

use crate::traits::{PubSubRelay, RelayMessage, channel_matches};

/// Relay shared by several engines inside one process.
///
/// Clones share the same bus, so two engines built on clones of one
/// `MemoryRelay` see each other's messages.
#[derive(Debug, Clone)]
pub struct MemoryRelay {
    tx: broadcast::Sender<RelayMessage>,
    buffer_size: usize,
}

impl MemoryRelay {
    /// Create a relay whose bus holds `buffer_size` undelivered messages.
    pub fn new(buffer_size: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer_size.max(1));
        Self {
            tx,
            buffer_size: buffer_size.max(1),
        }
    }
}

#[async_trait]
impl PubSubRelay for MemoryRelay {
    async fn publish(&self, channel: &str, payload: &str) -> AppResult<()> {
        match self.tx.send(RelayMessage {
            channel: channel.to_string(),
            payload: payload.to_string(),
        }) {
            Ok(receivers) => debug!(channel = %channel, receivers = receivers, "Relayed message"),
            Err(_) => debug!(channel = %channel, "Relayed message had no subscribers"),
        }
        Ok(())
    }

    async fn subscribe(&self, pattern: &str) -> AppResult<mpsc::Receiver<RelayMessage>> {
        let mut bus = self.tx.subscribe();
        let (tx, rx) = mpsc::channel(self.buffer_size);
        let pattern = pattern.to_string();

        tokio::spawn(async move {
            loop {
                match bus.recv().await {
                    Ok(msg) => {
                        if !channel_matches(&pattern, &msg.channel) {
                            continue;
                        }
                        if tx.send(msg).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped = skipped, pattern = %pattern, "Memory relay subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Ok(rx)
    }
}
