//! Top-level real-time engine that ties together the hub and the bridge.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use touchline_core::config::realtime::RealtimeConfig;
use touchline_store::PubSubRelay;

use crate::bridge::BroadcastBridge;
use crate::connection::ConnectionHub;

/// Central real-time engine.
#[derive(Debug, Clone)]
pub struct RealtimeEngine {
    /// Connection hub.
    pub hub: Arc<ConnectionHub>,
    /// Room event bridge.
    pub bridge: Arc<BroadcastBridge>,
    /// Engine configuration.
    pub config: RealtimeConfig,
    shutdown: CancellationToken,
}

impl RealtimeEngine {
    /// Creates the hub and bridge.
    pub fn new(config: RealtimeConfig, relay: Option<Arc<dyn PubSubRelay>>) -> Self {
        let hub = Arc::new(ConnectionHub::new(config.channel_buffer_size));
        let bridge = Arc::new(BroadcastBridge::new(Arc::clone(&hub), relay));
        info!(node_id = %bridge.node_id(), "Real-time engine initialized");
        Self {
            hub,
            bridge,
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Starts the relay listener in the background.
    pub fn spawn_relay(&self) -> JoinHandle<()> {
        let bridge = Arc::clone(&self.bridge);
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = bridge.run_relay(shutdown).await {
                error!(error = %e, "Relay listener failed");
            }
        })
    }

    /// Token cancelled on shutdown.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Stops background tasks and closes every connection.
    pub async fn shutdown(&self) {
        info!("Shutting down real-time engine");
        self.shutdown.cancel();
        self.hub.close_all().await;
        info!("Real-time engine shut down");
    }
}
