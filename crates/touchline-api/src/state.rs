//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Instant;

use touchline_core::config::AppConfig;
use touchline_realtime::RealtimeEngine;
use touchline_service::{AuctionEngine, EventRouter, RoomEngine};
use touchline_store::{Catalog, StoreManager, TeamLedger};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Connection hub and broadcast bridge
    pub realtime: Arc<RealtimeEngine>,
    /// Room engine
    pub rooms: Arc<RoomEngine>,
    /// Decodes and dispatches client frames
    pub events: EventRouter,
    /// Sold players per room member
    pub ledger: Arc<dyn TeamLedger>,
    /// Process start, for uptime
    pub started_at: Instant,
}

impl AppState {
    /// Wire the engines over already-built backends.
    pub fn new(config: AppConfig, store: &StoreManager, catalog: Arc<dyn Catalog>) -> Self {
        let realtime = Arc::new(RealtimeEngine::new(config.realtime.clone(), store.relay()));
        let auctions = Arc::new(AuctionEngine::new(
            catalog,
            store.ledger(),
            Arc::clone(&realtime.bridge),
            config.auction.clone(),
        ));
        let rooms = Arc::new(RoomEngine::new(
            store.state(),
            Arc::clone(&realtime.bridge),
            auctions,
            config.room.clone(),
        ));
        let events = EventRouter::new(
            Arc::clone(&rooms),
            Arc::clone(&realtime.bridge),
            config.realtime.clone(),
        );

        Self {
            config: Arc::new(config),
            realtime,
            rooms,
            events,
            ledger: store.ledger(),
            started_at: Instant::now(),
        }
    }
}
