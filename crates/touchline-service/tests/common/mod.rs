#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use touchline_core::config::auction::AuctionConfig;
use touchline_core::config::realtime::RealtimeConfig;
use touchline_core::config::room::RoomConfig;
use touchline_core::{AppError, AppResult};
use touchline_entity::Player;
use touchline_realtime::message::inbound::{CreateRoomPayload, JoinRoomPayload, LotRequest};
use touchline_realtime::{BroadcastBridge, ConnectionHandle, ConnectionHub};
use touchline_service::{AuctionEngine, EventRouter, RoomEngine};
use touchline_store::memory::{MemoryStateStore, MemoryTeamLedger};
use touchline_store::{Catalog, FileCatalog, StateStore, TeamLedger};

pub struct Harness {
    pub hub: Arc<ConnectionHub>,
    pub bridge: Arc<BroadcastBridge>,
    pub store: Arc<MemoryStateStore>,
    pub ledger: Arc<MemoryTeamLedger>,
    pub auctions: Arc<AuctionEngine>,
    pub rooms: Arc<RoomEngine>,
    pub router: EventRouter,
}

impl Harness {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self::with_config(catalog, RoomConfig::default(), RealtimeConfig::default())
    }

    pub fn with_config(catalog: Arc<dyn Catalog>, room: RoomConfig, realtime: RealtimeConfig) -> Self {
        let hub = Arc::new(ConnectionHub::new(realtime.channel_buffer_size));
        let bridge = Arc::new(BroadcastBridge::new(Arc::clone(&hub), None));
        let store = Arc::new(MemoryStateStore::new());
        let ledger = Arc::new(MemoryTeamLedger::new());
        let auctions = Arc::new(AuctionEngine::new(
            catalog,
            Arc::clone(&ledger) as Arc<dyn TeamLedger>,
            Arc::clone(&bridge),
            AuctionConfig::default(),
        ));
        let rooms = Arc::new(RoomEngine::new(
            Arc::clone(&store) as Arc<dyn StateStore>,
            Arc::clone(&bridge),
            Arc::clone(&auctions),
            room,
        ));
        let router = EventRouter::new(Arc::clone(&rooms), Arc::clone(&bridge), realtime);
        Self {
            hub,
            bridge,
            store,
            ledger,
            auctions,
            rooms,
            router,
        }
    }

    pub async fn connect(&self, id: &str) -> Client {
        let (handle, rx) = self.hub.register(id).await;
        Client {
            id: id.to_string(),
            handle,
            rx,
        }
    }
}

pub struct Client {
    pub id: String,
    pub handle: Arc<ConnectionHandle>,
    pub rx: mpsc::Receiver<String>,
}

impl Client {
    /// Every frame queued so far, parsed.
    pub fn drain(&mut self) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Ok(raw) = self.rx.try_recv() {
            frames.push(serde_json::from_str(&raw).expect("server frames are JSON"));
        }
        frames
    }

    /// Queued frames of one type, discarding the rest.
    pub fn drain_of(&mut self, event: &str) -> Vec<Value> {
        self.drain()
            .into_iter()
            .filter(|f| f["type"] == event)
            .collect()
    }
}

pub fn create(room_id: &str, username: &str) -> CreateRoomPayload {
    CreateRoomPayload {
        username: username.to_string(),
        room_id: room_id.to_string(),
        password: None,
        private: false,
        settings: None,
    }
}

pub fn join(room_id: &str, username: &str) -> JoinRoomPayload {
    JoinRoomPayload {
        room_id: room_id.to_string(),
        username: username.to_string(),
        password: None,
        reconnect_token: None,
    }
}

pub fn lot(position: &str, count: usize) -> LotRequest {
    LotRequest {
        position: Some(position.to_string()),
        count,
    }
}

pub fn catalog(entries: &[(&str, &str)]) -> Arc<dyn Catalog> {
    let players = entries
        .iter()
        .map(|(name, position)| Player::new(*name, *position))
        .collect();
    Arc::new(FileCatalog::from_players(players))
}

/// Catalog whose lookups always fail.
#[derive(Debug)]
pub struct FailingCatalog;

#[async_trait]
impl Catalog for FailingCatalog {
    async fn fetch_random(&self, _count: usize) -> AppResult<Vec<Player>> {
        Err(AppError::catalog("catalog offline"))
    }

    async fn fetch_random_by_position(&self, _position: &str, _count: usize) -> AppResult<Vec<Player>> {
        Err(AppError::catalog("catalog offline"))
    }
}
