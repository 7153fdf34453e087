//! Auction engine: start, bid, timed finalize.

use std::sync::{Arc, OnceLock};

use chrono::Utc;
use dashmap::DashMap;
use futures::future::BoxFuture;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use touchline_core::config::auction::AuctionConfig;
use touchline_core::{AppError, AppResult};
use touchline_entity::Player;
use touchline_realtime::BroadcastBridge;
use touchline_realtime::message::OutboundMessage;
use touchline_realtime::message::inbound::LotRequest;
use touchline_realtime::message::outbound::BidEntry;
use touchline_store::{Catalog, TeamLedger};

use super::state::{AuctionPhase, AuctionSnapshot, AuctionState, PositionLot};

/// Label for lots drawn without a position filter.
pub const ANY_POSITION: &str = "ANY";

/// Runs after an auction has closed its last item, with the room id.
pub type CompletionHook = Arc<dyn Fn(String) -> BoxFuture<'static, ()> + Send + Sync>;

/// Runs one auction per room.
///
/// Each room's state sits behind its own mutex. Every item gets exactly one
/// expiry timer; the timer carries the item sequence it was armed for and
/// does nothing if the item has changed by the time it fires.
pub struct AuctionEngine {
    auctions: DashMap<String, Arc<Mutex<AuctionState>>>,
    catalog: Arc<dyn Catalog>,
    ledger: Arc<dyn TeamLedger>,
    bridge: Arc<BroadcastBridge>,
    config: AuctionConfig,
    on_complete: OnceLock<CompletionHook>,
}

impl std::fmt::Debug for AuctionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuctionEngine")
            .field("auctions", &self.auctions.len())
            .field("config", &self.config)
            .finish()
    }
}

impl AuctionEngine {
    /// Creates a new auction engine.
    pub fn new(
        catalog: Arc<dyn Catalog>,
        ledger: Arc<dyn TeamLedger>,
        bridge: Arc<BroadcastBridge>,
        config: AuctionConfig,
    ) -> Self {
        Self {
            auctions: DashMap::new(),
            catalog,
            ledger,
            bridge,
            config,
            on_complete: OnceLock::new(),
        }
    }

    /// Registers the hook spawned when an auction completes. The first
    /// registration wins.
    pub fn on_complete(&self, hook: CompletionHook) {
        if self.on_complete.set(hook).is_err() {
            warn!("Auction completion hook already registered");
        }
    }

    /// Starts an auction over `lots` in `room_id`.
    ///
    /// Every lot is fetched before any state exists, so a catalog failure
    /// leaves the room without an auction. A running auction is a conflict;
    /// a completed one is replaced.
    pub async fn start(self: &Arc<Self>, room_id: &str, lots: &[LotRequest]) -> AppResult<()> {
        if let Some(existing) = self.entry(room_id) {
            if existing.lock().await.phase != AuctionPhase::Complete {
                return Err(AppError::conflict(format!(
                    "An auction is already running in room '{room_id}'"
                )));
            }
        }

        let mut fetched = Vec::with_capacity(lots.len());
        for request in lots {
            let (position, items) = match request.position.as_deref() {
                Some(position) => (
                    position.to_string(),
                    self.catalog
                        .fetch_random_by_position(position, request.count)
                        .await?,
                ),
                None => (
                    ANY_POSITION.to_string(),
                    self.catalog.fetch_random(request.count).await?,
                ),
            };
            if items.is_empty() {
                debug!(room_id = %room_id, position = %position, "Catalog returned no items, skipping lot");
                continue;
            }
            fetched.push(PositionLot {
                position,
                items,
                cursor: 0,
            });
        }
        if fetched.is_empty() {
            return Err(AppError::validation("Auction has no items to sell"));
        }

        let total: usize = fetched.iter().map(|l| l.items.len()).sum();
        let state = Arc::new(Mutex::new(AuctionState::new(room_id, fetched)));
        let mut guard = state.lock().await;
        if let Some(previous) = self.auctions.insert(room_id.to_string(), Arc::clone(&state)) {
            previous.lock().await.cancel_timer();
        }
        info!(room_id = %room_id, lots = guard.lots.len(), items = total, "Auction started");
        self.put_on_block(&mut guard).await;
        Ok(())
    }

    /// Places a bid. Accepted only while an item is on the block and
    /// `amount` strictly exceeds the current bid.
    pub async fn place_bid(&self, room_id: &str, bidder: &str, amount: u64) -> bool {
        let Some(entry) = self.entry(room_id) else {
            return false;
        };
        let mut state = entry.lock().await;
        if state.phase != AuctionPhase::OnBlock || amount <= state.current_bid {
            debug!(room_id = %room_id, bidder = %bidder, amount = amount, current = state.current_bid, "Bid rejected");
            return false;
        }

        state.current_bid = amount;
        state.current_bidder = bidder.to_string();
        state.bids.push(BidEntry {
            user_id: bidder.to_string(),
            amount,
            timestamp: Utc::now(),
        });

        if let Some((position, item)) = state.current() {
            let message = OutboundMessage::BidHistory {
                position: position.to_string(),
                item: item.clone(),
                bids: state.bids.clone(),
            };
            self.bridge.emit(room_id, &message).await;
        }
        true
    }

    /// Closes the window for the item armed with `seq`.
    ///
    /// Sells to the leader (or records it unsold), then puts the next item
    /// on the block or completes the auction. A stale `seq` is a no-op.
    pub fn finalize(self: &Arc<Self>, room_id: &str, seq: u64) -> BoxFuture<'static, ()> {
        let engine = Arc::clone(self);
        let room_id = room_id.to_string();
        Box::pin(async move { engine.close_item(&room_id, seq).await })
    }

    async fn close_item(self: &Arc<Self>, room_id: &str, seq: u64) {
        let Some(entry) = self.entry(room_id) else {
            return;
        };
        let mut state = entry.lock().await;
        if state.phase != AuctionPhase::OnBlock || state.item_seq != seq {
            debug!(room_id = %room_id, seq = seq, current = state.item_seq, "Ignoring stale auction timer");
            return;
        }
        // this runs on the timer task; detach instead of aborting ourselves
        drop(state.timer.take());
        state.phase = AuctionPhase::Finalizing;

        let Some((position, item)) = state.current().map(|(p, i)| (p.to_string(), i.clone())) else {
            state.phase = AuctionPhase::Complete;
            return;
        };
        let winner = state.current_bidder.clone();
        let bid = state.current_bid;

        if !winner.is_empty() {
            self.credit(room_id, &winner, &item);
        }
        info!(room_id = %room_id, player = %item.name, winner = %winner, bid = bid, "Auction item closed");
        self.bridge
            .emit(
                room_id,
                &OutboundMessage::PlayerSold {
                    position,
                    item,
                    winner,
                    bid,
                },
            )
            .await;

        if state.advance() {
            self.put_on_block(&mut state).await;
        } else {
            state.phase = AuctionPhase::Complete;
            info!(room_id = %room_id, "Auction complete");
            self.bridge
                .emit(
                    room_id,
                    &OutboundMessage::AuctionComplete {
                        room_id: room_id.to_string(),
                    },
                )
                .await;
            // the hook takes the room lock, so it must not run under ours
            if let Some(hook) = self.on_complete.get() {
                tokio::spawn(hook(room_id.to_string()));
            }
        }
    }

    /// Cancels the timer and drops the room's auction.
    pub async fn abort(&self, room_id: &str) {
        if let Some((_, entry)) = self.auctions.remove(room_id) {
            entry.lock().await.cancel_timer();
            info!(room_id = %room_id, "Auction aborted");
        }
    }

    /// Read-only view of the room's auction.
    pub async fn snapshot(&self, room_id: &str) -> Option<AuctionSnapshot> {
        let entry = self.entry(room_id)?;
        let state = entry.lock().await;
        Some(state.snapshot())
    }

    /// Whether an item is currently on the block in `room_id`.
    pub async fn is_running(&self, room_id: &str) -> bool {
        match self.entry(room_id) {
            Some(entry) => entry.lock().await.phase != AuctionPhase::Complete,
            None => false,
        }
    }

    fn entry(&self, room_id: &str) -> Option<Arc<Mutex<AuctionState>>> {
        self.auctions.get(room_id).map(|e| Arc::clone(e.value()))
    }

    /// Reset the slate, re-arm the timer and announce the item.
    async fn put_on_block(self: &Arc<Self>, state: &mut AuctionState) {
        state.reset_bids();
        state.phase = AuctionPhase::OnBlock;
        state.item_seq += 1;
        state.cancel_timer();

        let engine = Arc::clone(self);
        let room_id = state.room_id.clone();
        let seq = state.item_seq;
        let window = self.config.bid_window();
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            engine.finalize(&room_id, seq).await;
        }));

        let Some((position, item)) = state.current().map(|(p, i)| (p.to_string(), i.clone())) else {
            return;
        };
        debug!(room_id = %state.room_id, seq = seq, player = %item.name, "Item on the block");
        self.bridge
            .emit(
                &state.room_id,
                &OutboundMessage::AuctionPlayer {
                    position: position.clone(),
                    item: item.clone(),
                },
            )
            .await;
        self.bridge
            .emit(
                &state.room_id,
                &OutboundMessage::BidHistory {
                    position,
                    item,
                    bids: Vec::new(),
                },
            )
            .await;
    }

    /// Record the sale without blocking the auction on the ledger.
    fn credit(&self, room_id: &str, winner: &str, item: &Player) {
        let ledger = Arc::clone(&self.ledger);
        let room_id = room_id.to_string();
        let winner = winner.to_string();
        let item = item.clone();
        tokio::spawn(async move {
            if let Err(e) = ledger.credit_item(&room_id, &winner, &item).await {
                warn!(room_id = %room_id, winner = %winner, player = %item.name, error = %e, "Failed to credit sold player");
            }
        });
    }
}
