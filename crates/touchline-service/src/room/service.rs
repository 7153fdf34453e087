//! Room engine: every room mutation as one locked transaction.

use std::sync::{Arc, Weak};

use chrono::Utc;
use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use touchline_core::config::room::RoomConfig;
use touchline_core::{AppError, AppResult};
use touchline_entity::room::RoomSummary;
use touchline_entity::{ChatMessage, Room, RoomSettings, RoomSnapshot, RoomStatus, User};
use touchline_realtime::BroadcastBridge;
use touchline_realtime::message::OutboundMessage;
use touchline_realtime::message::inbound::{CreateRoomPayload, JoinRoomPayload, LotRequest};
use touchline_store::StateStore;

use super::locks::{RoomGuard, RoomLocks};
use crate::auction::{AuctionEngine, AuctionPhase, CompletionHook};

/// A caller resolved to their room, with the room lock held.
pub(crate) struct MemberContext {
    pub(crate) _guard: RoomGuard,
    pub(crate) user: User,
    pub(crate) room: Room,
}

/// Owns room and membership state.
///
/// Each operation resolves the caller by connection id, locks the room,
/// checks membership and authorization, mutates, persists the room and its
/// members, then emits while still holding the lock so every member sees
/// events in mutation order. A caller with no user or room record gets
/// `NotFound`.
pub struct RoomEngine {
    pub(crate) store: Arc<dyn StateStore>,
    pub(crate) bridge: Arc<BroadcastBridge>,
    pub(crate) auctions: Arc<AuctionEngine>,
    pub(crate) locks: RoomLocks,
    pub(crate) config: RoomConfig,
}

impl std::fmt::Debug for RoomEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomEngine")
            .field("config", &self.config)
            .finish()
    }
}

impl RoomEngine {
    /// Creates a new room engine.
    pub fn new(
        store: Arc<dyn StateStore>,
        bridge: Arc<BroadcastBridge>,
        auctions: Arc<AuctionEngine>,
        config: RoomConfig,
    ) -> Self {
        let locks = RoomLocks::new();
        auctions.on_complete(finish_on_complete(
            Arc::clone(&store),
            Arc::clone(&bridge),
            Arc::downgrade(&auctions),
            locks.clone(),
        ));
        Self {
            store,
            bridge,
            auctions,
            locks,
            config,
        }
    }

    /// Creates a room with the caller as its sole member and host.
    pub async fn create_room(&self, conn_id: &str, req: CreateRoomPayload) -> AppResult<RoomSnapshot> {
        let room_id = req.room_id.trim().to_string();
        let username = req.username.trim().to_string();
        if room_id.is_empty() || username.is_empty() {
            return Err(AppError::validation("Room id and username are required"));
        }
        // a rejected create must not touch the caller's current room
        {
            let _guard = self.locks.acquire(&room_id).await;
            self.ensure_free(&room_id).await?;
        }
        self.leave_current(conn_id).await?;

        let _guard = self.locks.acquire(&room_id).await;
        self.ensure_free(&room_id).await?;

        let mut settings = req.settings.unwrap_or_default();
        if let Some(password) = req.password.filter(|p| !p.is_empty()) {
            settings.password = Some(password);
        }
        settings.private |= req.private;

        let now = Utc::now();
        let host = User::new(conn_id, username, room_id.as_str(), now);
        let room = Room::new(room_id.as_str(), host, settings, now);
        self.commit(&room).await?;
        self.bridge.join_room(&room.id, conn_id);

        info!(room_id = %room.id, host_id = %conn_id, private = room.settings.private, "Room created");
        let snapshot = room.snapshot();
        self.bridge
            .emit(&room.id, &OutboundMessage::RoomStateUpdate(snapshot.clone()))
            .await;
        Ok(snapshot)
    }

    /// Adds the caller to an existing room.
    ///
    /// Private rooms require the matching password (`Authorization`); a full
    /// room yields `Capacity`. A running auction is replayed to the joiner.
    pub async fn join_room(&self, conn_id: &str, req: JoinRoomPayload) -> AppResult<RoomSnapshot> {
        let room_id = req.room_id.trim().to_string();
        let username = req.username.trim().to_string();
        if room_id.is_empty() || username.is_empty() {
            return Err(AppError::validation("Room id and username are required"));
        }
        if req.reconnect_token.is_some() {
            debug!(conn_id = %conn_id, room_id = %room_id, "Reconnect token ignored, joining as a new member");
        }

        if let Some(existing) = self.store.get_user(conn_id).await? {
            if existing.room_id == room_id {
                let _guard = self.locks.acquire(&room_id).await;
                if let Some(room) = self.store.get_room(&room_id).await? {
                    if room.is_member(conn_id) {
                        let snapshot = room.snapshot();
                        self.bridge
                            .send_to(conn_id, &OutboundMessage::RoomStateUpdate(snapshot.clone()))
                            .await;
                        return Ok(snapshot);
                    }
                }
            }
        }
        // same for join; re-checked below since the lock was released
        {
            let _guard = self.locks.acquire(&room_id).await;
            self.admit(&room_id, conn_id, req.password.as_deref()).await?;
        }
        self.leave_current(conn_id).await?;

        let _guard = self.locks.acquire(&room_id).await;
        let mut room = self.admit(&room_id, conn_id, req.password.as_deref()).await?;

        let now = Utc::now();
        let mut user = User::new(conn_id, username, room_id.as_str(), now);
        user.reconnect_token = req.reconnect_token;
        room.add_member(user);
        room.touch(now);
        self.commit(&room).await?;
        self.bridge.join_room(&room.id, conn_id);

        info!(room_id = %room.id, conn_id = %conn_id, members = room.members.len(), "User joined room");
        let snapshot = room.snapshot();
        self.bridge
            .emit(&room.id, &OutboundMessage::RoomStateUpdate(snapshot.clone()))
            .await;
        self.replay_auction(&room.id, conn_id).await;
        Ok(snapshot)
    }

    /// Removes the caller from their room. Idempotent.
    ///
    /// The last member leaving destroys the room; a leaving host hands the
    /// role to the earliest-joined remaining member.
    pub async fn leave_room(&self, conn_id: &str) -> AppResult<()> {
        let Some(user) = self.store.get_user(conn_id).await? else {
            return Ok(());
        };
        let _guard = self.locks.acquire(&user.room_id).await;
        self.remove_locked(conn_id, &user.room_id).await
    }

    /// Host removes another member.
    pub async fn kick_user(&self, conn_id: &str, target_id: &str) -> AppResult<()> {
        let MemberContext { _guard, mut room, .. } = self.member_context(conn_id).await?;
        Self::require_host(&room, conn_id)?;
        if target_id == conn_id {
            return Err(AppError::validation("The host cannot kick themselves"));
        }
        if room.remove_member(target_id).is_none() {
            return Err(AppError::not_found(format!("User '{target_id}' is not in the room")));
        }

        self.store.delete_user(target_id).await?;
        self.bridge.leave_room(&room.id, target_id);
        self.bridge
            .send_to(target_id, &OutboundMessage::Kicked { room_id: room.id.clone() })
            .await;

        room.touch(Utc::now());
        self.commit(&room).await?;
        info!(room_id = %room.id, host_id = %conn_id, target_id = %target_id, "User kicked");
        self.emit_state(&room).await;
        Ok(())
    }

    /// Host hands the host role to another member.
    pub async fn transfer_host(&self, conn_id: &str, new_host_id: &str) -> AppResult<()> {
        let MemberContext { _guard, mut room, .. } = self.member_context(conn_id).await?;
        Self::require_host(&room, conn_id)?;
        if !room.set_host(new_host_id) {
            return Err(AppError::not_found(format!("User '{new_host_id}' is not in the room")));
        }
        room.touch(Utc::now());
        self.commit(&room).await?;
        info!(room_id = %room.id, from = %conn_id, to = %new_host_id, "Host transferred");
        self.emit_state(&room).await;
        Ok(())
    }

    /// Host replaces the room settings.
    pub async fn set_settings(&self, conn_id: &str, settings: RoomSettings) -> AppResult<()> {
        let MemberContext { _guard, mut room, .. } = self.member_context(conn_id).await?;
        Self::require_host(&room, conn_id)?;
        room.settings = settings;
        room.touch(Utc::now());
        self.store.save_room(&room).await?;
        debug!(room_id = %room.id, "Room settings updated");
        self.emit_state(&room).await;
        Ok(())
    }

    /// Member toggles their ready flag.
    pub async fn set_ready(&self, conn_id: &str, ready: bool) -> AppResult<()> {
        let MemberContext { _guard, mut room, .. } = self.member_context(conn_id).await?;
        if let Some(member) = room.members.get_mut(conn_id) {
            member.ready = ready;
        }
        room.touch(Utc::now());
        self.commit(&room).await?;
        self.emit_state(&room).await;
        Ok(())
    }

    /// Member posts a chat line.
    pub async fn chat(&self, conn_id: &str, text: &str) -> AppResult<ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::validation("Chat message is empty"));
        }
        let MemberContext { _guard, user, mut room } = self.member_context(conn_id).await?;
        let now = Utc::now();
        let message = ChatMessage::new(conn_id, user.username, text, now);
        room.push_chat(message.clone(), self.config.max_chat_history);
        room.touch(now);
        self.store.save_room(&room).await?;
        self.bridge
            .emit(&room.id, &OutboundMessage::ChatMessage(message.clone()))
            .await;
        Ok(message)
    }

    /// Sends the room's chat log to the caller only.
    pub async fn chat_history(&self, conn_id: &str) -> AppResult<Vec<ChatMessage>> {
        let MemberContext { room, .. } = self.member_context(conn_id).await?;
        self.bridge
            .send_to(
                conn_id,
                &OutboundMessage::GetChatHistory {
                    messages: room.chat.clone(),
                },
            )
            .await;
        Ok(room.chat)
    }

    /// Sends message and member counts to the caller only.
    pub async fn analytics(&self, conn_id: &str) -> AppResult<(usize, usize)> {
        let MemberContext { room, .. } = self.member_context(conn_id).await?;
        let totals = (room.chat.len(), room.members.len());
        self.bridge
            .send_to(
                conn_id,
                &OutboundMessage::GetRoomAnalytics {
                    room_id: room.id.clone(),
                    total_messages: totals.0,
                    total_users: totals.1,
                },
            )
            .await;
        Ok(totals)
    }

    /// Host moves the room to another phase.
    pub async fn start_phase(&self, conn_id: &str, phase: &str) -> AppResult<RoomStatus> {
        let MemberContext { _guard, mut room, .. } = self.member_context(conn_id).await?;
        Self::require_host(&room, conn_id)?;
        let status: RoomStatus = phase.parse()?;
        room.status = status;
        room.touch(Utc::now());
        self.store.save_room(&room).await?;
        info!(room_id = %room.id, status = %status, "Room phase changed");
        self.emit_state(&room).await;
        Ok(status)
    }

    /// Sends the public, joinable rooms to the caller.
    pub async fn list_rooms(&self, conn_id: &str) -> AppResult<Vec<RoomSummary>> {
        let rooms = self.public_rooms().await?;
        self.bridge
            .send_to(conn_id, &OutboundMessage::ListRooms { rooms: rooms.clone() })
            .await;
        Ok(rooms)
    }

    /// Public rooms that still have space, ordered by id.
    pub async fn public_rooms(&self) -> AppResult<Vec<RoomSummary>> {
        let default_max = self.config.default_max_users;
        let mut rooms: Vec<RoomSummary> = self
            .store
            .list_rooms()
            .await?
            .iter()
            .filter(|r| r.is_listed(default_max))
            .map(|r| RoomSummary::new(r, default_max))
            .collect();
        rooms.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(rooms)
    }

    /// Host starts an auction over `lots`.
    pub async fn start_auction(&self, conn_id: &str, lots: &[LotRequest]) -> AppResult<()> {
        let MemberContext { _guard, mut room, .. } = self.member_context(conn_id).await?;
        Self::require_host(&room, conn_id)?;
        self.auctions.start(&room.id, lots).await?;

        room.status = RoomStatus::InProgress;
        room.touch(Utc::now());
        self.store.save_room(&room).await?;
        self.emit_state(&room).await;
        Ok(())
    }

    /// Member bids on the item on the block. Returns whether it was accepted.
    pub async fn place_bid(&self, conn_id: &str, amount: u64) -> AppResult<bool> {
        let MemberContext { _guard, mut room, .. } = self.member_context(conn_id).await?;
        if !self.auctions.place_bid(&room.id, conn_id, amount).await {
            return Ok(false);
        }
        room.touch(Utc::now());
        self.store.save_room(&room).await?;
        Ok(true)
    }

    /// Connection went away.
    pub async fn disconnect(&self, conn_id: &str) -> AppResult<()> {
        self.leave_room(conn_id).await
    }

    /// Current state of a room, if it exists.
    pub async fn room(&self, room_id: &str) -> AppResult<Option<RoomSnapshot>> {
        Ok(self.store.get_room(room_id).await?.map(|r| r.snapshot()))
    }

    /// Resolve the caller and lock their room.
    pub(crate) async fn member_context(&self, conn_id: &str) -> AppResult<MemberContext> {
        let user = self
            .store
            .get_user(conn_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User '{conn_id}' is not in a room")))?;
        let guard = self.locks.acquire(&user.room_id).await;
        let room = self
            .store
            .get_room(&user.room_id)
            .await?
            .filter(|r| r.is_member(conn_id))
            .ok_or_else(|| AppError::not_found(format!("Room '{}' not found", user.room_id)))?;
        Ok(MemberContext {
            _guard: guard,
            user,
            room,
        })
    }

    fn require_host(room: &Room, conn_id: &str) -> AppResult<()> {
        if room.is_host(conn_id) {
            Ok(())
        } else {
            Err(AppError::authorization("Only the host can do that"))
        }
    }

    /// Fails with `Conflict` if `room_id` is taken. Caller holds its lock.
    async fn ensure_free(&self, room_id: &str) -> AppResult<()> {
        if self.store.get_room(room_id).await?.is_some() {
            return Err(AppError::conflict(format!("Room '{room_id}' already exists")));
        }
        Ok(())
    }

    /// Loads `room_id` and checks the caller may enter it. Caller holds its lock.
    async fn admit(&self, room_id: &str, conn_id: &str, password: Option<&str>) -> AppResult<Room> {
        let room = self
            .store
            .get_room(room_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Room '{room_id}' not found")))?;

        if !room.settings.accepts_password(password) {
            info!(room_id = %room_id, conn_id = %conn_id, "Join rejected: invalid password");
            return Err(AppError::authorization("Invalid room password"));
        }
        if room.is_full(self.config.default_max_users) {
            info!(room_id = %room_id, conn_id = %conn_id, members = room.members.len(), "Join rejected: room is full");
            return Err(AppError::capacity(format!("Room '{room_id}' is full")));
        }
        Ok(room)
    }

    /// Leave whatever room the caller is in. Runs only once the target
    /// room has accepted the caller, with no room lock held.
    async fn leave_current(&self, conn_id: &str) -> AppResult<()> {
        if self.store.get_user(conn_id).await?.is_some() {
            self.leave_room(conn_id).await?;
        }
        Ok(())
    }

    /// Membership removal with the room lock already held.
    async fn remove_locked(&self, conn_id: &str, room_id: &str) -> AppResult<()> {
        self.store.delete_user(conn_id).await?;
        self.bridge.leave_room(room_id, conn_id);

        let Some(mut room) = self.store.get_room(room_id).await? else {
            return Ok(());
        };
        if room.remove_member(conn_id).is_none() {
            return Ok(());
        }

        if room.members.is_empty() {
            self.destroy_locked(&room).await?;
            info!(room_id = %room_id, "Last member left, room destroyed");
            return Ok(());
        }

        room.touch(Utc::now());
        self.commit(&room).await?;
        info!(room_id = %room_id, conn_id = %conn_id, host_id = %room.host_id, "User left room");
        self.emit_state(&room).await;
        Ok(())
    }

    /// Delete the room and everything hanging off it. Caller holds the lock.
    pub(crate) async fn destroy_locked(&self, room: &Room) -> AppResult<()> {
        for member_id in room.members.keys() {
            self.store.delete_user(member_id).await?;
        }
        self.store.delete_room(&room.id).await?;
        self.auctions.abort(&room.id).await;
        self.bridge.close_room(&room.id);
        Ok(())
    }

    /// Persist the room and every member record.
    async fn commit(&self, room: &Room) -> AppResult<()> {
        self.store.save_room(room).await?;
        for member in room.members.values() {
            self.store.save_user(member).await?;
        }
        Ok(())
    }

    async fn emit_state(&self, room: &Room) {
        self.bridge
            .emit(&room.id, &OutboundMessage::RoomStateUpdate(room.snapshot()))
            .await;
    }

    /// Send the item on the block to a late joiner.
    async fn replay_auction(&self, room_id: &str, conn_id: &str) {
        let Some(snapshot) = self.auctions.snapshot(room_id).await else {
            return;
        };
        if snapshot.phase != AuctionPhase::OnBlock {
            return;
        }
        let (Some(position), Some(item)) = (snapshot.position, snapshot.item) else {
            return;
        };
        self.bridge
            .send_to(
                conn_id,
                &OutboundMessage::AuctionPlayer {
                    position: position.clone(),
                    item: item.clone(),
                },
            )
            .await;
        self.bridge
            .send_to(
                conn_id,
                &OutboundMessage::BidHistory {
                    position,
                    item,
                    bids: snapshot.bids,
                },
            )
            .await;
    }
}

/// Marks a room `Finished` once its auction has closed the last item.
///
/// Skips rooms that are gone, no longer `InProgress`, or already running a
/// newer auction by the time the room lock is taken.
fn finish_on_complete(
    store: Arc<dyn StateStore>,
    bridge: Arc<BroadcastBridge>,
    auctions: Weak<AuctionEngine>,
    locks: RoomLocks,
) -> CompletionHook {
    Arc::new(move |room_id: String| -> BoxFuture<'static, ()> {
        let store = Arc::clone(&store);
        let bridge = Arc::clone(&bridge);
        let auctions = auctions.clone();
        let locks = locks.clone();
        Box::pin(async move {
            let _guard = locks.acquire(&room_id).await;
            let mut room = match store.get_room(&room_id).await {
                Ok(Some(room)) => room,
                Ok(None) => return,
                Err(e) => {
                    warn!(room_id = %room_id, error = %e, "Failed to load room after auction");
                    return;
                }
            };
            if room.status != RoomStatus::InProgress {
                return;
            }
            let Some(auctions) = auctions.upgrade() else {
                return;
            };
            if auctions.is_running(&room_id).await {
                return;
            }

            room.status = RoomStatus::Finished;
            if let Err(e) = store.save_room(&room).await {
                warn!(room_id = %room_id, error = %e, "Failed to mark room finished");
                return;
            }
            info!(room_id = %room_id, "Auction over, room finished");
            bridge
                .emit(&room.id, &OutboundMessage::RoomStateUpdate(room.snapshot()))
                .await;
        })
    })
}
