//! Inbound frame dispatch.

use std::sync::Arc;

use tracing::{debug, info, warn};

use touchline_core::config::realtime::RealtimeConfig;
use touchline_core::{AppError, AppResult, ErrorKind};
use touchline_realtime::BroadcastBridge;
use touchline_realtime::message::serializer::decode_inbound;
use touchline_realtime::message::{InboundMessage, OutboundMessage};

use crate::room::RoomEngine;

/// Routes decoded client requests to the room engine.
///
/// Undecodable frames and engine rejections are logged and dropped; the
/// connection stays open. With `error_replies` enabled the caller also gets
/// an `error` frame, except for `NotFound`, which always stays silent.
#[derive(Debug, Clone)]
pub struct EventRouter {
    rooms: Arc<RoomEngine>,
    bridge: Arc<BroadcastBridge>,
    config: RealtimeConfig,
}

impl EventRouter {
    /// Creates a new router.
    pub fn new(rooms: Arc<RoomEngine>, bridge: Arc<BroadcastBridge>, config: RealtimeConfig) -> Self {
        Self {
            rooms,
            bridge,
            config,
        }
    }

    /// Handles one text frame from `conn_id`.
    pub async fn dispatch(&self, conn_id: &str, raw: &str) {
        let message = match decode_inbound(raw, self.config.max_message_size) {
            Ok(m) => m,
            Err(e) => {
                debug!(conn_id = %conn_id, error = %e, "Dropping undecodable frame");
                self.reply_error(conn_id, &e).await;
                return;
            }
        };

        let tag = message.tag();
        if let Err(e) = self.route(conn_id, message).await {
            match (tag, e.kind) {
                ("joinRoom", _) => info!(conn_id = %conn_id, error = %e, "Join rejected"),
                ("startAuction", _) => warn!(conn_id = %conn_id, error = %e, "Auction start failed"),
                (_, ErrorKind::Store) => warn!(conn_id = %conn_id, event = tag, error = %e, "Store failure"),
                _ => debug!(conn_id = %conn_id, event = tag, error = %e, "Request rejected"),
            }
            self.reply_error(conn_id, &e).await;
        }
    }

    /// Runs the leave flow for a closed connection.
    pub async fn disconnect(&self, conn_id: &str) {
        if let Err(e) = self.rooms.disconnect(conn_id).await {
            warn!(conn_id = %conn_id, error = %e, "Disconnect cleanup failed");
        }
    }

    async fn route(&self, conn_id: &str, message: InboundMessage) -> AppResult<()> {
        match message {
            InboundMessage::CreateRoom(p) => self.rooms.create_room(conn_id, p).await.map(drop),
            InboundMessage::JoinRoom(p) => self.rooms.join_room(conn_id, p).await.map(drop),
            InboundMessage::LeaveRoom(_) => self.rooms.leave_room(conn_id).await,
            InboundMessage::SetSettings(settings) => self.rooms.set_settings(conn_id, settings).await,
            InboundMessage::ChatMessage(p) => self.rooms.chat(conn_id, &p.message).await.map(drop),
            InboundMessage::SetReady(p) => self.rooms.set_ready(conn_id, p.ready).await,
            InboundMessage::GetChatHistory(_) => self.rooms.chat_history(conn_id).await.map(drop),
            InboundMessage::GetRoomAnalytics(_) => self.rooms.analytics(conn_id).await.map(drop),
            InboundMessage::KickUser(p) => self.rooms.kick_user(conn_id, &p.user_id).await,
            InboundMessage::TransferHost(p) => self.rooms.transfer_host(conn_id, &p.new_host_id).await,
            InboundMessage::StartPhase(p) => self.rooms.start_phase(conn_id, &p.phase).await.map(drop),
            InboundMessage::ListRooms(_) => self.rooms.list_rooms(conn_id).await.map(drop),
            InboundMessage::StartAuction(p) => self.rooms.start_auction(conn_id, &p.lots).await,
            InboundMessage::PlaceBid(p) => {
                let accepted = self.rooms.place_bid(conn_id, p.amount).await?;
                debug!(conn_id = %conn_id, amount = p.amount, accepted = accepted, "Bid processed");
                Ok(())
            }
        }
    }

    async fn reply_error(&self, conn_id: &str, err: &AppError) {
        if !self.config.error_replies || err.is_not_found() {
            return;
        }
        self.bridge
            .send_to(conn_id, &OutboundMessage::from_error(err))
            .await;
    }
}
