//! Messages pushed to clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use touchline_core::AppError;
use touchline_entity::room::RoomSummary;
use touchline_entity::{ChatMessage, Player, RoomSnapshot};

/// Every event the server emits, on the same `{type, payload}` envelope
/// clients use for requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum OutboundMessage {
    /// Full room state after any membership or settings change.
    RoomStateUpdate(RoomSnapshot),
    /// A newly posted chat line.
    ChatMessage(ChatMessage),
    /// Reply to `getChatHistory`.
    GetChatHistory { messages: Vec<ChatMessage> },
    /// Reply to `getRoomAnalytics`.
    GetRoomAnalytics {
        room_id: String,
        total_messages: usize,
        total_users: usize,
    },
    /// A player went on the block.
    AuctionPlayer { position: String, item: Player },
    /// Bids on the player currently on the block.
    BidHistory {
        position: String,
        item: Player,
        bids: Vec<BidEntry>,
    },
    /// The window closed. An empty `winner` with `bid == 0` means unsold.
    PlayerSold {
        position: String,
        item: Player,
        winner: String,
        bid: u64,
    },
    /// Every lot has been auctioned.
    AuctionComplete { room_id: String },
    /// Reply to `listRooms`.
    ListRooms { rooms: Vec<RoomSummary> },
    /// Sent privately to a user removed by the host.
    Kicked { room_id: String },
    /// The room no longer exists.
    RoomClosed { room_id: String, reason: String },
    /// Request rejected (only when error replies are enabled).
    Error { code: String, message: String },
}

impl OutboundMessage {
    /// Error frame describing `err`.
    pub fn from_error(err: &AppError) -> Self {
        Self::Error {
            code: err.kind.code().to_string(),
            message: err.message.clone(),
        }
    }

    /// Wire tag, for logging.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::RoomStateUpdate(_) => "roomStateUpdate",
            Self::ChatMessage(_) => "chatMessage",
            Self::GetChatHistory { .. } => "getChatHistory",
            Self::GetRoomAnalytics { .. } => "getRoomAnalytics",
            Self::AuctionPlayer { .. } => "auctionPlayer",
            Self::BidHistory { .. } => "bidHistory",
            Self::PlayerSold { .. } => "playerSold",
            Self::AuctionComplete { .. } => "auctionComplete",
            Self::ListRooms { .. } => "listRooms",
            Self::Kicked { .. } => "kicked",
            Self::RoomClosed { .. } => "roomClosed",
            Self::Error { .. } => "error",
        }
    }
}

/// One accepted bid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidEntry {
    pub user_id: String,
    pub amount: u64,
    pub timestamp: DateTime<Utc>,
}
