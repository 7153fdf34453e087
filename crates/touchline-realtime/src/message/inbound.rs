//! Messages sent by clients.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use touchline_entity::RoomSettings;

/// Every request a client can make.
///
/// Adjacently tagged: `{"type": "joinRoom", "payload": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum InboundMessage {
    CreateRoom(CreateRoomPayload),
    JoinRoom(JoinRoomPayload),
    LeaveRoom(EmptyPayload),
    SetSettings(RoomSettings),
    ChatMessage(ChatPayload),
    SetReady(SetReadyPayload),
    GetChatHistory(EmptyPayload),
    GetRoomAnalytics(EmptyPayload),
    KickUser(KickUserPayload),
    TransferHost(TransferHostPayload),
    StartPhase(StartPhasePayload),
    ListRooms(EmptyPayload),
    StartAuction(StartAuctionPayload),
    PlaceBid(PlaceBidPayload),
}

impl InboundMessage {
    /// Wire tag, for logging.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::CreateRoom(_) => "createRoom",
            Self::JoinRoom(_) => "joinRoom",
            Self::LeaveRoom(_) => "leaveRoom",
            Self::SetSettings(_) => "setSettings",
            Self::ChatMessage(_) => "chatMessage",
            Self::SetReady(_) => "setReady",
            Self::GetChatHistory(_) => "getChatHistory",
            Self::GetRoomAnalytics(_) => "getRoomAnalytics",
            Self::KickUser(_) => "kickUser",
            Self::TransferHost(_) => "transferHost",
            Self::StartPhase(_) => "startPhase",
            Self::ListRooms(_) => "listRooms",
            Self::StartAuction(_) => "startAuction",
            Self::PlaceBid(_) => "placeBid",
        }
    }

    /// Field-level validation of the payload.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            Self::CreateRoom(p) => p.validate(),
            Self::JoinRoom(p) => p.validate(),
            Self::ChatMessage(p) => p.validate(),
            Self::KickUser(p) => p.validate(),
            Self::TransferHost(p) => p.validate(),
            Self::StartPhase(p) => p.validate(),
            Self::StartAuction(p) => p.validate(),
            Self::PlaceBid(p) => p.validate(),
            Self::LeaveRoom(_)
            | Self::SetSettings(_)
            | Self::SetReady(_)
            | Self::GetChatHistory(_)
            | Self::GetRoomAnalytics(_)
            | Self::ListRooms(_) => Ok(()),
        }
    }
}

/// Payload-less request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmptyPayload {}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomPayload {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(length(min = 1, max = 64))]
    pub room_id: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub private: bool,
    /// Initial settings. `password`/`private` above take precedence.
    #[serde(default)]
    pub settings: Option<RoomSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomPayload {
    #[validate(length(min = 1, max = 64))]
    pub room_id: String,
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub reconnect_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChatPayload {
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetReadyPayload {
    pub ready: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct KickUserPayload {
    #[validate(length(min = 1))]
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TransferHostPayload {
    #[validate(length(min = 1))]
    pub new_host_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StartPhasePayload {
    #[validate(length(min = 1, max = 32))]
    pub phase: String,
}

/// One lot of an auction: `count` players of `position`, or of any
/// position when it is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct LotRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 16))]
    pub position: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StartAuctionPayload {
    #[validate(length(min = 1, max = 32), nested)]
    pub lots: Vec<LotRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PlaceBidPayload {
    #[validate(range(min = 1))]
    pub amount: u64,
}
