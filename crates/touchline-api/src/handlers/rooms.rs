//! Read-only room and team handlers.

use axum::Json;
use axum::extract::{Path, State};

use touchline_core::AppError;
use touchline_entity::{Player, RoomSnapshot};
use touchline_entity::room::RoomSummary;
use touchline_store::TeamLedger;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/rooms
pub async fn list_rooms(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<RoomSummary>>>, ApiError> {
    let rooms = state.rooms.public_rooms().await?;
    Ok(Json(ApiResponse::ok(rooms)))
}

/// GET /api/rooms/{room_id}
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<ApiResponse<RoomSnapshot>>, ApiError> {
    let room = state
        .rooms
        .room(&room_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Room '{room_id}' not found")))?;
    Ok(Json(ApiResponse::ok(room)))
}

/// GET /api/rooms/{room_id}/teams/{user_id}
pub async fn get_team(
    State(state): State<AppState>,
    Path((room_id, user_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<Vec<Player>>>, ApiError> {
    let team = state.ledger.team(&room_id, &user_id).await?;
    Ok(Json(ApiResponse::ok(team)))
}
