//! Route definitions for the Touchline HTTP API.

use axum::{Router, routing::get};

use crate::handlers;
use crate::state::AppState;

/// Build the router with all routes, threading `AppState` through them.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/rooms", get(handlers::rooms::list_rooms))
        .route("/rooms/{room_id}", get(handlers::rooms::get_room))
        .route(
            "/rooms/{room_id}/teams/{user_id}",
            get(handlers::rooms::get_team),
        );

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(handlers::ws::ws_upgrade))
        .with_state(state)
}
