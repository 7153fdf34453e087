//! WebSocket upgrade handler.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{info, warn};

use touchline_core::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for the WebSocket endpoint.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsQuery {
    /// Client-chosen id, used as both connection and user id.
    pub user_id: String,
}

/// GET /ws?userId={id}
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    let user_id = query.user_id.trim().to_string();
    if user_id.is_empty() {
        return Err(AppError::validation("userId is required").into());
    }

    let max_size = state.config.realtime.max_message_size;
    Ok(ws
        .max_message_size(max_size)
        .on_upgrade(move |socket| handle_ws_connection(state, user_id, socket)))
}

/// Runs one established connection until either side goes away.
async fn handle_ws_connection(state: AppState, user_id: String, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let hub = &state.realtime.hub;

    let (handle, mut outbound_rx) = hub.register(user_id).await;
    let cancel = handle.cancellation();

    // Writer: drains the bounded queue until the hub closes the handle
    let writer_cancel = cancel.clone();
    let writer = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = writer_cancel.cancelled() => break,
                frame = outbound_rx.recv() => match frame {
                    Some(text) => {
                        if ws_tx.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }
        let _ = ws_tx.close().await;
    });

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            next = ws_rx.next() => match next {
                Some(Ok(Message::Text(text))) => {
                    state.events.dispatch(&handle.id, text.as_str()).await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(conn_id = %handle.id, error = %e, "WebSocket error");
                    break;
                }
            },
        }
    }

    hub.unregister(&handle).await;
    let _ = writer.await;

    // a replacement connection keeps the membership
    if !handle.is_replaced() {
        state.events.disconnect(&handle.id).await;
    }

    info!(conn_id = %handle.id, replaced = handle.is_replaced(), "WebSocket connection closed");
}
