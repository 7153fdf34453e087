#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use touchline_api::{AppState, build_app};
use touchline_core::config::AppConfig;
use touchline_entity::Player;
use touchline_store::{FileCatalog, StoreManager};

pub type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub fn state() -> AppState {
    let catalog = FileCatalog::from_players(vec![Player::new("Keeper", "GK")]);
    AppState::new(AppConfig::default(), &StoreManager::in_memory(), Arc::new(catalog))
}

pub async fn serve(state: AppState) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_app(state)).await.unwrap();
    });
    addr
}

pub async fn connect(addr: SocketAddr, user_id: &str) -> Socket {
    let (socket, _) = connect_async(format!("ws://{addr}/ws?userId={user_id}"))
        .await
        .unwrap();
    socket
}

/// Next text frame as JSON, failing after a few seconds.
pub async fn next_json(socket: &mut Socket) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket ended")
            .expect("socket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Next frame of type `event`, skipping others.
pub async fn next_of(socket: &mut Socket, event: &str) -> Value {
    loop {
        let frame = next_json(socket).await;
        if frame["type"] == event {
            return frame;
        }
    }
}
