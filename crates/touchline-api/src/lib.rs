//! # touchline-api
//!
//! HTTP API layer for Touchline built on Axum.
//!
//! Serves the WebSocket endpoint every room and auction event flows
//! through, a handful of read-only REST routes, error mapping, and the
//! server bootstrap that wires stores, engines and the room reaper.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use state::AppState;
