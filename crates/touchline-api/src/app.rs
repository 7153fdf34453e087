//! Application builder and server bootstrap.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::trace::TraceLayer;

use touchline_core::AppResult;
use touchline_core::config::AppConfig;
use touchline_core::error::AppError;
use touchline_store::{Catalog, FileCatalog, StoreManager};
use touchline_worker::{CronScheduler, RoomReaper};

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server);
    build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Runs the Touchline server until Ctrl+C.
pub async fn run_server(config: AppConfig) -> AppResult<()> {
    tracing::info!("Starting Touchline v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Stores ───────────────────────────────────────────
    tracing::info!("Initializing store (provider: {:?})...", config.store.provider);
    let store = StoreManager::new(&config.store, config.realtime.channel_buffer_size).await?;

    // ── Step 2: Player catalog ───────────────────────────────────
    let catalog = FileCatalog::load(&config.catalog.path).await?;
    tracing::info!("Loaded {} players from '{}'", catalog.len(), config.catalog.path);
    let catalog: Arc<dyn Catalog> = Arc::new(catalog);

    // ── Step 3: Engines ──────────────────────────────────────────
    let state = AppState::new(config.clone(), &store, catalog);
    let relay_task = state.realtime.spawn_relay();

    // ── Step 4: Scheduler ────────────────────────────────────────
    let mut scheduler = CronScheduler::new().await?;
    scheduler
        .register_room_sweep(
            RoomReaper::new(Arc::clone(&state.rooms)),
            Duration::from_secs(config.room.sweep_interval_seconds),
        )
        .await?;
    scheduler.start().await?;

    // ── Step 5: HTTP server ──────────────────────────────────────
    let realtime = Arc::clone(&state.realtime);
    let app = build_app(state);
    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Touchline server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // ── Shutdown ─────────────────────────────────────────────────
    if let Err(e) = scheduler.shutdown().await {
        tracing::warn!("Scheduler shutdown failed: {}", e);
    }
    realtime.shutdown().await;
    relay_task.abort();

    tracing::info!("Touchline server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
