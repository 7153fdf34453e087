//! Redis backends.

pub mod client;
pub mod ledger;
pub mod relay;
pub mod state;

pub use client::RedisClient;
pub use ledger::RedisTeamLedger;
pub use relay::RedisRelay;
pub use state::RedisStateStore;

use touchline_core::{AppError, ErrorKind};

/// Map a Redis error to an AppError.
pub(crate) fn map_err(e: redis::RedisError) -> AppError {
    AppError::with_source(ErrorKind::Store, format!("Redis error: {e}"), e)
}
