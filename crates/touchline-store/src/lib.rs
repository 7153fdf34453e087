//! # touchline-store
//!
//! Backends for the authoritative room/user state and its companions:
//!
//! - **memory**: in-process `DashMap` stores and a broadcast-channel relay
//! - **redis**: JSON values in Redis plus `PUBLISH`/`PSUBSCRIBE` relay
//!
//! The backend is chosen from [`StoreConfig`](touchline_core::config::store::StoreConfig)
//! when the [`StoreManager`] is built. The player catalog is file backed.

pub mod catalog;
pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;
pub mod traits;

pub use catalog::FileCatalog;
pub use provider::StoreManager;
pub use traits::{Catalog, PubSubRelay, RelayMessage, StateStore, TeamLedger};
