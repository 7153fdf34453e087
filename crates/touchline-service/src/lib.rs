//! # touchline-service
//!
//! The state engines behind a Touchline room:
//!
//! - [`RoomEngine`] runs every room mutation as lock, load, check, mutate,
//!   persist, emit
//! - [`AuctionEngine`] drives the timed per-room bidding state machine
//! - [`EventRouter`] decodes client frames and dispatches them
//!
//! Engines are built once and shared through `Arc`.

pub mod auction;
pub mod room;
pub mod router;

pub use auction::{AuctionEngine, AuctionPhase, AuctionSnapshot};
pub use room::RoomEngine;
pub use router::EventRouter;
