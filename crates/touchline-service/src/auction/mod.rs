//! Timed sequential auction.

pub mod service;
pub mod state;

pub use service::{AuctionEngine, CompletionHook};
pub use state::{AuctionPhase, AuctionSnapshot, AuctionState, PositionLot};
