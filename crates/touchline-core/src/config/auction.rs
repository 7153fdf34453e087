//! Auction timing configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Auction engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionConfig {
    /// Fixed bidding window per item. Late bids never extend it.
    #[serde(default = "default_bid_window")]
    pub bid_window_seconds: u64,
}

impl AuctionConfig {
    /// The bidding window as a [`Duration`].
    pub fn bid_window(&self) -> Duration {
        Duration::from_secs(self.bid_window_seconds)
    }
}

impl Default for AuctionConfig {
    fn default() -> Self {
        Self {
            bid_window_seconds: default_bid_window(),
        }
    }
}

fn default_bid_window() -> u64 {
    10
}
