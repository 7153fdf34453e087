//! Per-room auction state.

use serde::Serialize;
use tokio::task::JoinHandle;

use touchline_entity::Player;
use touchline_realtime::message::outbound::BidEntry;

/// Where an auction stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AuctionPhase {
    /// One item is open for bids.
    OnBlock,
    /// The window closed and the sale is being recorded.
    Finalizing,
    /// Every lot is exhausted.
    Complete,
}

/// Items of one category, auctioned in order.
#[derive(Debug, Clone)]
pub struct PositionLot {
    /// Category label (`"ANY"` for unfiltered lots).
    pub position: String,
    pub items: Vec<Player>,
    /// Index of the item on the block.
    pub cursor: usize,
}

/// Mutable auction state for one room.
///
/// `current_bid` is always the highest amount in `bids`, or 0 when `bids`
/// is empty. `item_seq` changes every time a new item goes on the block.
#[derive(Debug)]
pub struct AuctionState {
    pub room_id: String,
    pub lots: Vec<PositionLot>,
    pub lot_cursor: usize,
    pub current_bid: u64,
    /// Empty when nobody has bid.
    pub current_bidder: String,
    pub bids: Vec<BidEntry>,
    pub phase: AuctionPhase,
    pub item_seq: u64,
    pub(crate) timer: Option<JoinHandle<()>>,
}

impl AuctionState {
    /// Fresh state positioned on the first item of the first lot.
    pub fn new(room_id: impl Into<String>, lots: Vec<PositionLot>) -> Self {
        Self {
            room_id: room_id.into(),
            lots,
            lot_cursor: 0,
            current_bid: 0,
            current_bidder: String::new(),
            bids: Vec::new(),
            phase: AuctionPhase::OnBlock,
            item_seq: 0,
            timer: None,
        }
    }

    /// Category label and item currently on the block.
    pub fn current(&self) -> Option<(&str, &Player)> {
        let lot = self.lots.get(self.lot_cursor)?;
        let item = lot.items.get(lot.cursor)?;
        Some((lot.position.as_str(), item))
    }

    /// Move to the next item of the lot, else the first item of the next
    /// non-empty lot. Returns `false` once everything is exhausted.
    pub fn advance(&mut self) -> bool {
        if let Some(lot) = self.lots.get_mut(self.lot_cursor) {
            lot.cursor += 1;
            if lot.cursor < lot.items.len() {
                return true;
            }
        }
        loop {
            self.lot_cursor += 1;
            match self.lots.get(self.lot_cursor) {
                Some(lot) if !lot.items.is_empty() => return true,
                Some(_) => continue,
                None => return false,
            }
        }
    }

    /// Clear the bid slate for a new item.
    pub fn reset_bids(&mut self) {
        self.current_bid = 0;
        self.current_bidder.clear();
        self.bids.clear();
    }

    /// Abort the pending expiry timer, if any.
    pub fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    /// Read-only view.
    pub fn snapshot(&self) -> AuctionSnapshot {
        let current = self.current();
        AuctionSnapshot {
            room_id: self.room_id.clone(),
            phase: self.phase,
            item_seq: self.item_seq,
            lot_index: self.lot_cursor,
            position: current.map(|(p, _)| p.to_string()),
            item: current.map(|(_, i)| i.clone()),
            current_bid: self.current_bid,
            current_bidder: self.current_bidder.clone(),
            bids: self.bids.clone(),
        }
    }
}

/// Point-in-time copy of an auction, used for late joiners and diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionSnapshot {
    pub room_id: String,
    pub phase: AuctionPhase,
    pub item_seq: u64,
    pub lot_index: usize,
    pub position: Option<String>,
    pub item: Option<Player>,
    pub current_bid: u64,
    pub current_bidder: String,
    pub bids: Vec<BidEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lot(position: &str, names: &[&str]) -> PositionLot {
        PositionLot {
            position: position.to_string(),
            items: names.iter().map(|n| Player::new(*n, position)).collect(),
            cursor: 0,
        }
    }

    #[test]
    fn test_advance_walks_lots_in_order() {
        let mut state = AuctionState::new("r1", vec![lot("GK", &["g1"]), lot("DEF", &["d1", "d2"])]);
        assert_eq!(state.current().map(|(_, p)| p.name.as_str()), Some("g1"));
        assert!(state.advance());
        assert_eq!(state.current().map(|(pos, p)| (pos, p.name.as_str())), Some(("DEF", "d1")));
        assert!(state.advance());
        assert_eq!(state.current().map(|(_, p)| p.name.as_str()), Some("d2"));
        assert!(!state.advance());
        assert!(state.current().is_none());
    }

    #[test]
    fn test_advance_skips_empty_lots() {
        let mut state = AuctionState::new("r1", vec![lot("GK", &["g1"]), lot("MID", &[]), lot("ST", &["s1"])]);
        assert!(state.advance());
        assert_eq!(state.current().map(|(pos, _)| pos), Some("ST"));
    }
}
