//! In-memory team ledger.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use touchline_core::AppResult;
use touchline_entity::Player;

use crate::keys;
use crate::traits::TeamLedger;

/// Team lists keyed by room and user.
#[derive(Debug, Clone, Default)]
pub struct MemoryTeamLedger {
    teams: Arc<DashMap<String, Vec<Player>>>,
}

impl MemoryTeamLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TeamLedger for MemoryTeamLedger {
    async fn credit_item(&self, room_id: &str, user_id: &str, player: &Player) -> AppResult<()> {
        self.teams
            .entry(keys::team(room_id, user_id))
            .or_default()
            .push(player.clone());
        Ok(())
    }

    async fn team(&self, room_id: &str, user_id: &str) -> AppResult<Vec<Player>> {
        Ok(self
            .teams
            .get(&keys::team(room_id, user_id))
            .map(|t| t.value().clone())
            .unwrap_or_default())
    }
}
