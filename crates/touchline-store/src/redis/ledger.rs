//! Redis-backed team ledger.

use async_trait::async_trait;
use redis::AsyncCommands;

use touchline_core::AppResult;
use touchline_entity::Player;

use super::client::RedisClient;
use super::map_err;
use crate::keys;
use crate::traits::TeamLedger;

/// Teams stored as Redis lists of JSON players.
#[derive(Debug, Clone)]
pub struct RedisTeamLedger {
    client: RedisClient,
}

impl RedisTeamLedger {
    /// Create a ledger on an established client.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TeamLedger for RedisTeamLedger {
    async fn credit_item(&self, room_id: &str, user_id: &str, player: &Player) -> AppResult<()> {
        let key = self.client.prefixed_key(&keys::team(room_id, user_id));
        let payload = serde_json::to_string(player)?;
        let mut conn = self.client.conn_mut();
        let _: i64 = conn.rpush(&key, payload).await.map_err(map_err)?;
        Ok(())
    }

    async fn team(&self, room_id: &str, user_id: &str) -> AppResult<Vec<Player>> {
        let key = self.client.prefixed_key(&keys::team(room_id, user_id));
        let mut conn = self.client.conn_mut();
        let raw: Vec<String> = conn.lrange(&key, 0, -1).await.map_err(map_err)?;
        raw.iter()
            .map(|item| serde_json::from_str(item).map_err(Into::into))
            .collect()
    }
}
