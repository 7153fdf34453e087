//! Store manager that wires the configured backends.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use touchline_core::AppResult;
use touchline_core::config::store::{StoreConfig, StoreProvider};
use touchline_entity::{Room, User};

use crate::traits::{PubSubRelay, StateStore, TeamLedger};

/// Holds the state store, team ledger and optional relay chosen by
/// configuration.
#[derive(Debug, Clone)]
pub struct StoreManager {
    state: Arc<dyn StateStore>,
    ledger: Arc<dyn TeamLedger>,
    relay: Option<Arc<dyn PubSubRelay>>,
}

impl StoreManager {
    /// Build the backends named by `config`. `relay_buffer` sizes relay
    /// subscription queues.
    pub async fn new(config: &StoreConfig, relay_buffer: usize) -> AppResult<Self> {
        match config.provider {
            #[cfg(feature = "redis-backend")]
            StoreProvider::Redis => {
                info!("Initializing Redis state store");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                let relay: Option<Arc<dyn PubSubRelay>> = if config.relay.enabled {
                    info!("Redis relay enabled");
                    Some(Arc::new(crate::redis::RedisRelay::new(client.clone(), relay_buffer)))
                } else {
                    None
                };
                Ok(Self {
                    state: Arc::new(crate::redis::RedisStateStore::new(client.clone())),
                    ledger: Arc::new(crate::redis::RedisTeamLedger::new(client)),
                    relay,
                })
            }
            #[cfg(feature = "memory")]
            StoreProvider::Memory => {
                info!("Initializing in-memory state store");
                if config.relay.enabled {
                    warn!("Relay requires the redis provider; running without one");
                }
                Ok(Self {
                    state: Arc::new(crate::memory::MemoryStateStore::new()),
                    ledger: Arc::new(crate::memory::MemoryTeamLedger::new()),
                    relay: None,
                })
            }
            #[allow(unreachable_patterns)]
            other => Err(touchline_core::AppError::configuration(format!(
                "Store provider '{other:?}' is not compiled in"
            ))),
        }
    }

    /// Assemble a manager from existing backends (for testing).
    pub fn from_parts(
        state: Arc<dyn StateStore>,
        ledger: Arc<dyn TeamLedger>,
        relay: Option<Arc<dyn PubSubRelay>>,
    ) -> Self {
        Self {
            state,
            ledger,
            relay,
        }
    }

    /// In-memory state and ledger, no relay.
    #[cfg(feature = "memory")]
    pub fn in_memory() -> Self {
        Self::from_parts(
            Arc::new(crate::memory::MemoryStateStore::new()),
            Arc::new(crate::memory::MemoryTeamLedger::new()),
            None,
        )
    }

    /// Shared handle to the state store.
    pub fn state(&self) -> Arc<dyn StateStore> {
        Arc::clone(&self.state)
    }

    /// Shared handle to the team ledger.
    pub fn ledger(&self) -> Arc<dyn TeamLedger> {
        Arc::clone(&self.ledger)
    }

    /// The relay, when enabled.
    pub fn relay(&self) -> Option<Arc<dyn PubSubRelay>> {
        self.relay.clone()
    }
}

#[async_trait]
impl StateStore for StoreManager {
    async fn get_room(&self, room_id: &str) -> AppResult<Option<Room>> {
        self.state.get_room(room_id).await
    }

    async fn save_room(&self, room: &Room) -> AppResult<()> {
        self.state.save_room(room).await
    }

    async fn delete_room(&self, room_id: &str) -> AppResult<()> {
        self.state.delete_room(room_id).await
    }

    async fn list_rooms(&self) -> AppResult<Vec<Room>> {
        self.state.list_rooms().await
    }

    async fn get_user(&self, user_id: &str) -> AppResult<Option<User>> {
        self.state.get_user(user_id).await
    }

    async fn save_user(&self, user: &User) -> AppResult<()> {
        self.state.save_user(user).await
    }

    async fn delete_user(&self, user_id: &str) -> AppResult<()> {
        self.state.delete_user(user_id).await
    }
}
