//! File-backed player catalog.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use tracing::info;

use touchline_core::{AppError, AppResult, ErrorKind};
use touchline_entity::Player;

use crate::traits::Catalog;

/// Catalog loaded once from a JSON array of players.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    players: Arc<Vec<Player>>,
}

impl FileCatalog {
    /// Read and parse the catalog at `path`.
    pub async fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Catalog,
                format!("Failed to read catalog '{}'", path.display()),
                e,
            )
        })?;
        let players: Vec<Player> = serde_json::from_str(&raw).map_err(|e| {
            AppError::with_source(
                ErrorKind::Catalog,
                format!("Failed to parse catalog '{}'", path.display()),
                e,
            )
        })?;
        info!(path = %path.display(), players = players.len(), "Player catalog loaded");
        Ok(Self::from_players(players))
    }

    /// Build a catalog from players already in memory.
    pub fn from_players(players: Vec<Player>) -> Self {
        Self {
            players: Arc::new(players),
        }
    }

    /// Number of players in the catalog.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether the catalog holds no players.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[async_trait]
impl Catalog for FileCatalog {
    async fn fetch_random(&self, count: usize) -> AppResult<Vec<Player>> {
        let mut rng = rand::thread_rng();
        Ok(self
            .players
            .choose_multiple(&mut rng, count)
            .cloned()
            .collect())
    }

    async fn fetch_random_by_position(&self, position: &str, count: usize) -> AppResult<Vec<Player>> {
        let matching: Vec<&Player> = self.players.iter().filter(|p| p.plays(position)).collect();
        let mut rng = rand::thread_rng();
        Ok(matching
            .choose_multiple(&mut rng, count)
            .map(|p| (*p).clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn make_catalog() -> FileCatalog {
        FileCatalog::from_players(vec![
            Player::new("Keeper A", "GK"),
            Player::new("Keeper B", "GK"),
            Player::new("Back A", "CB"),
            Player::new("Back B", "CB"),
            Player::new("Back C", "CB"),
            Player::new("Striker", "ST"),
        ])
    }

    #[tokio::test]
    async fn test_fetch_random_is_distinct_and_bounded() {
        let catalog = make_catalog();
        let picked = catalog.fetch_random(4).await.unwrap();
        assert_eq!(picked.len(), 4);
        let names: HashSet<_> = picked.iter().map(|p| p.name.clone()).collect();
        assert_eq!(names.len(), 4);

        assert_eq!(catalog.fetch_random(50).await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_fetch_by_position_filters() {
        let catalog = make_catalog();
        let backs = catalog.fetch_random_by_position("cb", 2).await.unwrap();
        assert_eq!(backs.len(), 2);
        assert!(backs.iter().all(|p| p.position == "CB"));
        assert!(catalog.fetch_random_by_position("LW", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_file_is_catalog_error() {
        let err = FileCatalog::load("/definitely/not/here.json").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Catalog);
    }
}
