//! In-memory player repository for tests and development.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::{PlayerRepository, StorageError};
use crate::models::{Player, PlayerInput};

struct Inner {
    players: BTreeMap<i64, Player>,
    next_id: i64,
}

/// Map-backed repository with the same semantics as the SQLite store.
/// Data lives for the lifetime of the process.
pub struct InMemoryPlayerRepository {
    inner: Mutex<Inner>,
}

impl Default for InMemoryPlayerRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPlayerRepository {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                players: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Pre-populate the repository, assigning ids in order.
    pub fn with_players(inputs: Vec<PlayerInput>) -> Self {
        let repo = Self::new();
        {
            let mut inner = repo.inner.lock().unwrap();
            for input in inputs {
                let id = inner.next_id;
                inner.next_id += 1;
                inner.players.insert(id, Player::from_input(id, &input));
            }
        }
        repo
    }
}

#[async_trait]
impl PlayerRepository for InMemoryPlayerRepository {
    async fn list(&self) -> Result<Vec<Player>, StorageError> {
        let inner = self.inner.lock().unwrap();
        let mut players: Vec<Player> = inner.players.values().cloned().collect();
        players.sort_by(|a, b| a.ign.to_lowercase().cmp(&b.ign.to_lowercase()));
        Ok(players)
    }

    async fn get(&self, id: i64) -> Result<Option<Player>, StorageError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.players.get(&id).cloned())
    }

    async fn get_by_ign(&self, ign: &str) -> Result<Option<Player>, StorageError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.players.values().find(|p| p.ign == ign).cloned())
    }

    async fn create(&self, input: &PlayerInput) -> Result<Player, StorageError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.players.values().any(|p| p.ign == input.ign) {
            return Err(StorageError::DuplicateIgn(input.ign.clone()));
        }

        let id = inner.next_id;
        inner.next_id += 1;
        let player = Player::from_input(id, input);
        inner.players.insert(id, player.clone());
        Ok(player)
    }

    async fn update(&self, id: i64, input: &PlayerInput) -> Result<Player, StorageError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.players.contains_key(&id) {
            return Err(StorageError::NotFound);
        }
        if inner
            .players
            .values()
            .any(|p| p.id != id && p.ign == input.ign)
        {
            return Err(StorageError::DuplicateIgn(input.ign.clone()));
        }

        let mut player = Player::from_input(id, input);
        player.last_updated = Some(Utc::now());
        inner.players.insert(id, player.clone());
        Ok(player)
    }

    async fn upsert(&self, input: &PlayerInput) -> Result<Player, StorageError> {
        let existing_id = {
            let inner = self.inner.lock().unwrap();
            inner
                .players
                .values()
                .find(|p| p.ign == input.ign)
                .map(|p| p.id)
        };

        match existing_id {
            Some(id) => self.update(id, input).await,
            None => self.create(input).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.players.remove(&id).is_none() {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn clear_all(&self) -> Result<u64, StorageError> {
        let mut inner = self.inner.lock().unwrap();
        let removed = inner.players.len() as u64;
        inner.players.clear();
        Ok(removed)
    }

    async fn count(&self) -> Result<u64, StorageError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.players.len() as u64)
    }
}
