//! Player persistence.
//!
//! All database interaction lives behind the [`PlayerRepository`] trait:
//! a SQLite implementation for the real store and an in-memory map for
//! tests and development. The repository is the only component that
//! assigns player ids and the only place IGN uniqueness is enforced.

mod memory;
mod sqlite;

pub use memory::InMemoryPlayerRepository;
pub use sqlite::SqlitePlayerRepository;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Player, PlayerInput};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("player not found")]
    NotFound,

    #[error("a player named '{0}' already exists")]
    DuplicateIgn(String),

    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::Database(err.to_string())
    }
}

/// CRUD operations over the player roster, keyed by repository-assigned id.
///
/// Inputs are validated by the caller before any method here is invoked;
/// the repository enforces only identity constraints (id existence, IGN
/// uniqueness).
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// All players, ordered by IGN case-insensitively.
    async fn list(&self) -> Result<Vec<Player>, StorageError>;

    async fn get(&self, id: i64) -> Result<Option<Player>, StorageError>;

    async fn get_by_ign(&self, ign: &str) -> Result<Option<Player>, StorageError>;

    /// Insert a new player. Fails with [`StorageError::DuplicateIgn`] when
    /// the IGN is taken.
    async fn create(&self, input: &PlayerInput) -> Result<Player, StorageError>;

    /// Replace the editable fields of an existing player.
    async fn update(&self, id: i64, input: &PlayerInput) -> Result<Player, StorageError>;

    /// Insert or update by IGN. Existing counters are replaced with the
    /// incoming totals, not incremented.
    async fn upsert(&self, input: &PlayerInput) -> Result<Player, StorageError>;

    async fn delete(&self, id: i64) -> Result<(), StorageError>;

    /// Remove every player, returning how many were deleted.
    async fn clear_all(&self) -> Result<u64, StorageError>;

    async fn count(&self) -> Result<u64, StorageError>;
}
