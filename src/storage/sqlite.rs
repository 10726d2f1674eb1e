//! SQLite-backed player repository.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, info};

use super::{PlayerRepository, StorageError};
use crate::models::{Player, PlayerInput};

/// Player repository backed by a local SQLite file.
pub struct SqlitePlayerRepository {
    pool: SqlitePool,
}

impl SqlitePlayerRepository {
    /// Open (creating if missing) the database at `path` and ensure the
    /// schema exists.
    pub async fn open(path: &Path) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let repo = Self { pool };
        repo.init_schema().await?;
        info!("Database ready at {}", path.display());
        Ok(repo)
    }

    async fn init_schema(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS players (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ign TEXT NOT NULL UNIQUE,
                role TEXT NOT NULL DEFAULT '',
                team TEXT NOT NULL DEFAULT '',
                games_played INTEGER NOT NULL DEFAULT 0,
                wins INTEGER NOT NULL DEFAULT 0,
                kills INTEGER NOT NULL DEFAULT 0,
                deaths INTEGER NOT NULL DEFAULT 0,
                assists INTEGER NOT NULL DEFAULT 0,
                total_gold INTEGER NOT NULL DEFAULT 0,
                total_cs INTEGER NOT NULL DEFAULT 0,
                total_damage INTEGER NOT NULL DEFAULT 0,
                total_minutes REAL NOT NULL DEFAULT 0,
                last_updated TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_players_ign ON players(ign)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_players_role ON players(role)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn player_from_row(row: &SqliteRow) -> Player {
    Player {
        id: row.get("id"),
        ign: row.get("ign"),
        role: row.get("role"),
        team: row.get("team"),
        games_played: row.get("games_played"),
        wins: row.get("wins"),
        kills: row.get("kills"),
        deaths: row.get("deaths"),
        assists: row.get("assists"),
        total_gold: row.get("total_gold"),
        total_cs: row.get("total_cs"),
        total_damage: row.get("total_damage"),
        total_minutes: row.get("total_minutes"),
        last_updated: row.get("last_updated"),
    }
}

fn map_unique_violation(err: sqlx::Error, ign: &str) -> StorageError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StorageError::DuplicateIgn(ign.to_string())
        }
        _ => err.into(),
    }
}

#[async_trait]
impl PlayerRepository for SqlitePlayerRepository {
    async fn list(&self) -> Result<Vec<Player>, StorageError> {
        let rows = sqlx::query("SELECT * FROM players ORDER BY ign COLLATE NOCASE")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(player_from_row).collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Player>, StorageError> {
        let row = sqlx::query("SELECT * FROM players WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(player_from_row))
    }

    async fn get_by_ign(&self, ign: &str) -> Result<Option<Player>, StorageError> {
        let row = sqlx::query("SELECT * FROM players WHERE ign = ?")
            .bind(ign)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(player_from_row))
    }

    async fn create(&self, input: &PlayerInput) -> Result<Player, StorageError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO players (ign, role, team, games_played, wins, kills, deaths,
                                 assists, total_gold, total_cs, total_damage,
                                 total_minutes, last_updated)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.ign)
        .bind(&input.role)
        .bind(&input.team)
        .bind(input.games_played)
        .bind(input.wins)
        .bind(input.kills)
        .bind(input.deaths)
        .bind(input.assists)
        .bind(input.total_gold)
        .bind(input.total_cs)
        .bind(input.total_damage)
        .bind(input.total_minutes)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, &input.ign))?;

        let id = result.last_insert_rowid();
        debug!(id, ign = %input.ign, "Player created");

        let mut player = Player::from_input(id, input);
        player.last_updated = Some(now);
        Ok(player)
    }

    async fn update(&self, id: i64, input: &PlayerInput) -> Result<Player, StorageError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE players SET
                ign = ?, role = ?, team = ?, games_played = ?, wins = ?,
                kills = ?, deaths = ?, assists = ?, total_gold = ?,
                total_cs = ?, total_damage = ?, total_minutes = ?,
                last_updated = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.ign)
        .bind(&input.role)
        .bind(&input.team)
        .bind(input.games_played)
        .bind(input.wins)
        .bind(input.kills)
        .bind(input.deaths)
        .bind(input.assists)
        .bind(input.total_gold)
        .bind(input.total_cs)
        .bind(input.total_damage)
        .bind(input.total_minutes)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, &input.ign))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        debug!(id, ign = %input.ign, "Player updated");
        let mut player = Player::from_input(id, input);
        player.last_updated = Some(now);
        Ok(player)
    }

    async fn upsert(&self, input: &PlayerInput) -> Result<Player, StorageError> {
        match self.get_by_ign(&input.ign).await? {
            Some(existing) => self.update(existing.id, input).await,
            None => self.create(input).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM players WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        debug!(id, "Player deleted");
        Ok(())
    }

    async fn clear_all(&self) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM players")
            .execute(&self.pool)
            .await?;
        info!(removed = result.rows_affected(), "Roster cleared");
        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<u64, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM players")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(ign: &str, games: u32, wins: u32) -> PlayerInput {
        PlayerInput {
            ign: ign.to_string(),
            role: "Mid".to_string(),
            team: "T1".to_string(),
            games_played: games,
            wins,
            ..PlayerInput::default()
        }
    }

    async fn repo(dir: &std::path::Path) -> SqlitePlayerRepository {
        SqlitePlayerRepository::open(&dir.join("players.db"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = repo(tmp.path()).await;

        let created = repo.create(&input("Faker", 10, 7)).await.unwrap();
        assert!(created.id > 0);

        let fetched = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.ign, "Faker");
        assert_eq!(fetched.games_played, 10);
        assert!(fetched.last_updated.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_ign_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = repo(tmp.path()).await;

        repo.create(&input("Faker", 10, 7)).await.unwrap();
        let err = repo.create(&input("Faker", 1, 0)).await.unwrap_err();
        assert!(matches!(err, StorageError::DuplicateIgn(ref ign) if ign == "Faker"));
    }

    #[tokio::test]
    async fn test_update_replaces_totals() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = repo(tmp.path()).await;

        let created = repo.create(&input("Faker", 10, 7)).await.unwrap();
        let updated = repo.update(created.id, &input("Faker", 12, 9)).await.unwrap();
        assert_eq!(updated.games_played, 12);

        let fetched = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.wins, 9);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = repo(tmp.path()).await;

        let err = repo.update(999, &input("Ghost", 0, 0)).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn test_upsert_by_ign() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = repo(tmp.path()).await;

        let first = repo.upsert(&input("Faker", 10, 7)).await.unwrap();
        // Second upsert with the same IGN replaces totals, keeps the id.
        let second = repo.upsert(&input("Faker", 20, 15)).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.games_played, 20);
        assert_eq!(repo.count().await.unwrap(), 1);

        repo.upsert(&input("Chovy", 8, 4)).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = repo(tmp.path()).await;

        let a = repo.create(&input("A", 1, 1)).await.unwrap();
        repo.create(&input("B", 1, 0)).await.unwrap();

        repo.delete(a.id).await.unwrap();
        assert!(matches!(
            repo.delete(a.id).await.unwrap_err(),
            StorageError::NotFound
        ));

        assert_eq!(repo.clear_all().await.unwrap(), 1);
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_ordered_case_insensitively() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = repo(tmp.path()).await;

        repo.create(&input("zeus", 1, 0)).await.unwrap();
        repo.create(&input("Ruler", 1, 0)).await.unwrap();
        repo.create(&input("chovy", 1, 0)).await.unwrap();

        let igns: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.ign)
            .collect();
        assert_eq!(igns, vec!["chovy", "Ruler", "zeus"]);
    }
}
