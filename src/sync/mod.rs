//! Bulk import from Leaguepedia.
//!
//! Coordinates the import pipeline:
//! 1. Fetch per-game scoreboard rows from the Cargo API
//! 2. Fold them into cumulative per-player totals
//! 3. Upsert each player by IGN (totals replaced, not incremented)

mod leaguepedia;

pub use leaguepedia::{GameRecord, LeaguepediaClient, PlayerProfile};

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::models::PlayerInput;
use crate::storage::{PlayerRepository, StorageError};

/// Errors that can occur during import.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid API base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("API error {code}: {message}")]
    Api { code: String, message: String },

    #[error("rate limited after {0} attempts, try again in a few minutes")]
    RateLimited(u32),

    #[error("no data found for {tournament} {year}")]
    NoData { tournament: String, year: String },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Parameters for one import run.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Tournament filter, e.g. "LCK", "LPL", "Worlds".
    pub tournament: String,

    /// Year to import, e.g. "2025".
    pub year: String,

    /// Fetch and aggregate but skip the repository writes.
    pub dry_run: bool,
}

/// Result of an import run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub players_imported: u32,
    pub games_processed: u32,
}

/// Fold per-game records into one accumulation delta per player.
///
/// Role and team track the most recent non-empty value seen; rows without
/// a player name are dropped. Output is ordered by player name so repeated
/// runs over the same data behave identically.
pub fn aggregate_games(records: &[GameRecord]) -> Vec<PlayerInput> {
    let mut totals: BTreeMap<String, PlayerInput> = BTreeMap::new();

    for record in records {
        if record.player.is_empty() {
            continue;
        }

        let entry = totals
            .entry(record.player.clone())
            .or_insert_with(|| PlayerInput {
                ign: record.player.clone(),
                ..PlayerInput::default()
            });

        entry.games_played += 1;
        if record.won {
            entry.wins += 1;
        }
        entry.kills += record.kills;
        entry.deaths += record.deaths;
        entry.assists += record.assists;
        entry.total_gold += record.gold;
        entry.total_cs += record.cs;
        entry.total_damage += record.damage;
        entry.total_minutes += record.minutes;

        if !record.role.is_empty() {
            entry.role = record.role.clone();
        }
        if !record.team.is_empty() {
            entry.team = record.team.clone();
        }
    }

    totals.into_values().collect()
}

/// Orchestrates fetch → aggregate → upsert.
pub struct ImportService {
    client: Arc<LeaguepediaClient>,
    repo: Arc<dyn PlayerRepository>,
}

impl ImportService {
    pub fn new(client: Arc<LeaguepediaClient>, repo: Arc<dyn PlayerRepository>) -> Self {
        Self { client, repo }
    }

    /// Run one complete import. Blocking from the caller's perspective:
    /// when this returns the repository already reflects the new totals.
    pub async fn import(&self, options: &ImportOptions) -> Result<ImportReport, ImportError> {
        info!(
            tournament = %options.tournament,
            year = %options.year,
            dry_run = options.dry_run,
            "Starting Leaguepedia import"
        );

        let records = self
            .client
            .fetch_player_game_stats(&options.tournament, &options.year)
            .await?;

        if records.is_empty() {
            return Err(ImportError::NoData {
                tournament: options.tournament.clone(),
                year: options.year.clone(),
            });
        }

        let aggregated = aggregate_games(&records);
        info!(
            games = records.len(),
            players = aggregated.len(),
            "Aggregated game records"
        );

        if options.dry_run {
            return Ok(ImportReport {
                players_imported: aggregated.len() as u32,
                games_processed: records.len() as u32,
            });
        }

        let mut imported = 0u32;
        for input in &aggregated {
            match self.repo.upsert(input).await {
                Ok(_) => imported += 1,
                Err(e) => warn!(ign = %input.ign, error = %e, "Failed to upsert player"),
            }
        }

        info!(imported, "Import complete");
        Ok(ImportReport {
            players_imported: imported,
            games_processed: records.len() as u32,
        })
    }
}
