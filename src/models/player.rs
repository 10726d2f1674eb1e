//! Player model and validated input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculate;

/// Validation errors raised before any repository call is attempted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("player name is required")]
    MissingIgn,

    #[error("wins ({wins}) cannot exceed games played ({games_played})")]
    WinsExceedGames { wins: u32, games_played: u32 },

    #[error("total minutes must be a finite, non-negative number")]
    InvalidMinutes,
}

/// A professional player and their cumulative statistics.
///
/// Stores raw totals only; every ratio and rate is recomputed on demand so
/// no derived value ever becomes a stale source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Repository-assigned identifier, immutable once created.
    pub id: i64,

    /// In-game name, unique across the roster.
    pub ign: String,

    /// Role as recorded at the source (canonicalized at display time).
    #[serde(default)]
    pub role: String,

    /// Team name, empty when unknown.
    #[serde(default)]
    pub team: String,

    #[serde(default)]
    pub games_played: u32,

    #[serde(default)]
    pub wins: u32,

    #[serde(default)]
    pub kills: u32,

    #[serde(default)]
    pub deaths: u32,

    #[serde(default)]
    pub assists: u32,

    #[serde(default)]
    pub total_gold: u32,

    #[serde(default)]
    pub total_cs: u32,

    #[serde(default)]
    pub total_damage: u32,

    /// Minutes played across all recorded games (fractional).
    #[serde(default)]
    pub total_minutes: f64,

    /// Set by the repository on every write.
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Player {
    /// Build a player from validated input with a repository-assigned id.
    pub fn from_input(id: i64, input: &PlayerInput) -> Self {
        Self {
            id,
            ign: input.ign.clone(),
            role: input.role.clone(),
            team: input.team.clone(),
            games_played: input.games_played,
            wins: input.wins,
            kills: input.kills,
            deaths: input.deaths,
            assists: input.assists,
            total_gold: input.total_gold,
            total_cs: input.total_cs,
            total_damage: input.total_damage,
            total_minutes: input.total_minutes,
            last_updated: Some(Utc::now()),
        }
    }

    /// Win rate as a percentage (0–100).
    pub fn win_rate(&self) -> f64 {
        calculate::win_rate(self.wins, self.games_played)
    }

    /// (Kills + assists) / max(deaths, 1).
    pub fn kda(&self) -> f64 {
        calculate::kda(self.kills, self.deaths, self.assists)
    }

    pub fn gold_per_min(&self) -> f64 {
        calculate::per_minute(self.total_gold, self.total_minutes)
    }

    pub fn cs_per_min(&self) -> f64 {
        calculate::per_minute(self.total_cs, self.total_minutes)
    }

    pub fn dmg_per_min(&self) -> f64 {
        calculate::per_minute(self.total_damage, self.total_minutes)
    }

    pub fn avg_kills(&self) -> f64 {
        calculate::per_game(self.kills, self.games_played)
    }

    pub fn avg_deaths(&self) -> f64 {
        calculate::per_game(self.deaths, self.games_played)
    }

    pub fn avg_assists(&self) -> f64 {
        calculate::per_game(self.assists, self.games_played)
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}) - {} games, {:.1}% WR, {:.2} KDA",
            self.ign,
            self.role,
            self.games_played,
            self.win_rate(),
            self.kda()
        )
    }
}

/// The editable fields of a player: identity plus raw counters.
///
/// Absent numeric fields default to zero at deserialization; the unsigned
/// types keep every counter non-negative by construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerInput {
    pub ign: String,

    #[serde(default)]
    pub role: String,

    #[serde(default)]
    pub team: String,

    #[serde(default)]
    pub games_played: u32,

    #[serde(default)]
    pub wins: u32,

    #[serde(default)]
    pub kills: u32,

    #[serde(default)]
    pub deaths: u32,

    #[serde(default)]
    pub assists: u32,

    #[serde(default)]
    pub total_gold: u32,

    #[serde(default)]
    pub total_cs: u32,

    #[serde(default)]
    pub total_damage: u32,

    #[serde(default)]
    pub total_minutes: f64,
}

impl PlayerInput {
    /// Trim identity fields in place.
    pub fn normalize(&mut self) {
        self.ign = self.ign.trim().to_string();
        self.role = self.role.trim().to_string();
        self.team = self.team.trim().to_string();
    }

    /// Check the invariants that must hold before the repository is called.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.ign.trim().is_empty() {
            return Err(ValidationError::MissingIgn);
        }
        if self.wins > self.games_played {
            return Err(ValidationError::WinsExceedGames {
                wins: self.wins,
                games_played: self.games_played,
            });
        }
        if !self.total_minutes.is_finite() || self.total_minutes < 0.0 {
            return Err(ValidationError::InvalidMinutes);
        }
        Ok(())
    }
}
