//! Roster-wide summary models.

use serde::{Deserialize, Serialize};

/// Dashboard summary, recomputed on every request and never persisted.
///
/// The averages are unweighted means of per-player metrics: each player
/// contributes one unit regardless of games played.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterSummary {
    pub total_players: u32,
    pub avg_win_rate: f64,
    pub avg_kda: f64,
    pub total_games: u32,
}

/// Per-role average statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleAverages {
    pub player_count: u32,
    pub avg_win_rate: f64,
    pub avg_kda: f64,
    pub avg_gold_per_min: f64,
    pub avg_cs_per_min: f64,
    pub avg_dmg_per_min: f64,
}
