//! Statistics calculation engine.
//!
//! Computes derived metrics from raw player totals:
//! - Per-player ratios and per-minute rates
//! - Roster-wide summary statistics
//! - Qualified leaderboards and per-role averages
//!
//! Every function here is total: degenerate input (zero games, zero
//! minutes, empty roster) yields zero-valued output, never an error and
//! never NaN or infinity.

mod display;

pub use display::*;

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{Player, RoleAverages, RoleClass, RosterSummary};

/// Win rate as a percentage (0–100). Zero games means no data yet.
pub fn win_rate(wins: u32, games_played: u32) -> f64 {
    if games_played == 0 {
        0.0
    } else {
        wins as f64 / games_played as f64 * 100.0
    }
}

/// KDA ratio: (kills + assists) / deaths, with deaths floored at 1.
///
/// The floor keeps a deathless run finite: it reports kills + assists
/// directly instead of dividing by zero.
pub fn kda(kills: u32, deaths: u32, assists: u32) -> f64 {
    (kills + assists) as f64 / deaths.max(1) as f64
}

/// A cumulative total normalized per minute. Zero minutes means no data.
pub fn per_minute(total: u32, minutes: f64) -> f64 {
    if minutes <= 0.0 {
        0.0
    } else {
        total as f64 / minutes
    }
}

/// A cumulative total normalized per game. Zero games means no data.
pub fn per_game(total: u32, games_played: u32) -> f64 {
    if games_played == 0 {
        0.0
    } else {
        total as f64 / games_played as f64
    }
}

/// Summarize a roster into dashboard statistics.
///
/// The averages are unweighted means of each player's own metrics, not a
/// pooled recomputation from summed counters.
pub fn summarize(players: &[Player]) -> RosterSummary {
    if players.is_empty() {
        return RosterSummary::default();
    }

    let total = players.len() as u32;
    let total_games: u32 = players.iter().map(|p| p.games_played).sum();
    let avg_win_rate = players.iter().map(|p| p.win_rate()).sum::<f64>() / total as f64;
    let avg_kda = players.iter().map(|p| p.kda()).sum::<f64>() / total as f64;

    RosterSummary {
        total_players: total,
        avg_win_rate,
        avg_kda,
        total_games,
    }
}

fn desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Top players by win rate, restricted to those with enough games.
pub fn top_by_win_rate(players: &[Player], limit: usize, min_games: u32) -> Vec<&Player> {
    let mut qualified: Vec<&Player> = players
        .iter()
        .filter(|p| p.games_played >= min_games)
        .collect();
    qualified.sort_by(|a, b| desc(a.win_rate(), b.win_rate()));
    qualified.truncate(limit);
    qualified
}

/// Top players by KDA, restricted to those with enough games.
pub fn top_by_kda(players: &[Player], limit: usize, min_games: u32) -> Vec<&Player> {
    let mut qualified: Vec<&Player> = players
        .iter()
        .filter(|p| p.games_played >= min_games)
        .collect();
    qualified.sort_by(|a, b| desc(a.kda(), b.kda()));
    qualified.truncate(limit);
    qualified
}

/// Average statistics per role class (unweighted, like the summary).
pub fn role_averages(players: &[Player]) -> HashMap<RoleClass, RoleAverages> {
    let mut sums: HashMap<RoleClass, RoleAverages> = HashMap::new();

    for p in players {
        let entry = sums.entry(RoleClass::parse(&p.role)).or_default();
        entry.player_count += 1;
        entry.avg_win_rate += p.win_rate();
        entry.avg_kda += p.kda();
        entry.avg_gold_per_min += p.gold_per_min();
        entry.avg_cs_per_min += p.cs_per_min();
        entry.avg_dmg_per_min += p.dmg_per_min();
    }

    for stats in sums.values_mut() {
        let count = stats.player_count as f64;
        stats.avg_win_rate /= count;
        stats.avg_kda /= count;
        stats.avg_gold_per_min /= count;
        stats.avg_cs_per_min /= count;
        stats.avg_dmg_per_min /= count;
    }

    sums
}

/// Player counts per role class.
pub fn role_distribution(players: &[Player]) -> HashMap<RoleClass, u32> {
    let mut counts: HashMap<RoleClass, u32> = HashMap::new();
    for p in players {
        *counts.entry(RoleClass::parse(&p.role)).or_default() += 1;
    }
    counts
}

/// Player counts per team, with empty team names grouped as "Unknown".
pub fn team_distribution(players: &[Player]) -> HashMap<String, u32> {
    let mut counts: HashMap<String, u32> = HashMap::new();
    for p in players {
        let team = if p.team.is_empty() {
            "Unknown".to_string()
        } else {
            p.team.clone()
        };
        *counts.entry(team).or_default() += 1;
    }
    counts
}
