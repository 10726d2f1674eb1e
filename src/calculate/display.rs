//! Presentation formatting for derived metrics.
//!
//! The display precision is part of the contract: win rate and CS/min to
//! one decimal, KDA to two, gold/min and damage/min as whole numbers.

use serde::Serialize;

use crate::models::{Player, RoleClass, RosterSummary};

pub fn format_win_rate(value: f64) -> String {
    format!("{:.1}", value)
}

pub fn format_kda(value: f64) -> String {
    format!("{:.2}", value)
}

pub fn format_cs_per_min(value: f64) -> String {
    format!("{:.1}", value)
}

/// Round a rate to the nearest whole number for display.
pub fn round_whole(value: f64) -> i64 {
    value.round() as i64
}

/// Round to one decimal place, for numeric (non-string) display fields.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// One renderable roster table row.
#[derive(Debug, Clone, Serialize)]
pub struct RosterRow {
    pub ign: String,
    pub role_label: String,
    pub team: String,
    pub games_played: u32,
    pub win_rate_display: String,
    pub kda_display: String,
    pub gold_per_min: i64,
    pub cs_per_min_display: String,
    pub dmg_per_min: i64,
}

impl RosterRow {
    pub fn from_player(player: &Player) -> Self {
        Self {
            ign: player.ign.clone(),
            role_label: RoleClass::parse(&player.role).label().to_string(),
            team: player.team.clone(),
            games_played: player.games_played,
            win_rate_display: format_win_rate(player.win_rate()),
            kda_display: format_kda(player.kda()),
            gold_per_min: round_whole(player.gold_per_min()),
            cs_per_min_display: format_cs_per_min(player.cs_per_min()),
            dmg_per_min: round_whole(player.dmg_per_min()),
        }
    }
}

/// Renderable dashboard summary.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryView {
    pub total_players: u32,
    pub avg_win_rate_display: String,
    pub avg_kda_display: String,
    pub total_games: u32,
}

impl SummaryView {
    pub fn from_summary(summary: &RosterSummary) -> Self {
        Self {
            total_players: summary.total_players,
            avg_win_rate_display: format_win_rate(summary.avg_win_rate),
            avg_kda_display: format_kda(summary.avg_kda),
            total_games: summary.total_games,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faker() -> Player {
        Player {
            id: 1,
            ign: "Faker".to_string(),
            role: "Mid".to_string(),
            team: "T1".to_string(),
            games_played: 10,
            wins: 7,
            kills: 30,
            deaths: 10,
            assists: 40,
            total_gold: 50_000,
            total_cs: 2_000,
            total_damage: 100_000,
            total_minutes: 300.0,
            last_updated: None,
        }
    }

    #[test]
    fn test_roster_row_display_precision() {
        let row = RosterRow::from_player(&faker());

        assert_eq!(row.win_rate_display, "70.0");
        assert_eq!(row.kda_display, "7.00");
        assert_eq!(row.gold_per_min, 167);
        assert_eq!(row.cs_per_min_display, "6.7");
        assert_eq!(row.dmg_per_min, 333);
        assert_eq!(row.role_label, "Mid");
    }

    #[test]
    fn test_zero_stats_row() {
        let empty = Player {
            games_played: 0,
            wins: 0,
            kills: 0,
            deaths: 0,
            assists: 0,
            total_gold: 0,
            total_cs: 0,
            total_damage: 0,
            total_minutes: 0.0,
            ..faker()
        };
        let row = RosterRow::from_player(&empty);

        assert_eq!(row.win_rate_display, "0.0");
        assert_eq!(row.kda_display, "0.00");
        assert_eq!(row.gold_per_min, 0);
    }

    #[test]
    fn test_summary_view() {
        let view = SummaryView::from_summary(&RosterSummary {
            total_players: 2,
            avg_win_rate: 35.0,
            avg_kda: 3.5,
            total_games: 10,
        });

        assert_eq!(view.avg_win_rate_display, "35.0");
        assert_eq!(view.avg_kda_display, "3.50");
        assert_eq!(view.total_games, 10);
    }
}
