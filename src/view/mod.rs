//! In-memory sort/filter engine.
//!
//! Maintains a derived view over the roster without mutating the source
//! collection. All session state lives in an explicit [`ViewState`] value
//! that is passed into and out of each call, so the engine itself holds
//! nothing and every operation is deterministic.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::Player;

/// Fields the roster view can be sorted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Ign,
    Role,
    Team,
    GamesPlayed,
    Wins,
    WinRate,
    Kda,
    GoldPerMin,
    CsPerMin,
    DmgPerMin,
}

impl SortField {
    /// Parse a query-string value into a sort field.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "ign" => Some(SortField::Ign),
            "role" => Some(SortField::Role),
            "team" => Some(SortField::Team),
            "games" | "games_played" => Some(SortField::GamesPlayed),
            "wins" => Some(SortField::Wins),
            "win_rate" | "winrate" => Some(SortField::WinRate),
            "kda" => Some(SortField::Kda),
            "gold_per_min" | "gpm" => Some(SortField::GoldPerMin),
            "cs_per_min" | "cspm" => Some(SortField::CsPerMin),
            "dmg_per_min" | "dpm" => Some(SortField::DmgPerMin),
            _ => None,
        }
    }
}

/// Transient per-session view state: active sort, filter, and selection.
///
/// Not persisted across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub sort_field: Option<SortField>,
    pub ascending: bool,
    pub filter: String,
    pub selected: Option<i64>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            sort_field: None,
            ascending: true,
            filter: String::new(),
            selected: None,
        }
    }
}

impl ViewState {
    /// Sort by `field`: repeating the current field flips direction,
    /// switching to a new field resets to ascending.
    pub fn toggle_sort(&mut self, field: SortField) {
        if self.sort_field == Some(field) {
            self.ascending = !self.ascending;
        } else {
            self.sort_field = Some(field);
            self.ascending = true;
        }
    }

    pub fn set_filter(&mut self, query: &str) {
        self.filter = query.to_string();
    }

    pub fn clear_filter(&mut self) {
        self.filter.clear();
    }

    /// Toggle selection: re-selecting the current id clears it.
    pub fn toggle_selection(&mut self, id: i64) {
        if self.selected == Some(id) {
            self.selected = None;
        } else {
            self.selected = Some(id);
        }
    }

    /// Produce the displayed subset and ordering: filter first, then sort.
    pub fn apply(&self, roster: &[Player]) -> Vec<Player> {
        let mut players = apply_filter(roster, &self.filter);
        if let Some(field) = self.sort_field {
            apply_sort(&mut players, field, self.ascending);
        }
        players
    }
}

/// Case-insensitive substring filter over ign, team, and role.
///
/// An empty query passes the full roster through unchanged.
pub fn apply_filter(roster: &[Player], query: &str) -> Vec<Player> {
    let query = query.to_lowercase();
    if query.is_empty() {
        return roster.to_vec();
    }

    roster
        .iter()
        .filter(|p| {
            p.ign.to_lowercase().contains(&query)
                || p.team.to_lowercase().contains(&query)
                || p.role.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}

/// Stable in-place sort by the named field.
///
/// String fields compare case-insensitively, numeric and derived fields
/// numerically. Equal keys keep their relative input order.
pub fn apply_sort(players: &mut [Player], field: SortField, ascending: bool) {
    players.sort_by(|a, b| {
        let ordering = compare(a, b, field);
        if ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
}

fn compare(a: &Player, b: &Player, field: SortField) -> Ordering {
    match field {
        SortField::Ign => a.ign.to_lowercase().cmp(&b.ign.to_lowercase()),
        SortField::Role => a.role.to_lowercase().cmp(&b.role.to_lowercase()),
        SortField::Team => a.team.to_lowercase().cmp(&b.team.to_lowercase()),
        SortField::GamesPlayed => a.games_played.cmp(&b.games_played),
        SortField::Wins => a.wins.cmp(&b.wins),
        SortField::WinRate => numeric(a.win_rate(), b.win_rate()),
        SortField::Kda => numeric(a.kda(), b.kda()),
        SortField::GoldPerMin => numeric(a.gold_per_min(), b.gold_per_min()),
        SortField::CsPerMin => numeric(a.cs_per_min(), b.cs_per_min()),
        SortField::DmgPerMin => numeric(a.dmg_per_min(), b.dmg_per_min()),
    }
}

fn numeric(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Display initials for a player name.
///
/// Two letters of a single-word name, the first letter of each of the
/// first two words otherwise, `?` when the name is empty. Total function.
pub fn initials(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    match words.len() {
        0 => "?".to_string(),
        1 => words[0].chars().take(2).collect::<String>().to_uppercase(),
        _ => words
            .iter()
            .take(2)
            .filter_map(|w| w.chars().next())
            .collect::<String>()
            .to_uppercase(),
    }
}

/// A destructive operation awaiting confirmation.
#[derive(Debug, Clone, PartialEq)]
pub enum DestructiveAction {
    DeletePlayer { id: i64, ign: String },
    ClearRoster,
}

/// Short-lived confirmation command: built per request, consumed on
/// confirm, dropped on cancel. No shared pending-callback slot.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAction {
    action: DestructiveAction,
}

impl PendingAction {
    pub fn delete_player(id: i64, ign: &str) -> Self {
        Self {
            action: DestructiveAction::DeletePlayer {
                id,
                ign: ign.to_string(),
            },
        }
    }

    pub fn clear_roster() -> Self {
        Self {
            action: DestructiveAction::ClearRoster,
        }
    }

    /// Human-readable prompt for the confirmation step.
    pub fn describe(&self) -> String {
        match &self.action {
            DestructiveAction::DeletePlayer { id, ign } => {
                format!("delete player '{}' (#{})", ign, id)
            }
            DestructiveAction::ClearRoster => "remove all players from the roster".to_string(),
        }
    }

    /// Confirm the action, consuming the command.
    pub fn confirm(self) -> DestructiveAction {
        self.action
    }
}
