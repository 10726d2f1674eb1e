use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::{self, format_kda, format_win_rate, SummaryView};
use crate::models::{Player, RoleAverages, RoleClass};

pub async fn summary(State(state): State<AppState>) -> Result<Json<SummaryView>, ApiError> {
    let roster = state.repo.list().await?;
    let summary = calculate::summarize(&roster);
    Ok(Json(SummaryView::from_summary(&summary)))
}

#[derive(Debug, Serialize)]
pub struct RoleBreakdownResponse {
    /// Keyed by role label, alphabetical for stable output.
    pub roles: BTreeMap<String, RoleAverages>,
}

pub async fn role_breakdown(
    State(state): State<AppState>,
) -> Result<Json<RoleBreakdownResponse>, ApiError> {
    let roster = state.repo.list().await?;

    let roles = calculate::role_averages(&roster)
        .into_iter()
        .map(|(class, averages)| (class.label().to_string(), averages))
        .collect();

    Ok(Json(RoleBreakdownResponse { roles }))
}

#[derive(Debug, Serialize)]
pub struct TeamBreakdownResponse {
    pub teams: BTreeMap<String, u32>,
}

pub async fn team_breakdown(
    State(state): State<AppState>,
) -> Result<Json<TeamBreakdownResponse>, ApiError> {
    let roster = state.repo.list().await?;
    let teams = calculate::team_distribution(&roster).into_iter().collect();
    Ok(Json(TeamBreakdownResponse { teams }))
}

#[derive(Debug, Deserialize)]
pub struct TopParams {
    pub limit: Option<usize>,
    pub min_games: Option<u32>,
}

impl TopParams {
    fn limit(&self) -> usize {
        self.limit.unwrap_or(10).clamp(1, 100)
    }

    fn min_games(&self) -> u32 {
        self.min_games.unwrap_or(5)
    }
}

#[derive(Debug, Serialize)]
pub struct TopEntry {
    pub ign: String,
    pub role_label: String,
    pub team: String,
    pub games_played: u32,
    pub value_display: String,
}

#[derive(Debug, Serialize)]
pub struct TopResponse {
    pub metric: &'static str,
    pub players: Vec<TopEntry>,
}

fn top_entry(player: &Player, value_display: String) -> TopEntry {
    TopEntry {
        ign: player.ign.clone(),
        role_label: RoleClass::parse(&player.role).label().to_string(),
        team: player.team.clone(),
        games_played: player.games_played,
        value_display,
    }
}

pub async fn top_by_win_rate(
    State(state): State<AppState>,
    Query(params): Query<TopParams>,
) -> Result<Json<TopResponse>, ApiError> {
    let roster = state.repo.list().await?;
    let players = calculate::top_by_win_rate(&roster, params.limit(), params.min_games())
        .into_iter()
        .map(|p| top_entry(p, format_win_rate(p.win_rate())))
        .collect();

    Ok(Json(TopResponse {
        metric: "win_rate",
        players,
    }))
}

pub async fn top_by_kda(
    State(state): State<AppState>,
    Query(params): Query<TopParams>,
) -> Result<Json<TopResponse>, ApiError> {
    let roster = state.repo.list().await?;
    let players = calculate::top_by_kda(&roster, params.limit(), params.min_games())
        .into_iter()
        .map(|p| top_entry(p, format_kda(p.kda())))
        .collect();

    Ok(Json(TopResponse {
        metric: "kda",
        players,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::build_router;
    use crate::config::{ImportDefaults, LeaguepediaConfig};
    use crate::models::PlayerInput;
    use crate::storage::{InMemoryPlayerRepository, PlayerRepository};
    use crate::sync::LeaguepediaClient;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn test_state() -> AppState {
        AppState {
            repo: Arc::new(InMemoryPlayerRepository::new()),
            leaguepedia: Arc::new(
                LeaguepediaClient::new(LeaguepediaConfig::default()).unwrap(),
            ),
            import_defaults: ImportDefaults::default(),
        }
    }

    async fn seed(state: &AppState) {
        state
            .repo
            .create(&PlayerInput {
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
            })
            .await
            .unwrap();
        state
            .repo
            .create(&PlayerInput {
                ign: "Noob".to_string(),
                ..PlayerInput::default()
            })
            .await
            .unwrap();
    }

    async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_summary_empty_roster() {
        let app = build_router(test_state());
        let (status, json) = get_json(app, "/api/stats").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_players"], 0);
        assert_eq!(json["avg_win_rate_display"], "0.0");
        assert_eq!(json["avg_kda_display"], "0.00");
        assert_eq!(json["total_games"], 0);
    }

    #[tokio::test]
    async fn test_summary_unweighted_averages() {
        let state = test_state();
        seed(&state).await;

        let app = build_router(state);
        let (status, json) = get_json(app, "/api/stats").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_players"], 2);
        assert_eq!(json["total_games"], 10);
        assert_eq!(json["avg_win_rate_display"], "35.0");
        assert_eq!(json["avg_kda_display"], "3.50");
    }

    #[tokio::test]
    async fn test_role_breakdown_uses_labels() {
        let state = test_state();
        seed(&state).await;

        let app = build_router(state);
        let (status, json) = get_json(app, "/api/stats/roles").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["roles"]["Mid"]["player_count"], 1);
        assert_eq!(json["roles"]["Uncategorized"]["player_count"], 1);
    }

    #[tokio::test]
    async fn test_team_breakdown() {
        let state = test_state();
        seed(&state).await;

        let app = build_router(state);
        let (status, json) = get_json(app, "/api/stats/teams").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["teams"]["T1"], 1);
        assert_eq!(json["teams"]["Unknown"], 1);
    }

    #[tokio::test]
    async fn test_top_winrate_applies_min_games() {
        let state = test_state();
        seed(&state).await;

        // Default min_games=5 excludes the zero-game player.
        let app = build_router(state.clone());
        let (status, json) = get_json(app, "/api/stats/top/winrate").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["players"].as_array().unwrap().len(), 1);
        assert_eq!(json["players"][0]["ign"], "Faker");
        assert_eq!(json["players"][0]["value_display"], "70.0");

        // Lowering the qualifier includes everyone.
        let app = build_router(state);
        let (_, json) = get_json(app, "/api/stats/top/winrate?min_games=0").await;
        assert_eq!(json["players"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_top_kda_display() {
        let state = test_state();
        seed(&state).await;

        let app = build_router(state);
        let (status, json) = get_json(app, "/api/stats/top/kda").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["metric"], "kda");
        assert_eq!(json["players"][0]["value_display"], "7.00");
    }
}
