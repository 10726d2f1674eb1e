use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::{round_tenth, RosterRow};
use crate::models::{Player, PlayerInput, RoleClass};
use crate::view::{self, SortField, ViewState};

#[derive(Debug, Deserialize)]
pub struct ListPlayersParams {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

/// One roster entry: the renderable row plus the raw fields the edit form
/// needs back.
#[derive(Debug, Serialize)]
pub struct PlayerSummary {
    pub id: i64,
    pub initials: String,
    pub wins: u32,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    #[serde(flatten)]
    pub row: RosterRow,
}

impl PlayerSummary {
    fn from_player(player: &Player) -> Self {
        Self {
            id: player.id,
            initials: view::initials(&player.ign),
            wins: player.wins,
            kills: player.kills,
            deaths: player.deaths,
            assists: player.assists,
            row: RosterRow::from_player(player),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlayerListResponse {
    pub players: Vec<PlayerSummary>,
    pub count: usize,
}

pub async fn list_players(
    State(state): State<AppState>,
    Query(params): Query<ListPlayersParams>,
) -> Result<Json<PlayerListResponse>, ApiError> {
    let roster = state.repo.list().await?;

    // Per-request view state: filter first, then sort.
    let mut view = ViewState::default();
    if let Some(search) = &params.search {
        view.set_filter(search.trim());
    }
    if let Some(sort) = &params.sort {
        let field = SortField::parse(sort)
            .ok_or_else(|| ApiError::BadRequest(format!("unknown sort field '{}'", sort)))?;
        view.sort_field = Some(field);
        view.ascending = !matches!(params.order.as_deref(), Some("desc"));
    }

    let players = view.apply(&roster);
    let summaries: Vec<PlayerSummary> = players.iter().map(PlayerSummary::from_player).collect();

    Ok(Json(PlayerListResponse {
        count: summaries.len(),
        players: summaries,
    }))
}

pub async fn create_player(
    State(state): State<AppState>,
    Json(mut input): Json<PlayerInput>,
) -> Result<(StatusCode, Json<PlayerSummary>), ApiError> {
    input.normalize();
    input.validate()?;

    let player = state.repo.create(&input).await?;
    Ok((StatusCode::CREATED, Json(PlayerSummary::from_player(&player))))
}

pub async fn get_player(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PlayerSummary>, ApiError> {
    let player = state
        .repo
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("player {}", id)))?;
    Ok(Json(PlayerSummary::from_player(&player)))
}

pub async fn update_player(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(mut input): Json<PlayerInput>,
) -> Result<Json<PlayerSummary>, ApiError> {
    input.normalize();
    input.validate()?;

    let player = state.repo.update(id, &input).await?;
    Ok(Json(PlayerSummary::from_player(&player)))
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub removed: String,
}

pub async fn delete_player(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let player = state
        .repo
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("player {}", id)))?;

    state.repo.delete(id).await?;
    Ok(Json(DeleteResponse {
        removed: player.ign,
    }))
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub removed: u64,
}

pub async fn clear_players(
    State(state): State<AppState>,
) -> Result<Json<ClearResponse>, ApiError> {
    let removed = state.repo.clear_all().await?;
    Ok(Json(ClearResponse { removed }))
}

/// Full player detail: raw totals, derived metrics, per-game averages,
/// and best-effort profile info from the wiki.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub ign: String,
    pub initials: String,
    pub role_label: String,
    pub team: String,
    pub games_played: u32,
    pub wins: u32,
    pub win_rate_display: String,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub kda_display: String,
    pub total_gold: u32,
    pub total_cs: u32,
    pub total_damage: u32,
    pub total_minutes: f64,
    pub gold_per_min: i64,
    pub cs_per_min_display: String,
    pub dmg_per_min: i64,
    pub avg_kills: f64,
    pub avg_deaths: f64,
    pub avg_assists: f64,
    pub real_name: Option<String>,
    pub country: Option<String>,
}

pub async fn player_profile(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let player = state
        .repo
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("player {}", id)))?;

    // Profile enrichment is best-effort: an unreachable wiki must not
    // break the local view.
    let wiki = match state.leaguepedia.get_player_info(&player.ign).await {
        Ok(info) => info,
        Err(e) => {
            warn!(ign = %player.ign, error = %e, "Wiki profile lookup failed");
            None
        }
    };

    let row = RosterRow::from_player(&player);
    Ok(Json(ProfileResponse {
        id: player.id,
        initials: view::initials(&player.ign),
        role_label: RoleClass::parse(&player.role).label().to_string(),
        team: player.team.clone(),
        games_played: player.games_played,
        wins: player.wins,
        win_rate_display: row.win_rate_display,
        kills: player.kills,
        deaths: player.deaths,
        assists: player.assists,
        kda_display: row.kda_display,
        total_gold: player.total_gold,
        total_cs: player.total_cs,
        total_damage: player.total_damage,
        total_minutes: round_tenth(player.total_minutes),
        gold_per_min: row.gold_per_min,
        cs_per_min_display: row.cs_per_min_display,
        dmg_per_min: row.dmg_per_min,
        avg_kills: round_tenth(player.avg_kills()),
        avg_deaths: round_tenth(player.avg_deaths()),
        avg_assists: round_tenth(player.avg_assists()),
        real_name: wiki.as_ref().map(|w| w.real_name.clone()),
        country: wiki.as_ref().map(|w| w.country.clone()),
        ign: player.ign,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::build_router;
    use crate::config::{ImportDefaults, LeaguepediaConfig};
    use crate::storage::{InMemoryPlayerRepository, PlayerRepository};
    use crate::sync::LeaguepediaClient;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
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

    fn faker_input() -> PlayerInput {
        PlayerInput {
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
        }
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

    async fn send_json(app: axum::Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let resp = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    async fn delete(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
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
    async fn test_list_empty_roster() {
        let app = build_router(test_state());
        let (status, json) = get_json(app, "/api/players").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["count"], 0);
        assert_eq!(json["players"], json!([]));
    }

    #[tokio::test]
    async fn test_create_player_renders_row() {
        let app = build_router(test_state());
        let (status, json) = send_json(
            app,
            "POST",
            "/api/players",
            serde_json::to_value(faker_input()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["ign"], "Faker");
        assert_eq!(json["initials"], "FA");
        assert_eq!(json["win_rate_display"], "70.0");
        assert_eq!(json["kda_display"], "7.00");
        assert_eq!(json["gold_per_min"], 167);
        assert_eq!(json["cs_per_min_display"], "6.7");
        assert_eq!(json["dmg_per_min"], 333);
        assert_eq!(json["role_label"], "Mid");
    }

    #[tokio::test]
    async fn test_create_rejects_empty_ign() {
        let app = build_router(test_state());
        let (status, json) =
            send_json(app, "POST", "/api/players", json!({"ign": "   "})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_create_rejects_wins_over_games() {
        let app = build_router(test_state());
        let (status, json) = send_json(
            app,
            "POST",
            "/api/players",
            json!({"ign": "Faker", "games_played": 2, "wins": 3}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_create_duplicate_is_conflict() {
        let state = test_state();
        state.repo.create(&faker_input()).await.unwrap();

        let app = build_router(state);
        let (status, json) = send_json(
            app,
            "POST",
            "/api/players",
            serde_json::to_value(faker_input()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_list_search_and_sort() {
        let state = test_state();
        state.repo.create(&faker_input()).await.unwrap();
        state
            .repo
            .create(&PlayerInput {
                ign: "Chovy".to_string(),
                role: "Mid".to_string(),
                team: "Gen.G".to_string(),
                games_played: 10,
                wins: 8,
                ..PlayerInput::default()
            })
            .await
            .unwrap();
        state
            .repo
            .create(&PlayerInput {
                ign: "Oner".to_string(),
                role: "JNG".to_string(),
                team: "T1".to_string(),
                games_played: 10,
                wins: 6,
                ..PlayerInput::default()
            })
            .await
            .unwrap();

        let app = build_router(state.clone());
        let (status, json) = get_json(app, "/api/players?search=t1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["count"], 2);

        let app = build_router(state.clone());
        let (_, json) = get_json(app, "/api/players?sort=win_rate&order=desc").await;
        assert_eq!(json["players"][0]["ign"], "Chovy");
        assert_eq!(json["players"][2]["ign"], "Oner");

        let app = build_router(state);
        let (status, json) = get_json(app, "/api/players?sort=bogus").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_get_missing_player_is_404() {
        let app = build_router(test_state());
        let (status, json) = get_json(app, "/api/players/42").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_update_replaces_counters() {
        let state = test_state();
        let created = state.repo.create(&faker_input()).await.unwrap();

        let mut updated = faker_input();
        updated.games_played = 12;
        updated.wins = 9;

        let app = build_router(state);
        let (status, json) = send_json(
            app,
            "PUT",
            &format!("/api/players/{}", created.id),
            serde_json::to_value(updated).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["games_played"], 12);
        assert_eq!(json["win_rate_display"], "75.0");
    }

    #[tokio::test]
    async fn test_delete_player_and_missing() {
        let state = test_state();
        let created = state.repo.create(&faker_input()).await.unwrap();

        let app = build_router(state.clone());
        let (status, json) = delete(app, &format!("/api/players/{}", created.id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["removed"], "Faker");

        let app = build_router(state);
        let (status, _) = delete(app, &format!("/api/players/{}", created.id)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_clear_roster_reports_count() {
        let state = test_state();
        state.repo.create(&faker_input()).await.unwrap();
        state
            .repo
            .create(&PlayerInput {
                ign: "Chovy".to_string(),
                ..PlayerInput::default()
            })
            .await
            .unwrap();

        let app = build_router(state);
        let (status, json) = delete(app, "/api/players").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["removed"], 2);
    }
}
