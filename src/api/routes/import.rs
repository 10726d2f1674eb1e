use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::sync::{ImportOptions, ImportService};

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub tournament: String,
    pub year: String,
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub players_imported: u32,
    pub games_processed: u32,
    pub message: String,
}

pub async fn run_import(
    State(state): State<AppState>,
    Json(request): Json<ImportRequest>,
) -> Result<Json<ImportResponse>, ApiError> {
    let tournament = request.tournament.trim().to_string();
    let year = request.year.trim().to_string();

    // Reject before any upstream call is attempted.
    if tournament.is_empty() || year.is_empty() {
        return Err(ApiError::Validation(
            "tournament and year are required".to_string(),
        ));
    }

    let service = ImportService::new(state.leaguepedia.clone(), state.repo.clone());
    let report = service
        .import(&ImportOptions {
            tournament: tournament.clone(),
            year: year.clone(),
            dry_run: request.dry_run,
        })
        .await?;

    Ok(Json(ImportResponse {
        players_imported: report.players_imported,
        games_processed: report.games_processed,
        message: format!(
            "Imported {} players from {} game records ({} {})",
            report.players_imported, report.games_processed, tournament, year
        ),
    }))
}

#[derive(Debug, Serialize)]
pub struct ConnectionTestResponse {
    pub connected: bool,
}

pub async fn test_connection(
    State(state): State<AppState>,
) -> Result<Json<ConnectionTestResponse>, ApiError> {
    if state.leaguepedia.test_connection().await {
        Ok(Json(ConnectionTestResponse { connected: true }))
    } else {
        Err(ApiError::Upstream(
            "Leaguepedia API is not reachable".to_string(),
        ))
    }
}

#[derive(Debug, Deserialize)]
pub struct TournamentsParams {
    pub year: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TournamentsResponse {
    pub year: String,
    pub tournaments: Vec<String>,
}

pub async fn list_tournaments(
    State(state): State<AppState>,
    Query(params): Query<TournamentsParams>,
) -> Result<Json<TournamentsResponse>, ApiError> {
    let year = params
        .year
        .unwrap_or_else(|| state.import_defaults.year.clone());

    let tournaments = state.leaguepedia.get_tournaments(&year).await?;
    Ok(Json(TournamentsResponse { year, tournaments }))
}
