//! REST API endpoints.
//!
//! Axum-based HTTP API for the player roster, dashboard statistics, and
//! Leaguepedia import.

pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::models::ValidationError;
use crate::storage::StorageError;
use crate::sync::ImportError;
use state::AppState;

/// API error types, mapped onto HTTP statuses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => ApiError::NotFound("player not found".to_string()),
            StorageError::DuplicateIgn(_) => ApiError::Conflict(err.to_string()),
            StorageError::Database(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::NoData { .. } => ApiError::BadRequest(err.to_string()),
            ImportError::Storage(inner) => inner.into(),
            _ => ApiError::Upstream(err.to_string()),
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/players",
            get(routes::players::list_players)
                .post(routes::players::create_player)
                .delete(routes::players::clear_players),
        )
        .route(
            "/api/players/:id",
            get(routes::players::get_player)
                .put(routes::players::update_player)
                .delete(routes::players::delete_player),
        )
        .route(
            "/api/players/:id/profile",
            get(routes::players::player_profile),
        )
        .route("/api/stats", get(routes::stats::summary))
        .route("/api/stats/roles", get(routes::stats::role_breakdown))
        .route("/api/stats/teams", get(routes::stats::team_breakdown))
        .route("/api/stats/top/winrate", get(routes::stats::top_by_win_rate))
        .route("/api/stats/top/kda", get(routes::stats::top_by_kda))
        .route("/api/import", post(routes::import::run_import))
        .route("/api/import/test", get(routes::import::test_connection))
        .route(
            "/api/import/tournaments",
            get(routes::import::list_tournaments),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
