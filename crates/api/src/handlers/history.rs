//! Handlers for the `/history` resource.
//!
//! Read-only views over the local history store, plus generation
//! session creation so batch imports can group their cards.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use ankibridge_db::models::analysis::DeckAnalysisRow;
use ankibridge_db::models::card::{GeneratedCardRow, ValidationStats};
use ankibridge_db::models::generation::{CreateGeneration, GenerationRow, GenerationSummary};
use ankibridge_db::repositories::{AnalysisRepo, CardRepo, GenerationRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 500;

fn clamp_limit(limit: Option<i64>) -> AppResult<i64> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    if limit < 1 || limit > MAX_LIMIT {
        return Err(AppError::BadRequest(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }
    Ok(limit)
}

/// Query parameters for the generation history listing.
#[derive(Debug, Deserialize)]
pub struct GenerationsParams {
    pub source_type: Option<String>,
    pub limit: Option<i64>,
}

/// GET /api/v1/history/generations?source_type=&limit=
///
/// Generation sessions with their card counts, newest first.
pub async fn list_generations(
    State(state): State<AppState>,
    Query(params): Query<GenerationsParams>,
) -> AppResult<Json<DataResponse<Vec<GenerationSummary>>>> {
    let limit = clamp_limit(params.limit)?;
    let rows =
        GenerationRepo::history(&state.pool, params.source_type.as_deref(), limit).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// POST /api/v1/history/generations
///
/// Open a generation session. Cards created afterwards can reference
/// its id to be grouped under it.
pub async fn create_generation(
    State(state): State<AppState>,
    Json(body): Json<CreateGeneration>,
) -> AppResult<(StatusCode, Json<DataResponse<GenerationRow>>)> {
    if body.source_type.trim().is_empty() {
        return Err(AppError::BadRequest(
            "source_type must not be empty".to_string(),
        ));
    }
    let row = GenerationRepo::create(&state.pool, &body).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: row })))
}

/// Query parameters for the recent cards listing.
#[derive(Debug, Deserialize)]
pub struct CardsParams {
    pub limit: Option<i64>,
    /// When set, return cards generated from this source instead.
    pub source_path: Option<String>,
}

/// GET /api/v1/history/cards?limit= (or ?source_path=)
pub async fn list_cards(
    State(state): State<AppState>,
    Query(params): Query<CardsParams>,
) -> AppResult<Json<DataResponse<Vec<GeneratedCardRow>>>> {
    let rows = match params.source_path.as_deref() {
        Some(source_path) => CardRepo::by_source(&state.pool, source_path).await?,
        None => CardRepo::recent(&state.pool, clamp_limit(params.limit)?).await?,
    };
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/history/validation-stats
///
/// Aggregate warning statistics across all recorded cards.
pub async fn validation_stats(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<ValidationStats>>> {
    let stats = CardRepo::validation_stats(&state.pool).await?;
    Ok(Json(DataResponse { data: stats }))
}

/// Query parameters for the analysis history listing.
#[derive(Debug, Deserialize)]
pub struct AnalysesParams {
    pub deck: Option<String>,
    pub limit: Option<i64>,
}

/// GET /api/v1/history/analyses?deck=&limit=
pub async fn list_analyses(
    State(state): State<AppState>,
    Query(params): Query<AnalysesParams>,
) -> AppResult<Json<DataResponse<Vec<DeckAnalysisRow>>>> {
    let limit = clamp_limit(params.limit)?;
    let rows = AnalysisRepo::history(&state.pool, params.deck.as_deref(), limit).await?;
    Ok(Json(DataResponse { data: rows }))
}
