//! Set session API handlers

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    db,
    error::{ApiError, ApiResult},
    models::{
        HistoryQuery, SetHistoryEntry, SetState, SetTrackRequest, TrackSuggestion,
        DEFAULT_RECENT_HISTORY,
    },
    AppState,
};

/// GET /sets/:session_id/history response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub session_id: String,
    pub history: Vec<SetHistoryEntry>,
}

/// PUT /sets/:session_id/suggestions request
#[derive(Debug, Deserialize)]
pub struct ReplaceSuggestionsRequest {
    pub suggestions: Vec<TrackSuggestion>,
}

fn validate_track(request: &SetTrackRequest) -> ApiResult<()> {
    if request.track_id.trim().is_empty() {
        return Err(ApiError::BadRequest("trackId is required".to_string()));
    }
    Ok(())
}

/// POST /sets
pub async fn create_session(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<SetState>)> {
    let session = db::set_sessions::create_session(&state.db).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /sets/:session_id
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<SetState>> {
    let session = db::set_sessions::require_session(&state.db, &session_id).await?;
    Ok(Json(session))
}

/// DELETE /sets/:session_id
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<StatusCode> {
    db::set_sessions::delete_session(&state.db, &session_id).await?;
    tracing::info!(session_id = %session_id, "Deleted set session");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /sets/:session_id/current
///
/// The previous current track moves into history.
pub async fn set_current_track(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Result<Json<SetTrackRequest>, JsonRejection>,
) -> ApiResult<Json<SetState>> {
    let Json(request) = payload?;
    validate_track(&request)?;

    let mut session = db::set_sessions::require_session(&state.db, &session_id).await?;
    let snapshot = request.into_snapshot();
    tracing::debug!(session_id = %session_id, track_id = %snapshot.track_id, "Setting current track");

    session.set_current_track(snapshot, setwise_common::time::now());
    db::set_sessions::save_session(&state.db, &session).await?;
    Ok(Json(session))
}

/// POST /sets/:session_id/history
pub async fn add_to_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Result<Json<SetTrackRequest>, JsonRejection>,
) -> ApiResult<Json<SetState>> {
    let Json(request) = payload?;
    validate_track(&request)?;

    let mut session = db::set_sessions::require_session(&state.db, &session_id).await?;
    let snapshot = request.into_snapshot();

    if session.add_to_history(&snapshot, setwise_common::time::now()) {
        db::set_sessions::save_session(&state.db, &session).await?;
    } else {
        tracing::debug!(
            session_id = %session_id,
            track_id = %snapshot.track_id,
            "Track already in history"
        );
    }
    Ok(Json(session))
}

/// GET /sets/:session_id/history?limit=N
pub async fn get_recent_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<HistoryResponse>> {
    let session = db::set_sessions::require_session(&state.db, &session_id).await?;
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_HISTORY);

    Ok(Json(HistoryResponse {
        history: session.recent_history(limit).to_vec(),
        session_id,
    }))
}

/// PUT /sets/:session_id/suggestions
pub async fn replace_suggestions(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Result<Json<ReplaceSuggestionsRequest>, JsonRejection>,
) -> ApiResult<Json<SetState>> {
    let Json(request) = payload?;

    let mut session = db::set_sessions::require_session(&state.db, &session_id).await?;
    session.replace_suggestions(request.suggestions, setwise_common::time::now());
    db::set_sessions::save_session(&state.db, &session).await?;
    Ok(Json(session))
}

/// Build set session routes
pub fn set_session_routes() -> Router<AppState> {
    Router::new()
        .route("/sets", post(create_session))
        .route("/sets/:session_id", get(get_session).delete(delete_session))
        .route("/sets/:session_id/current", post(set_current_track))
        .route(
            "/sets/:session_id/history",
            get(get_recent_history).post(add_to_history),
        )
        .route("/sets/:session_id/suggestions", put(replace_suggestions))
}
