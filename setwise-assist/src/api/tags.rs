//! Tag API handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};

use super::require_id;
use crate::{
    db,
    error::{ApiError, ApiResult},
    models::{
        SaveTagsRequest, TagSuggestionRequest, TagSuggestionResponse, TaggedTrack,
        UntaggedTracksRequest, UntaggedTracksResponse,
    },
    services::{infer_tags, tag_inference::MAX_INSTRUMENTATION, TrackMetadata},
    AppState,
};

/// POST /tags/suggest
pub async fn suggest_tags(
    payload: Result<Json<TagSuggestionRequest>, JsonRejection>,
) -> ApiResult<Json<TagSuggestionResponse>> {
    let Json(request) = payload?;

    let track_id = require_id(request.track_id, "trackId and title are required")?;
    let title = request
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("trackId and title are required".to_string()))?;

    let suggestions = infer_tags(&TrackMetadata {
        title: &title,
        genre: request.genre.as_deref(),
        bpm: request.bpm,
    });

    tracing::info!(
        track_id = %track_id,
        energy = %suggestions.energy,
        mood = %suggestions.mood,
        "Suggested tags"
    );

    Ok(Json(TagSuggestionResponse {
        success: true,
        track_id,
        suggestions,
    }))
}

/// GET /tracks/:track_id/tags
pub async fn get_track_tags(
    State(state): State<AppState>,
    Path(track_id): Path<String>,
) -> ApiResult<Json<TaggedTrack>> {
    db::tags::load_track_tags(&state.db, &track_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No tags stored for track {}", track_id)))
}

/// PUT /tracks/:track_id/tags
pub async fn save_track_tags(
    State(state): State<AppState>,
    Path(track_id): Path<String>,
    payload: Result<Json<SaveTagsRequest>, JsonRejection>,
) -> ApiResult<Json<TaggedTrack>> {
    let Json(request) = payload?;

    if request.tags.instrumentation.len() > MAX_INSTRUMENTATION {
        return Err(ApiError::BadRequest(format!(
            "instrumentation may list at most {} entries",
            MAX_INSTRUMENTATION
        )));
    }

    let record =
        db::tags::save_track_tags(&state.db, &track_id, request.tags, request.confirmed).await?;
    tracing::info!(track_id = %track_id, confirmed = record.confirmed, "Saved tags");
    Ok(Json(record))
}

/// POST /tracks/:track_id/tags/confirm
pub async fn confirm_track_tags(
    State(state): State<AppState>,
    Path(track_id): Path<String>,
) -> ApiResult<Json<TaggedTrack>> {
    let record = db::tags::confirm_track_tags(&state.db, &track_id).await?;
    Ok(Json(record))
}

/// POST /tags/untagged
pub async fn list_untagged_tracks(
    State(state): State<AppState>,
    payload: Result<Json<UntaggedTracksRequest>, JsonRejection>,
) -> ApiResult<Json<UntaggedTracksResponse>> {
    let Json(request) = payload?;
    let untagged = db::tags::untagged_tracks(&state.db, &request.track_ids).await?;
    Ok(Json(UntaggedTracksResponse { untagged }))
}

/// Build tag routes
pub fn tag_routes() -> Router<AppState> {
    Router::new()
        .route("/tags/suggest", post(suggest_tags))
        .route("/tags/untagged", post(list_untagged_tracks))
        .route(
            "/tracks/:track_id/tags",
            get(get_track_tags).put(save_track_tags),
        )
        .route("/tracks/:track_id/tags/confirm", post(confirm_track_tags))
}
