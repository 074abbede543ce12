//! Set suggestion API handler

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};

use crate::{
    db,
    error::{ApiError, ApiResult},
    models::{SetSuggestionRequest, SetSuggestionResponse},
    services::SetSuggester,
    AppState,
};

/// POST /set/suggest
///
/// With a `sessionId`, missing `currentTrack` and `history` come from the
/// session and the ranked list is written back to it.
pub async fn suggest_next_tracks(
    State(state): State<AppState>,
    payload: Result<Json<SetSuggestionRequest>, JsonRejection>,
) -> ApiResult<Json<SetSuggestionResponse>> {
    let Json(request) = payload?;

    let all_tracks = request
        .all_tracks
        .filter(|tracks| !tracks.is_empty())
        .ok_or_else(|| ApiError::BadRequest("allTracks must be a non-empty array".to_string()))?;

    let mut session = match request.session_id.as_deref() {
        Some(session_id) => Some(db::set_sessions::require_session(&state.db, session_id).await?),
        None => None,
    };

    let reference = request
        .current_track
        .or_else(|| session.as_ref().and_then(|s| s.reference_track()));
    // Session history leaves out the playing track, which is excluded separately
    let (history, playing) = match (request.history, session.as_ref()) {
        (Some(history), _) => (history, None),
        (None, Some(session)) => (session.suggestion_history(), session.current_track_id()),
        (None, None) => (Vec::new(), None),
    };

    let params = db::parameters::load_assist_parameters(&state.db).await?;
    let suggestions = SetSuggester::with_parameters(params.suggestions).suggest_next_excluding(
        reference.as_ref(),
        &history,
        &all_tracks,
        playing,
    );

    tracing::info!(
        candidates = all_tracks.len(),
        history = history.len(),
        has_reference = reference.is_some(),
        suggestion_count = suggestions.len(),
        "Suggested next tracks"
    );

    if let Some(session) = session.as_mut() {
        session.replace_suggestions(suggestions.clone(), setwise_common::time::now());
        db::set_sessions::save_session(&state.db, session).await?;
    }

    Ok(Json(SetSuggestionResponse {
        success: true,
        suggestions,
    }))
}

/// Build suggestion routes
pub fn suggestion_routes() -> Router<AppState> {
    Router::new().route("/set/suggest", post(suggest_next_tracks))
}
