//! Cue point API handlers
//!
//! POST /cue-points/analyze runs detection; the /tracks/:track_id/cue-points
//! routes store what the user keeps.

use std::collections::HashSet;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use super::require_id;
use crate::{
    db,
    error::{ApiError, ApiResult},
    models::{
        AddCuePointRequest, CuePoint, CuePointAnalysisRequest, CuePointAnalysisResponse,
        SaveCuePointsRequest, TrackCuePoints, UpdateCuePointRequest,
    },
    services::{compute_energy_curve, CuePointDetector},
    AppState,
};

/// GET /cue-points/tracks response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TracksWithCuePointsResponse {
    pub track_ids: Vec<String>,
}

fn validate_duration(duration: f64) -> ApiResult<()> {
    if !duration.is_finite() || duration <= 0.0 {
        return Err(ApiError::BadRequest(
            "duration must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

/// POST /cue-points/analyze
///
/// Suggest intro/drop/outro cue points from an optional waveform and BPM.
pub async fn analyze_cue_points(
    State(state): State<AppState>,
    payload: Result<Json<CuePointAnalysisRequest>, JsonRejection>,
) -> ApiResult<Json<CuePointAnalysisResponse>> {
    let Json(request) = payload?;

    let track_id = require_id(request.track_id, "trackId and duration are required")?;
    let duration = request
        .duration
        .ok_or_else(|| ApiError::BadRequest("trackId and duration are required".to_string()))?;
    validate_duration(duration)?;

    let params = db::parameters::load_assist_parameters(&state.db).await?;

    let waveform = request.waveform.unwrap_or_default();
    if waveform.is_unusable() {
        tracing::warn!(track_id = %track_id, "Ignoring waveform that is not a list of samples");
    }
    let samples = waveform.into_samples();
    let energy = compute_energy_curve(&samples);

    let cue_points = CuePointDetector::with_parameters(params.cue_detection).detect(
        duration,
        request.bpm,
        &energy,
        &state.cue_ids,
    );

    tracing::info!(
        track_id = %track_id,
        duration,
        bpm = ?request.bpm,
        samples = samples.len(),
        cue_count = cue_points.len(),
        "Analyzed cue points"
    );

    Ok(Json(CuePointAnalysisResponse {
        success: true,
        track_id,
        cue_points,
    }))
}

/// GET /tracks/:track_id/cue-points
pub async fn get_track_cue_points(
    State(state): State<AppState>,
    Path(track_id): Path<String>,
) -> ApiResult<Json<TrackCuePoints>> {
    db::cue_points::load_track_cue_points(&state.db, &track_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No cue points stored for track {}", track_id)))
}

/// PUT /tracks/:track_id/cue-points
///
/// Replace the stored cue points for a track.
pub async fn save_track_cue_points(
    State(state): State<AppState>,
    Path(track_id): Path<String>,
    payload: Result<Json<SaveCuePointsRequest>, JsonRejection>,
) -> ApiResult<Json<TrackCuePoints>> {
    let Json(request) = payload?;
    validate_duration(request.duration)?;

    let mut seen = HashSet::new();
    for cue in &request.cue_points {
        if !cue.time.is_finite() || cue.time < 0.0 || cue.time > request.duration {
            return Err(ApiError::BadRequest(format!(
                "Cue point {} time {} is outside 0..{}",
                cue.id, cue.time, request.duration
            )));
        }
        if !seen.insert(cue.id.as_str()) {
            return Err(ApiError::BadRequest(format!("Duplicate cue point id {}", cue.id)));
        }
    }

    let mut cue_points = request.cue_points;
    cue_points.sort_by(|a, b| a.time.total_cmp(&b.time));

    let record =
        db::cue_points::save_track_cue_points(&state.db, &track_id, request.duration, cue_points)
            .await?;

    tracing::info!(track_id = %track_id, cue_count = record.cue_points.len(), "Saved cue points");
    Ok(Json(record))
}

/// POST /tracks/:track_id/cue-points
pub async fn add_cue_point(
    State(state): State<AppState>,
    Path(track_id): Path<String>,
    payload: Result<Json<AddCuePointRequest>, JsonRejection>,
) -> ApiResult<Json<TrackCuePoints>> {
    let Json(request) = payload?;

    // Must stay unique across restarts, unlike analysis ids
    let id = request
        .id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| format!("{}-{}", request.cue_type.as_str(), Uuid::new_v4()));

    let cue = CuePoint {
        id,
        cue_type: request.cue_type,
        time: request.time,
        label: request.label,
    };

    let record = db::cue_points::add_cue_point(&state.db, &track_id, cue).await?;
    Ok(Json(record))
}

/// PATCH /tracks/:track_id/cue-points/:cue_id
pub async fn update_cue_point(
    State(state): State<AppState>,
    Path((track_id, cue_id)): Path<(String, String)>,
    payload: Result<Json<UpdateCuePointRequest>, JsonRejection>,
) -> ApiResult<Json<TrackCuePoints>> {
    let Json(request) = payload?;
    let record = db::cue_points::update_cue_point(&state.db, &track_id, &cue_id, request).await?;
    Ok(Json(record))
}

/// DELETE /tracks/:track_id/cue-points/:cue_id
pub async fn delete_cue_point(
    State(state): State<AppState>,
    Path((track_id, cue_id)): Path<(String, String)>,
) -> ApiResult<Json<TrackCuePoints>> {
    let record = db::cue_points::delete_cue_point(&state.db, &track_id, &cue_id).await?;
    Ok(Json(record))
}

/// GET /cue-points/tracks
pub async fn list_tracks_with_cue_points(
    State(state): State<AppState>,
) -> ApiResult<Json<TracksWithCuePointsResponse>> {
    let track_ids = db::cue_points::list_tracks_with_cue_points(&state.db).await?;
    Ok(Json(TracksWithCuePointsResponse { track_ids }))
}

/// Build cue point routes
pub fn cue_point_routes() -> Router<AppState> {
    Router::new()
        .route("/cue-points/analyze", post(analyze_cue_points))
        .route("/cue-points/tracks", get(list_tracks_with_cue_points))
        .route(
            "/tracks/:track_id/cue-points",
            get(get_track_cue_points)
                .put(save_track_cue_points)
                .post(add_cue_point),
        )
        .route(
            "/tracks/:track_id/cue-points/:cue_id",
            patch(update_cue_point).delete(delete_cue_point),
        )
}
