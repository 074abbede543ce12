//! Parameter management API handlers
//!
//! GET /parameters/global, POST /parameters/global

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, ApiResult},
    models::AssistParameters,
    AppState,
};

/// GET /parameters/global response
#[derive(Debug, Serialize)]
pub struct GlobalParametersResponse {
    #[serde(flatten)]
    pub parameters: AssistParameters,
}

/// POST /parameters/global request (partial updates)
#[derive(Debug, Default, Deserialize)]
pub struct UpdateParametersRequest {
    pub intro_energy_threshold: Option<f64>,
    pub intro_scan_fraction: Option<f64>,
    pub intro_scan_max_segments: Option<usize>,
    pub drop_peak_threshold: Option<f64>,
    pub drop_search_end_fraction: Option<f64>,
    pub outro_start_fraction: Option<f64>,
    pub outro_drop_ratio: Option<f64>,
    pub max_suggestions: Option<usize>,
    pub recent_artist_window: Option<usize>,
}

impl UpdateParametersRequest {
    fn apply(self, parameters: &mut AssistParameters) {
        let cue = &mut parameters.cue_detection;
        if let Some(val) = self.intro_energy_threshold {
            cue.intro_energy_threshold = val;
        }
        if let Some(val) = self.intro_scan_fraction {
            cue.intro_scan_fraction = val;
        }
        if let Some(val) = self.intro_scan_max_segments {
            cue.intro_scan_max_segments = val;
        }
        if let Some(val) = self.drop_peak_threshold {
            cue.drop_peak_threshold = val;
        }
        if let Some(val) = self.drop_search_end_fraction {
            cue.drop_search_end_fraction = val;
        }
        if let Some(val) = self.outro_start_fraction {
            cue.outro_start_fraction = val;
        }
        if let Some(val) = self.outro_drop_ratio {
            cue.outro_drop_ratio = val;
        }

        let suggestions = &mut parameters.suggestions;
        if let Some(val) = self.max_suggestions {
            suggestions.max_suggestions = val;
        }
        if let Some(val) = self.recent_artist_window {
            suggestions.recent_artist_window = val;
        }
    }
}

/// POST /parameters/global response
#[derive(Debug, Serialize)]
pub struct UpdateParametersResponse {
    pub status: String,
    pub parameters: AssistParameters,
}

/// GET /parameters/global
pub async fn get_global_parameters(
    State(state): State<AppState>,
) -> ApiResult<Json<GlobalParametersResponse>> {
    let parameters = crate::db::parameters::load_assist_parameters(&state.db).await?;

    tracing::debug!(?parameters, "Get global parameters from database");

    Ok(Json(GlobalParametersResponse { parameters }))
}

/// POST /parameters/global
///
/// Update global parameters (partial update). Nothing is saved if the
/// merged result is invalid.
pub async fn update_global_parameters(
    State(state): State<AppState>,
    payload: Result<Json<UpdateParametersRequest>, JsonRejection>,
) -> ApiResult<Json<UpdateParametersResponse>> {
    let Json(request) = payload?;
    tracing::info!(?request, "Update global parameters");

    let mut parameters = crate::db::parameters::load_assist_parameters(&state.db).await?;
    request.apply(&mut parameters);
    parameters.validate().map_err(ApiError::BadRequest)?;

    crate::db::parameters::save_assist_parameters(&state.db, &parameters).await?;

    Ok(Json(UpdateParametersResponse {
        status: "updated".to_string(),
        parameters,
    }))
}

/// Build parameter management routes
pub fn parameter_routes() -> Router<AppState> {
    Router::new().route(
        "/parameters/global",
        get(get_global_parameters).post(update_global_parameters),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_update_touches_only_given_fields() {
        let mut params = AssistParameters::default();
        UpdateParametersRequest {
            drop_peak_threshold: Some(0.75),
            max_suggestions: Some(8),
            ..Default::default()
        }
        .apply(&mut params);

        assert_eq!(params.cue_detection.drop_peak_threshold, 0.75);
        assert_eq!(params.suggestions.max_suggestions, 8);
        assert_eq!(params.cue_detection.intro_energy_threshold, 0.3);
        assert_eq!(params.suggestions.recent_artist_window, 5);
    }
}
