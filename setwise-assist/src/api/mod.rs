//! HTTP API handlers for setwise-assist

pub mod cue_points;
pub mod health;
pub mod parameters;
pub mod set_sessions;
pub mod suggestions;
pub mod tags;

pub use cue_points::cue_point_routes;
pub use health::health_routes;
pub use parameters::parameter_routes;
pub use set_sessions::set_session_routes;
pub use suggestions::suggestion_routes;
pub use tags::tag_routes;

use crate::error::ApiError;

/// Reject missing or blank identifiers
pub(crate) fn require_id(value: Option<String>, message: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(message.to_string()))
}
