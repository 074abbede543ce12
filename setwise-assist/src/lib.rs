//! setwise-assist library interface
//!
//! Track-assistance heuristics (cue points, next-track suggestions, tag
//! inference) exposed over HTTP, plus persistence for user-confirmed
//! results. Exposes public APIs for integration testing.

pub mod api;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::SqlitePool;
use tokio::sync::RwLock;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::error::InternalFault;
use crate::services::CueIdGenerator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Source of cue point ids for analysis and manual cue creation
    pub cue_ids: Arc<CueIdGenerator>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last internal error, reported by /health
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            cue_ids: Arc::new(CueIdGenerator::new()),
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}

/// Remember the most recent 5xx for diagnostics
async fn record_internal_faults(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if let Some(InternalFault(message)) = response.extensions().get::<InternalFault>() {
        *state.last_error.write().await = Some(message.clone());
    }
    response
}

/// Turn a handler panic into a generic 500
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!(panic = %detail, "Request handler panicked");

    let body = Json(json!({
        "error": {
            "code": "INTERNAL_ERROR",
            "message": "Internal server error",
        }
    }));
    let mut response = (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
    response
        .extensions_mut()
        .insert(InternalFault(format!("panic: {}", detail)));
    response
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::cue_point_routes())
        .merge(api::suggestion_routes())
        .merge(api::set_session_routes())
        .merge(api::tag_routes())
        .merge(api::parameter_routes())
        .merge(api::health_routes())
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            record_internal_faults,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
