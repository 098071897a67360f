use crate::config::{RuntimeConfig, SharedRuntimeConfig};
use crate::state::{StatsSnapshot, WorldEngine};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError};
use tracing::info;

/// State for the admin API.
#[derive(Clone)]
pub struct AdminAppState {
    pub engine: Arc<WorldEngine>,
    pub runtime_config: SharedRuntimeConfig,
}

/// Partial update body — only fields present in the request are changed.
#[derive(Deserialize)]
pub struct RuntimeConfigUpdate {
    pub body_size_limit_bytes: Option<usize>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn create_admin_router(state: AdminAppState) -> Router {
    Router::new()
        .route("/api/stats", get(get_stats))
        .route("/api/admin/config", get(get_config).put(put_config))
        .with_state(Arc::new(state))
}

/// GET /api/stats — engine counters.
async fn get_stats(State(state): State<Arc<AdminAppState>>) -> Json<StatsSnapshot> {
    Json(state.engine.stats_snapshot())
}

/// GET /api/admin/config — returns current RuntimeConfig.
async fn get_config(State(state): State<Arc<AdminAppState>>) -> Json<RuntimeConfig> {
    let cfg = state
        .runtime_config
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    Json(cfg)
}

/// PUT /api/admin/config — partial update, effective immediately.
async fn put_config(
    State(state): State<Arc<AdminAppState>>,
    Json(update): Json<RuntimeConfigUpdate>,
) -> Response {
    if update.body_size_limit_bytes == Some(0) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "body_size_limit_bytes must be greater than zero".to_string(),
            }),
        )
            .into_response();
    }

    let updated = {
        let mut cfg = state
            .runtime_config
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(limit) = update.body_size_limit_bytes {
            cfg.body_size_limit_bytes = limit;
        }
        cfg.clone()
    };

    info!(
        body_size_limit_bytes = updated.body_size_limit_bytes,
        "Runtime config updated"
    );
    Json(updated).into_response()
}
