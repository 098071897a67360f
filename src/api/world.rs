use crate::config::SharedRuntimeConfig;
use crate::state::{FieldMap, World, WorldEngine};
use crate::subscription::{decode_fields, decode_world};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::{Arc, PoisonError};
use tracing::{info, warn};

/// Shared state for the world API
#[derive(Clone)]
pub struct WorldAppState {
    pub engine: Arc<WorldEngine>,
    pub runtime_config: SharedRuntimeConfig,
}

impl WorldAppState {
    fn body_size_limit(&self) -> usize {
        self.runtime_config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .body_size_limit_bytes
    }

    /// Reject oversized bodies before decoding
    fn check_body(&self, body: &Bytes) -> Result<(), AppError> {
        if body.len() > self.body_size_limit() {
            return Err(AppError::PayloadTooLarge);
        }
        Ok(())
    }
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create world API router
pub fn create_world_router(state: WorldAppState) -> Router {
    Router::new()
        .route(
            "/entity/:name",
            get(get_entity).post(update_entity).put(replace_entity),
        )
        .route("/world", get(get_world).post(load_world))
        .route("/clear", get(clear_world).post(clear_world))
        // Body size is governed by RuntimeConfig alone
        .layer(DefaultBodyLimit::disable())
        .with_state(Arc::new(state))
}

/// GET /entity/:name - Current field mapping (empty object if unknown)
async fn get_entity(
    State(state): State<Arc<WorldAppState>>,
    Path(name): Path<String>,
) -> Json<FieldMap> {
    Json(state.engine.get(&name))
}

/// POST /entity/:name - Create (replace) or update (per-field merge)
async fn update_entity(
    State(state): State<Arc<WorldAppState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<FieldMap>, AppError> {
    state.check_body(&body)?;
    let fields = decode_fields(&body).map_err(|e| AppError::ValidationError(e.to_string()))?;

    let notifications = state.engine.apply_update(&name, fields);
    info!(entity = %name, notifications = notifications.len(), "Entity updated");

    Ok(Json(state.engine.get(&name)))
}

/// PUT /entity/:name - Replace the whole entity
async fn replace_entity(
    State(state): State<Arc<WorldAppState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<FieldMap>, AppError> {
    state.check_body(&body)?;
    let fields = decode_fields(&body).map_err(|e| AppError::ValidationError(e.to_string()))?;

    state.engine.replace(&name, fields);
    info!(entity = %name, "Entity replaced");

    Ok(Json(state.engine.get(&name)))
}

/// GET /world - Whole world
async fn get_world(State(state): State<Arc<WorldAppState>>) -> Json<World> {
    Json(state.engine.snapshot())
}

/// POST /world - Replace the whole world with the request body
async fn load_world(
    State(state): State<Arc<WorldAppState>>,
    body: Bytes,
) -> Result<Json<World>, AppError> {
    state.check_body(&body)?;
    let world = decode_world(&body).map_err(|e| AppError::ValidationError(e.to_string()))?;

    let count = world.len();
    state.engine.load_world(world);
    info!(entities = count, "World loaded");

    Ok(Json(state.engine.snapshot()))
}

/// GET|POST /clear - Empty the world
async fn clear_world(State(state): State<Arc<WorldAppState>>) -> Json<World> {
    state.engine.clear();
    Json(state.engine.snapshot())
}

/// Application error types
#[derive(Debug)]
enum AppError {
    ValidationError(String),
    PayloadTooLarge,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => {
                warn!(error = %msg, "Rejected malformed request body");
                (StatusCode::BAD_REQUEST, msg)
            }
            AppError::PayloadTooLarge => {
                (StatusCode::PAYLOAD_TOO_LARGE, "payload too large".to_string())
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status, body).into_response()
    }
}
