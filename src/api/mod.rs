// HTTP and WebSocket APIs

pub mod admin;
pub mod websocket;
pub mod world;

pub use admin::{create_admin_router, AdminAppState};
pub use websocket::{create_ws_router, ws_handler, WsAppState};
pub use world::{create_world_router, WorldAppState};

use crate::config::SharedRuntimeConfig;
use crate::state::WorldEngine;
use axum::{response::Redirect, routing::get, Router};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

/// Build the full application router
///
/// `/` redirects to the bundled client at `/static/index.html`; files under
/// `static_dir` are served at `/static`.
pub fn create_app(
    engine: Arc<WorldEngine>,
    runtime_config: SharedRuntimeConfig,
    static_dir: impl AsRef<Path>,
) -> Router {
    let world = create_world_router(WorldAppState {
        engine: Arc::clone(&engine),
        runtime_config: runtime_config.clone(),
    });
    let ws = create_ws_router(Arc::new(WsAppState {
        engine: Arc::clone(&engine),
    }));
    let admin = create_admin_router(AdminAppState {
        engine,
        runtime_config,
    });

    Router::new()
        .route("/", get(|| async { Redirect::to("/static/index.html") }))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .merge(world)
        .merge(ws)
        .merge(admin)
        .layer(CorsLayer::permissive())
}
