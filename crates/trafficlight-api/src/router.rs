//! Axum router construction for the control API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`] with
//! request tracing and permissive CORS.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the control API.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /status` -- current state and last-changed time
/// - `POST /manual?state=X` -- manual override
/// - `POST /pedestrian` -- pedestrian crossing (responds when complete)
/// - `GET /ws/changes` -- `WebSocket` state change stream
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/status", get(handlers::status))
        .route("/manual", post(handlers::manual))
        .route("/pedestrian", post(handlers::pedestrian))
        .route("/ws/changes", get(ws::ws_changes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
