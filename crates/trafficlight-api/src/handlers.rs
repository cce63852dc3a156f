//! REST endpoint handlers for the control API.
//!
//! All handlers call into the [`TrafficLightService`] held by the shared
//! [`AppState`]. Text input is validated here, at the boundary; the core
//! only ever sees a [`TrafficLightState`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/status` | Current state and last-changed time |
//! | `POST` | `/manual?state=X` | Manual override to Red, Green, or Yellow |
//! | `POST` | `/pedestrian` | Run a pedestrian crossing, respond when done |
//!
//! [`TrafficLightService`]: trafficlight_core::TrafficLightService

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};
use tracing::{info, warn};
use trafficlight_core::TrafficLightState;

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `POST /manual`.
///
/// `state` is kept as raw text so an absent or unknown value produces our
/// own 400 body rather than the extractor's plain-text rejection.
#[derive(Debug, serde::Deserialize)]
pub struct ManualQuery {
    /// Requested state name (case-insensitive).
    pub state: Option<String>,
}

/// Body returned by the control endpoints.
#[derive(Debug, serde::Serialize)]
struct ControlResponse {
    /// Whether the operation succeeded.
    ok: bool,
    /// Human-readable confirmation.
    message: String,
    /// The state after the operation.
    state: TrafficLightState,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing the current light and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let light = state.service.status().await;
    let current = light.state();
    let last_changed = light.last_changed().to_rfc3339();
    let colour = match current {
        TrafficLightState::Red => "#f85149",
        TrafficLightState::Green => "#3fb950",
        TrafficLightState::Yellow => "#d29922",
    };

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Traffic Light Control</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; }}
        .lamp {{
            display: inline-block;
            width: 3rem;
            height: 3rem;
            border-radius: 50%;
            background: {colour};
            vertical-align: middle;
            margin-right: 1rem;
        }}
        .state {{ font-size: 1.5rem; font-weight: bold; vertical-align: middle; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        code {{ color: #7ee787; }}
    </style>
</head>
<body>
    <h1>Traffic Light Control</h1>
    <p><span class="lamp"></span><span class="state">{current}</span></p>
    <p>Last changed: {last_changed}</p>
    <h2>API Endpoints</h2>
    <ul>
        <li><code>GET</code> <a href="/status">/status</a> -- Current state</li>
        <li><code>POST</code> /manual?state=Red|Green|Yellow -- Manual override</li>
        <li><code>POST</code> /pedestrian -- Pedestrian crossing</li>
        <li><code>GET</code> /ws/changes -- Live state change stream (WebSocket)</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /status
// ---------------------------------------------------------------------------

/// Return the current state and the time it was set.
pub async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.service.status().await)
}

// ---------------------------------------------------------------------------
// POST /manual
// ---------------------------------------------------------------------------

/// Force the light to the requested state.
///
/// The automatic cycle keeps running and continues from this state.
pub async fn manual(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ManualQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let raw = params.state.ok_or(ApiError::MissingParameter("state"))?;
    let requested = raw.parse::<TrafficLightState>().inspect_err(|e| {
        warn!(error = %e, "Rejected manual override");
    })?;

    let light = state.service.set_manual(requested).await;
    info!(state = %light.state(), "Manual override");

    Ok(Json(ControlResponse {
        ok: true,
        message: format!("Manual override: {}", light.state()),
        state: light.state(),
    }))
}

// ---------------------------------------------------------------------------
// POST /pedestrian
// ---------------------------------------------------------------------------

/// Run a pedestrian crossing and respond once traffic has resumed.
///
/// The crossing runs on its own task so that a client disconnecting
/// mid-wait does not cut the sequence short.
pub async fn pedestrian(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let service = Arc::clone(&state.service);
    let light = tokio::spawn(async move { service.pedestrian_cross().await })
        .await
        .map_err(|e| ApiError::Internal(format!("pedestrian crossing task failed: {e}")))?;

    Ok(Json(ControlResponse {
        ok: true,
        message: "Pedestrian crossing complete, traffic resumed".to_owned(),
        state: light.state(),
    }))
}
