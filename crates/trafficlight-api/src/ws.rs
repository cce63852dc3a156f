//! `WebSocket` stream of traffic light state changes.
//!
//! Clients connect to `GET /ws/changes` and receive one JSON-encoded
//! [`StateChange`] text frame per committed transition, whether it came from
//! the cycle timer, a manual override, or a pedestrian crossing.
//!
//! A client that falls behind skips the changes it missed and resumes from
//! the newest one.

use std::ops::ControlFlow;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};
use trafficlight_core::StateChange;

use crate::state::AppState;

/// Upgrade the request and start streaming state changes.
///
/// # Route
///
/// `GET /ws/changes`
pub async fn ws_changes(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| stream_changes(socket, state))
}

/// Forward every broadcast change to the socket until either side closes.
async fn stream_changes(mut socket: WebSocket, state: Arc<AppState>) {
    debug!("WebSocket client connected");
    let mut rx = state.subscribe();

    loop {
        let flow = tokio::select! {
            change = rx.recv() => forward_change(&mut socket, change).await,
            frame = socket.recv() => answer_client(&mut socket, frame).await,
        };
        if flow.is_break() {
            debug!("WebSocket client disconnected");
            return;
        }
    }
}

/// Send one received change to the client.
async fn forward_change(
    socket: &mut WebSocket,
    change: Result<StateChange, RecvError>,
) -> ControlFlow<()> {
    match change {
        Ok(change) => {
            let json = match serde_json::to_string(&change) {
                Ok(json) => json,
                Err(e) => {
                    warn!(error = %e, "Failed to serialize state change");
                    return ControlFlow::Continue(());
                }
            };
            if socket.send(Message::Text(json.into())).await.is_err() {
                return ControlFlow::Break(());
            }
            ControlFlow::Continue(())
        }
        Err(RecvError::Lagged(skipped)) => {
            debug!(skipped, "WebSocket client lagged, skipping ahead");
            ControlFlow::Continue(())
        }
        Err(RecvError::Closed) => ControlFlow::Break(()),
    }
}

/// React to a frame sent by the client. Only pings and closes matter.
async fn answer_client(
    socket: &mut WebSocket,
    frame: Option<Result<Message, axum::Error>>,
) -> ControlFlow<()> {
    match frame {
        Some(Ok(Message::Ping(data))) => {
            if socket.send(Message::Pong(data)).await.is_err() {
                return ControlFlow::Break(());
            }
            ControlFlow::Continue(())
        }
        Some(Ok(Message::Close(_)) | Err(_)) | None => ControlFlow::Break(()),
        Some(Ok(_)) => ControlFlow::Continue(()),
    }
}
