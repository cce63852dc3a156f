//! Shared application state for the control API.
//!
//! [`AppState`] is the dependency the binary injects into the router. It
//! holds the one [`TrafficLightService`] for the process; handlers never
//! reach the light any other way.

use std::sync::Arc;

use tokio::sync::broadcast;
use trafficlight_core::{StateChange, TrafficLightService};

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The traffic light service every handler calls into.
    pub service: Arc<TrafficLightService>,
}

impl AppState {
    /// Create application state around an existing service.
    pub const fn new(service: Arc<TrafficLightService>) -> Self {
        Self { service }
    }

    /// Subscribe to committed state changes.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.service.subscribe()
    }
}
