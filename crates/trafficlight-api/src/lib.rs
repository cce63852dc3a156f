//! HTTP control API for the traffic light service.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **REST endpoints** to read the light (`GET /status`), override it
//!   (`POST /manual?state=X`), and run a pedestrian crossing
//!   (`POST /pedestrian`)
//! - **`WebSocket` endpoint** (`/ws/changes`) streaming every committed
//!   state change
//! - **Minimal HTML page** (`GET /`) showing the current light
//!
//! # Architecture
//!
//! The router holds an [`AppState`] wrapping the process's single
//! [`TrafficLightService`]. Handlers validate text input, then call the
//! service; all locking and timing live in `trafficlight-core`.
//!
//! [`TrafficLightService`]: trafficlight_core::TrafficLightService

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
