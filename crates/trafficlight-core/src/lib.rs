//! Traffic light state machine, cycle timer, and pedestrian sequencing.
//!
//! This crate owns the only stateful part of the system: a single traffic
//! light that cycles Red, Green, Yellow on a fixed timer, accepts manual
//! overrides, and runs timed pedestrian crossings. The HTTP layer lives in
//! `trafficlight-api` and only calls into [`TrafficLightService`].
//!
//! # Modules
//!
//! - [`light`] -- [`TrafficLightState`] and the [`TrafficLight`] entity.
//! - [`service`] -- [`TrafficLightService`], the lock-guarded orchestrator
//!   and its background cycle task.
//! - [`config`] -- Configuration loading from `trafficlight-config.yaml`
//!   into strongly-typed structs.

pub mod config;
pub mod light;
pub mod service;

pub use config::{ConfigError, TimingConfig, TrafficLightConfig};
pub use light::{LightError, TrafficLight, TrafficLightState};
pub use service::{ChangeSource, ServiceError, StateChange, TrafficLightService};
