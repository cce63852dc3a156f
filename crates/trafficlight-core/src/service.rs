//! The traffic light service: one light, one lock, one cycle timer.
//!
//! [`TrafficLightService`] owns the single [`TrafficLight`] and guards it
//! with a [`tokio::sync::Mutex`]. Every mutation (automatic advance, manual
//! override, either step of a pedestrian crossing) takes the lock for the
//! duration of one state change and nothing longer. No lock is ever held
//! across the pedestrian wait.
//!
//! # Concurrency
//!
//! - At most one mutation is in flight at any time.
//! - The relative order of concurrent writers is lock acquisition order,
//!   which callers must treat as undefined.
//! - A manual override does not pause the cycle timer. The next automatic
//!   advance continues from whatever state the override left.
//! - A pedestrian crossing can interleave with both the timer and manual
//!   overrides between its two steps.
//!
//! Every committed transition is published as a [`StateChange`] on a
//! broadcast channel, sent while the lock is still held so subscribers see
//! changes in commit order.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::config::TimingConfig;
use crate::light::{TrafficLight, TrafficLightState};

/// Capacity of the state change broadcast channel.
///
/// A subscriber that falls further behind than this skips to the newest
/// change.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Errors that can occur when constructing the service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The timing configuration cannot drive a timer (e.g. a zero period).
    #[error("invalid timing configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// What caused a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeSource {
    /// The periodic cycle timer.
    Automatic,
    /// A caller-directed override.
    Manual,
    /// One of the two steps of a pedestrian crossing.
    Pedestrian,
}

/// A committed transition, published to every subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    /// The state the light changed to.
    pub state: TrafficLightState,
    /// When the change was stamped.
    pub changed_at: DateTime<Utc>,
    /// What caused the change.
    pub source: ChangeSource,
}

/// Owns the traffic light and serializes every mutation to it.
///
/// Construct one per process, wrap it in [`Arc`], and hand clones to the
/// HTTP layer and to [`spawn_cycle`](Self::spawn_cycle).
#[derive(Debug)]
pub struct TrafficLightService {
    /// The light. Every read and write goes through this lock.
    light: Mutex<TrafficLight>,
    /// Period of the automatic cycle.
    cycle_interval: Duration,
    /// How long a pedestrian crossing holds Red.
    pedestrian_wait: Duration,
    /// Broadcast sender for committed transitions.
    changes: broadcast::Sender<StateChange>,
}

impl TrafficLightService {
    /// Create a service with a fresh Red light.
    ///
    /// The cycle timer is not started; call [`spawn_cycle`](Self::spawn_cycle).
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidConfig`] if either interval is zero.
    pub fn new(timing: &TimingConfig) -> Result<Self, ServiceError> {
        let cycle_interval = timing.cycle_interval();
        let pedestrian_wait = timing.pedestrian_wait();

        if cycle_interval.is_zero() {
            return Err(ServiceError::InvalidConfig {
                reason: "cycle interval must be greater than zero".to_owned(),
            });
        }
        if pedestrian_wait.is_zero() {
            return Err(ServiceError::InvalidConfig {
                reason: "pedestrian wait must be greater than zero".to_owned(),
            });
        }

        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        Ok(Self {
            light: Mutex::new(TrafficLight::new()),
            cycle_interval,
            pedestrian_wait,
            changes,
        })
    }

    /// Period of the automatic cycle.
    pub const fn cycle_interval(&self) -> Duration {
        self.cycle_interval
    }

    /// How long a pedestrian crossing holds Red.
    pub const fn pedestrian_wait(&self) -> Duration {
        self.pedestrian_wait
    }

    /// A snapshot of the light, taken under the lock.
    pub async fn status(&self) -> TrafficLight {
        *self.light.lock().await
    }

    /// Force the light to `state`. The cycle timer keeps running.
    ///
    /// Returns the snapshot committed by this call.
    pub async fn set_manual(&self, state: TrafficLightState) -> TrafficLight {
        self.commit(ChangeSource::Manual, |_| state).await
    }

    /// Move the light one step along Red, Green, Yellow, Red.
    ///
    /// This is what the cycle timer calls on each firing.
    pub async fn advance(&self) -> TrafficLight {
        self.commit(ChangeSource::Automatic, TrafficLightState::next)
            .await
    }

    /// Run the pedestrian crossing sequence: force Red, wait, force Green.
    ///
    /// The lock is released during the wait, so other writers may change
    /// the light in between. Returns once Green has been committed. The
    /// wait always runs to completion; there is no cancellation.
    pub async fn pedestrian_cross(&self) -> TrafficLight {
        self.commit(ChangeSource::Pedestrian, |_| TrafficLightState::Red)
            .await;
        info!(wait = ?self.pedestrian_wait, "Pedestrian crossing");

        tokio::time::sleep(self.pedestrian_wait).await;

        let light = self
            .commit(ChangeSource::Pedestrian, |_| TrafficLightState::Green)
            .await;
        info!("Traffic resumed");
        light
    }

    /// Subscribe to committed transitions.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.changes.subscribe()
    }

    /// Start the automatic cycle on a background Tokio task.
    ///
    /// The first advance happens one full period after the call. The task
    /// runs until the returned handle is aborted or the runtime shuts down.
    pub fn spawn_cycle(self: &Arc<Self>) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move { service.run_cycle().await })
    }

    /// Drive the automatic cycle forever on the current task.
    ///
    /// Firings delayed by lock contention are skipped rather than replayed
    /// in a burst.
    pub async fn run_cycle(&self) {
        let mut ticker = tokio::time::interval(self.cycle_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick of a Tokio interval completes immediately.
        ticker.tick().await;

        info!(interval = ?self.cycle_interval, "Automatic cycle started");

        loop {
            ticker.tick().await;
            let light = self.advance().await;
            debug!(state = %light.state(), "Automatic advance");
        }
    }

    /// Apply `transition` to the current state under the lock and publish
    /// the result.
    async fn commit<F>(&self, source: ChangeSource, transition: F) -> TrafficLight
    where
        F: FnOnce(TrafficLightState) -> TrafficLightState,
    {
        let mut light = self.light.lock().await;
        let next = transition(light.state());
        light.change_state(next);
        let snapshot = *light;

        // Err only means there are no subscribers right now.
        let _ = self.changes.send(StateChange {
            state: snapshot.state(),
            changed_at: snapshot.last_changed(),
            source,
        });

        debug!(state = %snapshot.state(), source = ?source, "State committed");
        snapshot
    }
}
