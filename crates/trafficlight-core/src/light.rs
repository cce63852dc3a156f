//! The traffic light entity and its three-state signal.
//!
//! [`TrafficLight`] holds the current [`TrafficLightState`] and the wall-clock
//! time of the last transition. It has exactly one mutator,
//! [`TrafficLight::change_state`], and knows nothing about locking. Writers
//! are serialized by [`TrafficLightService`](crate::service::TrafficLightService).
//!
//! # Invariants
//!
//! - The state is always one of the three enum variants. Text input is
//!   validated once, at parse time, via [`FromStr`].
//! - `last_changed` never decreases. If the system clock steps backwards
//!   the previous timestamp is kept.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Errors produced when interpreting caller input as a light state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LightError {
    /// The text does not name one of `Red`, `Green`, or `Yellow`.
    #[error("invalid traffic light state {value:?}: expected Red, Green, or Yellow")]
    InvalidState {
        /// The rejected input, as supplied.
        value: String,
    },
}

/// The signal currently shown by the light.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum TrafficLightState {
    /// Stop. The initial state of every light.
    #[default]
    Red,
    /// Go.
    Green,
    /// Prepare to stop.
    Yellow,
}

impl TrafficLightState {
    /// Every state, in automatic cycle order starting from [`Self::Red`].
    pub const CYCLE: [Self; 3] = [Self::Red, Self::Green, Self::Yellow];

    /// The state the automatic cycle moves to from `self`.
    ///
    /// Red goes to Green, Green to Yellow, Yellow back to Red.
    pub const fn next(self) -> Self {
        match self {
            Self::Red => Self::Green,
            Self::Green => Self::Yellow,
            Self::Yellow => Self::Red,
        }
    }

    /// Canonical name of the state.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Red => "Red",
            Self::Green => "Green",
            Self::Yellow => "Yellow",
        }
    }
}

impl fmt::Display for TrafficLightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrafficLightState {
    type Err = LightError;

    /// Parse a state name, ignoring ASCII case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::CYCLE
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| LightError::InvalidState {
                value: s.to_owned(),
            })
    }
}

/// A traffic light: its current signal and when that signal was set.
///
/// This is a small `Copy` value, so a snapshot handed to a reader is fully
/// detached from the live light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficLight {
    /// The signal currently shown.
    state: TrafficLightState,
    /// When `state` was last set.
    last_changed: DateTime<Utc>,
}

impl TrafficLight {
    /// Create a light showing [`TrafficLightState::Red`], stamped now.
    pub fn new() -> Self {
        Self {
            state: TrafficLightState::Red,
            last_changed: Utc::now(),
        }
    }

    /// The signal currently shown.
    pub const fn state(&self) -> TrafficLightState {
        self.state
    }

    /// When the signal was last set.
    pub const fn last_changed(&self) -> DateTime<Utc> {
        self.last_changed
    }

    /// Switch to `new_state` and stamp the change with the current time.
    pub fn change_state(&mut self, new_state: TrafficLightState) {
        self.change_state_at(new_state, Utc::now());
    }

    /// Switch to `new_state`, stamping the change with `at`.
    ///
    /// `at` is clamped so that `last_changed` never moves backwards.
    pub fn change_state_at(&mut self, new_state: TrafficLightState, at: DateTime<Utc>) {
        self.state = new_state;
        self.last_changed = at.max(self.last_changed);
        info!(
            state = %self.state,
            changed_at = %self.last_changed,
            "Light changed"
        );
    }
}

impl Default for TrafficLight {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    #[test]
    fn new_light_is_red() {
        let light = TrafficLight::new();
        assert_eq!(light.state(), TrafficLightState::Red);
        assert_eq!(TrafficLight::default().state(), TrafficLightState::Red);
        assert_eq!(TrafficLightState::default(), TrafficLightState::Red);
    }

    #[test]
    fn next_follows_red_green_yellow_red() {
        assert_eq!(TrafficLightState::Red.next(), TrafficLightState::Green);
        assert_eq!(TrafficLightState::Green.next(), TrafficLightState::Yellow);
        assert_eq!(TrafficLightState::Yellow.next(), TrafficLightState::Red);
    }

    #[test]
    fn n_advances_land_on_cycle_position() {
        let mut state = TrafficLightState::Red;
        for n in 0..30_usize {
            assert_eq!(Some(&state), TrafficLightState::CYCLE.get(n % 3));
            state = state.next();
        }
    }

    #[test]
    fn change_state_sets_state_and_timestamp() {
        let mut light = TrafficLight::new();
        let before = light.last_changed();

        light.change_state(TrafficLightState::Green);

        assert_eq!(light.state(), TrafficLightState::Green);
        assert!(light.last_changed() >= before);
    }

    #[test]
    fn last_changed_never_moves_backwards() {
        let mut light = TrafficLight::new();
        let original = light.last_changed();
        let earlier = original.checked_sub_signed(TimeDelta::seconds(30)).unwrap();

        light.change_state_at(TrafficLightState::Yellow, earlier);

        assert_eq!(light.state(), TrafficLightState::Yellow);
        assert_eq!(light.last_changed(), original);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Red".parse::<TrafficLightState>(), Ok(TrafficLightState::Red));
        assert_eq!("green".parse::<TrafficLightState>(), Ok(TrafficLightState::Green));
        assert_eq!(" YELLOW ".parse::<TrafficLightState>(), Ok(TrafficLightState::Yellow));
    }

    #[test]
    fn parse_rejects_unknown_names() {
        let err = "NotAState".parse::<TrafficLightState>().unwrap_err();
        assert_eq!(
            err,
            LightError::InvalidState {
                value: String::from("NotAState"),
            }
        );
        assert!("".parse::<TrafficLightState>().is_err());
        assert!("Blue".parse::<TrafficLightState>().is_err());
    }

    #[test]
    fn display_matches_canonical_name() {
        for state in TrafficLightState::CYCLE {
            assert_eq!(state.to_string(), state.as_str());
            assert_eq!(state.to_string().parse::<TrafficLightState>(), Ok(state));
        }
    }

    #[test]
    fn snapshot_serializes_state_and_timestamp() {
        let mut light = TrafficLight::new();
        light.change_state(TrafficLightState::Yellow);

        let json = serde_json::to_value(light).unwrap();
        assert_eq!(json["state"], "Yellow");
        assert!(json["last_changed"].is_string());
    }
}
