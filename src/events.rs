// Divesim - Event injection
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Random environment events between cycles.
//!
//! With a small probability per cycle, one of three events is picked
//! uniformly: a weather change, a depth change (the sensor was moved) or a
//! maintenance visit that recharges the battery. This is the only
//! stochastic state transition; generators never change depth, weather or
//! recharge the battery themselves.

use crate::error::ConfigError;
use crate::random::RandomSource;
use crate::state::{DepthZone, EnvironmentState, WeatherRegime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-cycle probability of an event
pub const DEFAULT_EVENT_PROBABILITY: f64 = 0.1;

/// Kind of environment event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    WeatherChange,
    DepthChange,
    Maintenance,
}

impl EventKind {
    /// All kinds, in selection order
    pub const ALL: [EventKind; 3] = [
        EventKind::WeatherChange,
        EventKind::DepthChange,
        EventKind::Maintenance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::WeatherChange => "weather_change",
            EventKind::DepthChange => "depth_change",
            EventKind::Maintenance => "maintenance",
        }
    }
}

/// What an injected event changed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EnvironmentEvent {
    WeatherChange {
        from: WeatherRegime,
        to: WeatherRegime,
    },
    DepthChange {
        from: DepthZone,
        to: DepthZone,
    },
    Maintenance {
        previous_charge: f64,
    },
}

impl EnvironmentEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            EnvironmentEvent::WeatherChange { .. } => EventKind::WeatherChange,
            EnvironmentEvent::DepthChange { .. } => EventKind::DepthChange,
            EnvironmentEvent::Maintenance { .. } => EventKind::Maintenance,
        }
    }
}

impl fmt::Display for EnvironmentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvironmentEvent::WeatherChange { from, to } => {
                write!(f, "weather change: {} -> {}", from, to)
            }
            EnvironmentEvent::DepthChange { from, to } => {
                write!(f, "sensor moved: {} -> {}", from, to)
            }
            EnvironmentEvent::Maintenance { previous_charge } => {
                write!(f, "maintenance: battery recharged from {:.1}%", previous_charge)
            }
        }
    }
}

/// Event injector with a configurable per-cycle probability
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventInjector {
    probability: f64,
}

impl Default for EventInjector {
    fn default() -> Self {
        Self {
            probability: DEFAULT_EVENT_PROBABILITY,
        }
    }
}

impl EventInjector {
    /// Create an injector with the default probability
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an injector with a custom probability in [0, 1]
    pub fn with_probability(probability: f64) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(ConfigError::invalid(
                "event_probability",
                probability.to_string(),
                "must be within [0, 1]",
            ));
        }
        Ok(Self { probability })
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Maybe mutate the state. Returns what changed, if anything.
    ///
    /// A weather or depth change draws the new value uniformly from all
    /// variants, so it may land on the current one.
    pub fn inject<R: RandomSource>(
        &self,
        state: &mut EnvironmentState,
        rng: &mut R,
    ) -> Option<EnvironmentEvent> {
        if !rng.chance(self.probability) {
            return None;
        }
        let event = apply_event(*rng.choose(&EventKind::ALL), state, rng);

        #[cfg(feature = "logging")]
        log::debug!("environment event: {}", event);

        Some(event)
    }
}

/// Apply one event of the given kind.
pub fn apply_event<R: RandomSource>(
    kind: EventKind,
    state: &mut EnvironmentState,
    rng: &mut R,
) -> EnvironmentEvent {
    match kind {
        EventKind::WeatherChange => {
            let from = state.weather_regime();
            let to = WeatherRegime::random(rng);
            state.set_weather_regime(to);
            EnvironmentEvent::WeatherChange { from, to }
        }
        EventKind::DepthChange => {
            let from = state.depth_zone();
            let to = *rng.choose(&DepthZone::ALL);
            state.set_depth_zone(to);
            EnvironmentEvent::DepthChange { from, to }
        }
        EventKind::Maintenance => {
            let previous_charge = state.battery_charge();
            state.recharge_battery();
            EnvironmentEvent::Maintenance { previous_charge }
        }
    }
}

/// Maybe inject an event with the default probability.
pub fn inject_event<R: RandomSource>(
    state: &mut EnvironmentState,
    rng: &mut R,
) -> Option<EnvironmentEvent> {
    EventInjector::default().inject(state, rng)
}
