// Divesim - Dive-site telemetry engine
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Station configuration
//!
//! Depth zone and weather regime arrive as free text (CLI flags, JSON
//! files) and are validated here. Unknown values are rejected with
//! [`ConfigError::InvalidConfiguration`], never defaulted.

use crate::error::ConfigError;
use crate::events::DEFAULT_EVENT_PROBABILITY;
use crate::random::RandomSource;
use crate::state::{DepthZone, EnvironmentState, WeatherRegime, DEFAULT_BASELINE_TEMPERATURE};
use serde::{Deserialize, Serialize};

/// Identity stamped on every reading
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StationId {
    /// Dive site identifier
    pub site_id: String,
    /// Device identifier
    pub sensor_id: String,
}

impl StationId {
    /// Create a station identity
    pub fn new(site_id: impl Into<String>, sensor_id: impl Into<String>) -> Self {
        Self {
            site_id: site_id.into(),
            sensor_id: sensor_id.into(),
        }
    }
}

/// Configuration for one simulated station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    /// Dive site identifier
    pub site_id: String,
    /// Device identifier
    pub sensor_id: String,
    /// Initial depth zone (surface, shallow, deep)
    pub depth_zone: String,
    /// Initial weather regime. Drawn at random when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_regime: Option<String>,
    /// Climatological mean temperature (°C)
    pub baseline_temperature: f64,
    /// Per-cycle probability of a random environment event
    pub event_probability: f64,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            site_id: "capo_vaticano".to_string(),
            sensor_id: "sensor_01".to_string(),
            depth_zone: "shallow".to_string(),
            weather_regime: None,
            baseline_temperature: DEFAULT_BASELINE_TEMPERATURE,
            event_probability: DEFAULT_EVENT_PROBABILITY,
        }
    }
}

impl StationConfig {
    /// Create a default station config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set site identifier
    pub fn with_site(mut self, site_id: &str) -> Self {
        self.site_id = site_id.to_string();
        self
    }

    /// Set sensor identifier
    pub fn with_sensor(mut self, sensor_id: &str) -> Self {
        self.sensor_id = sensor_id.to_string();
        self
    }

    /// Set initial depth zone
    pub fn with_depth(mut self, depth_zone: &str) -> Self {
        self.depth_zone = depth_zone.to_string();
        self
    }

    /// Set initial weather regime
    pub fn with_weather(mut self, weather_regime: &str) -> Self {
        self.weather_regime = Some(weather_regime.to_string());
        self
    }

    /// Set baseline temperature
    pub fn with_baseline_temperature(mut self, celsius: f64) -> Self {
        self.baseline_temperature = celsius;
        self
    }

    /// Set event probability
    pub fn with_event_probability(mut self, p: f64) -> Self {
        self.event_probability = p;
        self
    }

    /// Validated station identity
    pub fn station_id(&self) -> Result<StationId, ConfigError> {
        if self.site_id.trim().is_empty() {
            return Err(ConfigError::invalid("site_id", &self.site_id, "must not be empty"));
        }
        if self.sensor_id.trim().is_empty() {
            return Err(ConfigError::invalid(
                "sensor_id",
                &self.sensor_id,
                "must not be empty",
            ));
        }
        Ok(StationId::new(self.site_id.trim(), self.sensor_id.trim()))
    }

    /// Validated event probability
    pub fn validated_event_probability(&self) -> Result<f64, ConfigError> {
        if !(0.0..=1.0).contains(&self.event_probability) {
            return Err(ConfigError::invalid(
                "event_probability",
                self.event_probability.to_string(),
                "must be within [0, 1]",
            ));
        }
        Ok(self.event_probability)
    }

    /// Build the initial environment state.
    ///
    /// The random source is only consulted when no weather regime is
    /// configured.
    pub fn build_state<R: RandomSource>(&self, rng: &mut R) -> Result<EnvironmentState, ConfigError> {
        let depth: DepthZone = self.depth_zone.parse()?;
        let weather = match &self.weather_regime {
            Some(w) => w.parse()?,
            None => WeatherRegime::random(rng),
        };
        EnvironmentState::new(depth, weather).with_baseline_temperature(self.baseline_temperature)
    }

    /// Validate every field without building anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.station_id()?;
        self.validated_event_probability()?;
        self.depth_zone.parse::<DepthZone>()?;
        if let Some(w) = &self.weather_regime {
            w.parse::<WeatherRegime>()?;
        }
        if !self.baseline_temperature.is_finite() {
            return Err(ConfigError::invalid(
                "baseline_temperature",
                self.baseline_temperature.to_string(),
                "must be a finite number",
            ));
        }
        Ok(())
    }
}
