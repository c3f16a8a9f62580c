// Divesim - Dive-site telemetry engine
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Environmental state of a simulated station
//!
//! A plain record: depth zone, weather regime, tidal phase, battery charge
//! and baseline temperature. Operators and the event injector change it
//! through three mutators; the per-cycle advance steps are crate-private and
//! driven by the reading assembler.

use crate::error::ConfigError;
use crate::random::RandomSource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Full battery charge
pub const FULL_CHARGE: f64 = 100.0;

/// Default climatological mean water temperature (°C)
pub const DEFAULT_BASELINE_TEMPERATURE: f64 = 18.0;

/// Sensor placement depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthZone {
    Surface,
    Shallow,
    Deep,
}

impl DepthZone {
    /// All zones in declaration order
    pub const ALL: [DepthZone; 3] = [DepthZone::Surface, DepthZone::Shallow, DepthZone::Deep];

    /// Get zone name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            DepthZone::Surface => "surface",
            DepthZone::Shallow => "shallow",
            DepthZone::Deep => "deep",
        }
    }
}

impl fmt::Display for DepthZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DepthZone {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "surface" => Ok(DepthZone::Surface),
            "shallow" => Ok(DepthZone::Shallow),
            "deep" => Ok(DepthZone::Deep),
            _ => Err(ConfigError::invalid(
                "depth_zone",
                s,
                "expected one of surface, shallow, deep",
            )),
        }
    }
}

/// Sea-state regime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherRegime {
    Calm,
    Stormy,
    Changing,
}

impl WeatherRegime {
    /// All regimes in declaration order
    pub const ALL: [WeatherRegime; 3] = [
        WeatherRegime::Calm,
        WeatherRegime::Stormy,
        WeatherRegime::Changing,
    ];

    /// Get regime name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherRegime::Calm => "calm",
            WeatherRegime::Stormy => "stormy",
            WeatherRegime::Changing => "changing",
        }
    }

    /// Draw a regime uniformly
    pub fn random<R: RandomSource>(rng: &mut R) -> Self {
        *rng.choose(&Self::ALL)
    }
}

impl fmt::Display for WeatherRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeatherRegime {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "calm" => Ok(WeatherRegime::Calm),
            "stormy" => Ok(WeatherRegime::Stormy),
            "changing" => Ok(WeatherRegime::Changing),
            _ => Err(ConfigError::invalid(
                "weather_regime",
                s,
                "expected one of calm, stormy, changing",
            )),
        }
    }
}

/// Mutable context of one simulated station
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentState {
    depth_zone: DepthZone,
    weather_regime: WeatherRegime,
    tidal_phase: f64,
    battery_charge: f64,
    baseline_temperature: f64,
}

impl EnvironmentState {
    /// Fresh state: full battery, tidal phase zero, default baseline.
    pub fn new(depth_zone: DepthZone, weather_regime: WeatherRegime) -> Self {
        Self {
            depth_zone,
            weather_regime,
            tidal_phase: 0.0,
            battery_charge: FULL_CHARGE,
            baseline_temperature: DEFAULT_BASELINE_TEMPERATURE,
        }
    }

    /// Override the baseline temperature. Rejects non-finite values.
    pub fn with_baseline_temperature(mut self, celsius: f64) -> Result<Self, ConfigError> {
        if !celsius.is_finite() {
            return Err(ConfigError::invalid(
                "baseline_temperature",
                celsius.to_string(),
                "must be a finite number",
            ));
        }
        self.baseline_temperature = celsius;
        Ok(self)
    }

    pub fn depth_zone(&self) -> DepthZone {
        self.depth_zone
    }

    pub fn weather_regime(&self) -> WeatherRegime {
        self.weather_regime
    }

    pub fn tidal_phase(&self) -> f64 {
        self.tidal_phase
    }

    pub fn battery_charge(&self) -> f64 {
        self.battery_charge
    }

    pub fn baseline_temperature(&self) -> f64 {
        self.baseline_temperature
    }

    /// Move the sensor to another depth zone
    pub fn set_depth_zone(&mut self, zone: DepthZone) {
        self.depth_zone = zone;
    }

    /// Change the weather regime
    pub fn set_weather_regime(&mut self, regime: WeatherRegime) {
        self.weather_regime = regime;
    }

    /// Maintenance visit: battery back to full
    pub fn recharge_battery(&mut self) {
        self.battery_charge = FULL_CHARGE;
    }

    /// Advance the tidal phase accumulator. Never wraps.
    pub(crate) fn advance_tide(&mut self, delta: f64) {
        self.tidal_phase += delta;
    }

    /// Drain the battery, clamping at zero.
    pub(crate) fn drain_battery(&mut self, rate: f64) {
        self.battery_charge = (self.battery_charge - rate).clamp(0.0, FULL_CHARGE);
    }
}
