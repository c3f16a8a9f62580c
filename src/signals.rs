// Divesim - Signal generators
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Signal generators for the five sensor channels.
//!
//! Each generator reads the same environment snapshot, the local hour of
//! day and a random source. Temperature, visibility and luminosity share the
//! diurnal term `sin(2*PI*(hour - 6)/24)`, so every channel answers to the
//! same depth, weather and time of day. Only [`battery`] touches the state.

use crate::random::RandomSource;
use crate::state::{DepthZone, EnvironmentState, WeatherRegime};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Hour at which the diurnal sine crosses zero on the way up.
pub const DAWN_HOUR: f64 = 6.0;

/// Tidal phase increment per generation cycle (radians).
pub const TIDE_STEP: f64 = 0.01;

/// Battery units drained per cycle in calm or changing weather.
pub const BATTERY_DRAIN_PER_CYCLE: f64 = 0.008;

/// Drain multiplier while stormy.
pub const STORM_DRAIN_FACTOR: f64 = 1.5;

/// Maximum current speed (m/s).
pub const MAX_CURRENT_SPEED: f64 = 3.0;

/// Visibility bounds (m).
pub const MIN_VISIBILITY: f64 = 1.0;
pub const MAX_VISIBILITY: f64 = 30.0;

/// Peak solar illuminance at the surface (lux).
pub const PEAK_SOLAR_LUX: f64 = 1200.0;

const TEMPERATURE_SWING: f64 = 3.0;
const TEMPERATURE_NOISE: f64 = 0.1;
const TIDE_CURRENT_AMPLITUDE: f64 = 0.3;
const BASE_CURRENT_DIRECTION: f64 = 45.0;
const TIDE_DIRECTION_SWING: f64 = 30.0;
const BIOLUMINESCENCE_MAX_LUX: f64 = 5.0;

/// Diurnal term `amplitude * sin(2*PI*(hour - phase_offset)/24)`.
///
/// `hour` is taken modulo 24.
pub fn daily_cycle(amplitude: f64, hour: u32, phase_offset: f64) -> f64 {
    let hour = f64::from(hour % 24);
    amplitude * (2.0 * PI * (hour - phase_offset) / 24.0).sin()
}

/// Round to a fixed number of decimals.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Current speed and heading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentVector {
    /// Speed in m/s, within [0, 3]
    pub speed: f64,
    /// Heading in whole degrees, within [0, 360)
    pub direction: u16,
}

fn temperature_depth_offset(zone: DepthZone) -> f64 {
    match zone {
        DepthZone::Surface => 0.0,
        DepthZone::Shallow => -2.0,
        DepthZone::Deep => -5.0,
    }
}

fn current_depth_factor(zone: DepthZone) -> f64 {
    match zone {
        DepthZone::Surface => 1.0,
        DepthZone::Shallow => 0.7,
        DepthZone::Deep => 0.4,
    }
}

fn base_visibility(zone: DepthZone) -> f64 {
    match zone {
        DepthZone::Surface => 12.0,
        DepthZone::Shallow => 18.0,
        DepthZone::Deep => 25.0,
    }
}

fn light_attenuation(zone: DepthZone) -> f64 {
    match zone {
        DepthZone::Surface => 0.95,
        DepthZone::Shallow => 0.6,
        DepthZone::Deep => 0.1,
    }
}

/// Water temperature in °C, two decimals.
pub fn temperature<R: RandomSource + ?Sized>(
    state: &EnvironmentState,
    hour: u32,
    rng: &mut R,
) -> f64 {
    let daily = daily_cycle(TEMPERATURE_SWING, hour, DAWN_HOUR);
    let depth = temperature_depth_offset(state.depth_zone());
    let weather = match state.weather_regime() {
        WeatherRegime::Calm => 0.0,
        WeatherRegime::Stormy => -1.0,
        WeatherRegime::Changing => rng.uniform(-1.0, 1.0),
    };
    let noise = rng.uniform(-TEMPERATURE_NOISE, TEMPERATURE_NOISE);

    round_to(state.baseline_temperature() + daily + depth + weather + noise, 2)
}

/// Current speed and heading driven by the tidal phase and the weather.
pub fn current<R: RandomSource + ?Sized>(
    state: &EnvironmentState,
    _hour: u32,
    rng: &mut R,
) -> CurrentVector {
    let phase = state.tidal_phase();
    let regime = state.weather_regime();

    let tide = TIDE_CURRENT_AMPLITUDE * phase.sin();
    let weather = match regime {
        WeatherRegime::Calm => rng.uniform(0.0, 0.2),
        WeatherRegime::Stormy => rng.uniform(0.5, 1.8),
        WeatherRegime::Changing => rng.uniform(0.1, 0.8),
    };
    let speed = ((tide + weather).abs() * current_depth_factor(state.depth_zone()))
        .clamp(0.0, MAX_CURRENT_SPEED);

    let spread = match regime {
        WeatherRegime::Stormy => 20.0,
        WeatherRegime::Calm | WeatherRegime::Changing => 5.0,
    };
    let heading = BASE_CURRENT_DIRECTION
        + TIDE_DIRECTION_SWING * (2.0 * phase).sin()
        + rng.uniform(-spread, spread);
    // rem_euclid can round up to exactly 360.0 for tiny negatives
    let direction = (heading.rem_euclid(360.0).trunc() as u16) % 360;

    CurrentVector {
        speed: round_to(speed, 2),
        direction,
    }
}

/// Horizontal visibility in meters, within [1, 30], one decimal.
pub fn visibility<R: RandomSource + ?Sized>(
    state: &EnvironmentState,
    hour: u32,
    rng: &mut R,
) -> f64 {
    let daily_factor = 0.8 + 0.2 * daily_cycle(1.0, hour, DAWN_HOUR).max(0.0);
    let weather_factor = match state.weather_regime() {
        WeatherRegime::Calm => rng.uniform(0.9, 1.1),
        WeatherRegime::Stormy => rng.uniform(0.3, 0.7),
        WeatherRegime::Changing => rng.uniform(0.6, 1.0),
    };
    let meters = base_visibility(state.depth_zone()) * daily_factor * weather_factor;

    round_to(meters.clamp(MIN_VISIBILITY, MAX_VISIBILITY), 1)
}

/// Ambient light in lux, never negative, one decimal.
///
/// Deep sensors add a small bioluminescence floor, so they read up to
/// 5 lux even at night.
pub fn luminosity<R: RandomSource + ?Sized>(
    state: &EnvironmentState,
    hour: u32,
    rng: &mut R,
) -> f64 {
    let solar = daily_cycle(PEAK_SOLAR_LUX, hour, DAWN_HOUR).max(0.0);
    let weather_factor = match state.weather_regime() {
        WeatherRegime::Calm => 1.0,
        WeatherRegime::Stormy => 0.3,
        WeatherRegime::Changing => rng.uniform(0.5, 0.9),
    };
    let mut lux = solar * light_attenuation(state.depth_zone()) * weather_factor;
    if state.depth_zone() == DepthZone::Deep {
        lux += rng.uniform(0.0, BIOLUMINESCENCE_MAX_LUX);
    }

    round_to(lux.max(0.0), 1)
}

/// Drain for one cycle in the given regime.
pub fn battery_drain(regime: WeatherRegime) -> f64 {
    match regime {
        WeatherRegime::Stormy => BATTERY_DRAIN_PER_CYCLE * STORM_DRAIN_FACTOR,
        WeatherRegime::Calm | WeatherRegime::Changing => BATTERY_DRAIN_PER_CYCLE,
    }
}

/// Commit one cycle of battery drain and report the level, one decimal.
pub fn battery(state: &mut EnvironmentState) -> f64 {
    state.drain_battery(battery_drain(state.weather_regime()));
    round_to(state.battery_charge(), 1)
}
