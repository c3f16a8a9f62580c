// Divesim - Reading assembler
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Reading assembly.
//!
//! One generation cycle advances the tide, freezes a snapshot of the
//! environment, runs the four read-only generators against that snapshot and
//! finally commits the battery drain. No generator sees a state changed by a
//! sibling within the same cycle.

use crate::clock::Timestamp;
use crate::config::StationId;
use crate::random::RandomSource;
use crate::signals::{self, CurrentVector, TIDE_STEP};
use crate::state::{DepthZone, EnvironmentState, WeatherRegime};
use chrono::Timelike;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One multi-channel telemetry snapshot.
///
/// Field names on the wire match the station firmware payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: Timestamp,
    pub site_id: String,
    pub sensor_id: String,
    #[serde(rename = "depth")]
    pub depth_zone: DepthZone,
    /// °C
    pub temperature: f64,
    /// m/s
    pub current_speed: f64,
    /// Degrees, [0, 360)
    pub current_direction: u16,
    /// Meters, [1, 30]
    pub visibility: f64,
    /// Lux
    pub luminosity: f64,
    /// Percent, [0, 100]
    pub battery_level: f64,
    #[serde(rename = "weather_pattern")]
    pub weather_regime: WeatherRegime,
}

/// Single-channel view of a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorChannel {
    Temperature,
    Current,
    Visibility,
    Luminosity,
    Battery,
}

impl SensorChannel {
    /// All channels in publication order
    pub const ALL: [SensorChannel; 5] = [
        SensorChannel::Temperature,
        SensorChannel::Current,
        SensorChannel::Visibility,
        SensorChannel::Luminosity,
        SensorChannel::Battery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SensorChannel::Temperature => "temperature",
            SensorChannel::Current => "current",
            SensorChannel::Visibility => "visibility",
            SensorChannel::Luminosity => "luminosity",
            SensorChannel::Battery => "battery",
        }
    }

    /// Unit of measurement
    pub fn unit(&self) -> &'static str {
        match self {
            SensorChannel::Temperature => "°C",
            SensorChannel::Current => "m/s",
            SensorChannel::Visibility => "m",
            SensorChannel::Luminosity => "lux",
            SensorChannel::Battery => "%",
        }
    }
}

/// Payload of a single-channel message.
///
/// Scalars serialize as bare numbers, the current as `{speed, direction}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelPayload {
    Current(CurrentVector),
    Scalar(f64),
}

impl Reading {
    /// Current as a vector
    pub fn current(&self) -> CurrentVector {
        CurrentVector {
            speed: self.current_speed,
            direction: self.current_direction,
        }
    }

    /// Scalar value of a channel. The current reports its speed.
    pub fn value(&self, channel: SensorChannel) -> f64 {
        match channel {
            SensorChannel::Temperature => self.temperature,
            SensorChannel::Current => self.current_speed,
            SensorChannel::Visibility => self.visibility,
            SensorChannel::Luminosity => self.luminosity,
            SensorChannel::Battery => self.battery_level,
        }
    }

    /// The five single-channel payloads, in publication order.
    pub fn channel_payloads(&self) -> [(SensorChannel, ChannelPayload); 5] {
        [
            (SensorChannel::Temperature, ChannelPayload::Scalar(self.temperature)),
            (SensorChannel::Current, ChannelPayload::Current(self.current())),
            (SensorChannel::Visibility, ChannelPayload::Scalar(self.visibility)),
            (SensorChannel::Luminosity, ChannelPayload::Scalar(self.luminosity)),
            (SensorChannel::Battery, ChannelPayload::Scalar(self.battery_level)),
        ]
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "T:{:5.1}°C | C:{:4.1}m/s@{:3}° | V:{:5.1}m | L:{:6.1}lux | B:{:5.1}%",
            self.temperature,
            self.current_speed,
            self.current_direction,
            self.visibility,
            self.luminosity,
            self.battery_level
        )
    }
}

/// Run one generation cycle, taking the hour of day from `timestamp`.
pub fn generate<R: RandomSource + ?Sized>(
    state: &mut EnvironmentState,
    station: &StationId,
    timestamp: Timestamp,
    rng: &mut R,
) -> Reading {
    generate_at_hour(state, station, timestamp.hour(), timestamp, rng)
}

/// Run one generation cycle with an explicit hour of day (taken modulo 24).
pub fn generate_at_hour<R: RandomSource + ?Sized>(
    state: &mut EnvironmentState,
    station: &StationId,
    hour: u32,
    timestamp: Timestamp,
    rng: &mut R,
) -> Reading {
    state.advance_tide(TIDE_STEP);
    let snapshot = *state;

    let temperature = signals::temperature(&snapshot, hour, rng);
    let current = signals::current(&snapshot, hour, rng);
    let visibility = signals::visibility(&snapshot, hour, rng);
    let luminosity = signals::luminosity(&snapshot, hour, rng);
    // Last on purpose: the only generator that writes back.
    let battery_level = signals::battery(state);

    #[cfg(feature = "logging")]
    {
        if snapshot.battery_charge() > 0.0 && state.battery_charge() <= 0.0 {
            log::warn!("{}/{}: battery depleted", station.site_id, station.sensor_id);
        }
    }

    Reading {
        timestamp,
        site_id: station.site_id.clone(),
        sensor_id: station.sensor_id.clone(),
        depth_zone: snapshot.depth_zone(),
        temperature,
        current_speed: current.speed,
        current_direction: current.direction,
        visibility,
        luminosity,
        battery_level,
        weather_regime: snapshot.weather_regime(),
    }
}
