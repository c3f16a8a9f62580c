// Divesim - Dive-site telemetry engine
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Divesim - Dive-site telemetry engine
//!
//! Synthesizes believable environmental telemetry for underwater dive-site
//! monitoring stations and evaluates it against safety thresholds.
//!
//! ## Key Features
//!
//! - **Coherent channels**: temperature, current, visibility, luminosity and
//!   battery all respond to the same depth zone, weather regime and hour
//! - **Reproducible**: every random draw goes through an explicit
//!   [`RandomSource`]; a seeded `StdRng` gives bit-identical readings
//! - **Bounded**: every channel is clamped to a physically sane range
//! - **Pure alerting**: [`evaluate`] maps a reading to an ordered list of alerts
//!
//! ## Quick Start
//!
//! ```rust
//! use divesim::{evaluate, generate, DepthZone, EnvironmentState, StationId, WeatherRegime};
//! use chrono::DateTime;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut state = EnvironmentState::new(DepthZone::Shallow, WeatherRegime::Calm);
//! let station = StationId::new("capo_vaticano", "sensor_01");
//! let mut rng = StdRng::seed_from_u64(42);
//! let now = DateTime::parse_from_rfc3339("2024-07-01T14:00:00+02:00").unwrap();
//!
//! let reading = generate(&mut state, &station, now, &mut rng);
//! assert!((1.0..=30.0).contains(&reading.visibility));
//!
//! let alerts = evaluate(&reading);
//! assert!(alerts.iter().all(|a| a.site_id == "capo_vaticano"));
//! ```
//!
//! ## Modules
//!
//! - [`state`]: Environment state, depth zones and weather regimes
//! - [`signals`]: The five signal generators
//! - [`reading`]: Reading assembly
//! - [`alert`]: Threshold rules
//! - [`events`]: Random environment events
//! - [`config`]: Station configuration and validation
//! - [`random`], [`clock`], [`transport`]: Collaborator abstractions

pub mod alert;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod random;
pub mod reading;
pub mod signals;
pub mod state;
pub mod transport;

// Re-exports for convenient access
pub use alert::{evaluate, Alert, AlertType, Severity};
pub use clock::{Clock, SimulatedClock, SystemClock, Timestamp};
pub use config::{StationConfig, StationId};
pub use error::{ConfigError, DivesimError, Result, TransportError};
pub use events::{
    apply_event, inject_event, EnvironmentEvent, EventInjector, EventKind,
    DEFAULT_EVENT_PROBABILITY,
};
pub use random::RandomSource;
pub use reading::{generate, generate_at_hour, ChannelPayload, Reading, SensorChannel};
pub use signals::CurrentVector;
pub use state::{DepthZone, EnvironmentState, WeatherRegime};
pub use transport::{
    MemoryTransport, Message, NullTransport, Transport, TransportMetrics, WriterTransport,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
