// Divesim Testdata - Historical backfill
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Historical backfill.
//!
//! Replays the live engine over a simulated clock to fill a dataset with
//! the readings a set of stations would have published over the last hours.
//! Every site × depth pair is an independent station with its own
//! [`EnvironmentState`]; each sample is exactly one generation cycle, so the
//! battery drains per sample regardless of the interval.

use crate::dataset::{Dataset, DatasetError, DatasetMetadata, EventRecord};
use chrono::{Duration, Utc};
use divesim::{
    generate, Clock, ConfigError, DepthZone, EnvironmentState, EventInjector, SimulatedClock,
    StationConfig, StationId, Timestamp, DEFAULT_EVENT_PROBABILITY,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Sites backfilled by default.
pub const DEFAULT_SITES: [&str; 3] = ["capo_vaticano", "tropea_reef", "stromboli_east"];

/// Longest history a backfill may cover (ten years).
pub const MAX_HOURS_BACK: u32 = 24 * 366 * 10;

/// Backfill configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackfillConfig {
    /// First sample time. Defaults to `hours_back` before now.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<Timestamp>,
    /// Hours of history to generate.
    pub hours_back: u32,
    /// Minutes between samples.
    pub sample_interval_minutes: u32,
    /// Sites to generate.
    pub sites: Vec<String>,
    /// Depth zones per site.
    pub depths: Vec<DepthZone>,
    /// Random seed for reproducibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Inject random environment events between samples.
    pub with_events: bool,
    /// Per-sample event probability.
    pub event_probability: f64,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            start: None,
            hours_back: 24,
            sample_interval_minutes: 10,
            sites: DEFAULT_SITES.iter().map(|s| s.to_string()).collect(),
            depths: DepthZone::ALL.to_vec(),
            seed: None,
            with_events: true,
            event_probability: DEFAULT_EVENT_PROBABILITY,
        }
    }
}

impl BackfillConfig {
    /// Create a new backfill config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the first sample time.
    pub fn with_start(mut self, start: Timestamp) -> Self {
        self.start = Some(start);
        self
    }

    /// Set hours of history.
    pub fn with_hours_back(mut self, hours: u32) -> Self {
        self.hours_back = hours;
        self
    }

    /// Set sample interval in minutes.
    pub fn with_sample_interval_minutes(mut self, minutes: u32) -> Self {
        self.sample_interval_minutes = minutes;
        self
    }

    /// Replace the site list.
    pub fn with_sites(mut self, sites: &[&str]) -> Self {
        self.sites = sites.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Replace the depth list.
    pub fn with_depths(mut self, depths: &[DepthZone]) -> Self {
        self.depths = depths.to_vec();
        self
    }

    /// Set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enable or disable event injection.
    pub fn with_events(mut self, enabled: bool) -> Self {
        self.with_events = enabled;
        self
    }

    /// Set per-sample event probability.
    pub fn with_event_probability(mut self, p: f64) -> Self {
        self.event_probability = p;
        self
    }

    /// Samples per station.
    pub fn num_samples(&self) -> usize {
        if self.sample_interval_minutes == 0 {
            return 0;
        }
        (self.hours_back as usize * 60) / self.sample_interval_minutes as usize
    }

    /// Resolve the first sample time.
    pub fn start_time(&self) -> Result<Timestamp, ConfigError> {
        match self.start {
            Some(start) => Ok(start),
            None => Utc::now()
                .fixed_offset()
                .checked_sub_signed(Duration::hours(i64::from(self.hours_back)))
                .ok_or_else(|| {
                    invalid(
                        "hours_back",
                        self.hours_back.to_string(),
                        "start time out of range",
                    )
                }),
        }
    }

    /// Check the config can produce a dataset.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_interval_minutes == 0 {
            return Err(invalid(
                "sample_interval_minutes",
                "0".to_string(),
                "must be at least one minute",
            ));
        }
        if self.hours_back > MAX_HOURS_BACK {
            return Err(invalid(
                "hours_back",
                self.hours_back.to_string(),
                "must be at most ten years",
            ));
        }
        if self.sites.is_empty() {
            return Err(invalid("sites", String::new(), "at least one site is required"));
        }
        if self.depths.is_empty() {
            return Err(invalid("depths", String::new(), "at least one depth is required"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, value: String, reason: &str) -> ConfigError {
    ConfigError::InvalidConfiguration {
        field,
        value,
        reason: reason.to_string(),
    }
}

struct Series {
    station: StationId,
    state: EnvironmentState,
}

/// Generate a historical dataset.
///
/// Rows are ordered by time, then site, then initial depth. Sensor identifiers
/// follow `<site>_sensor_01`; the depth distinguishes series of one site.
pub fn generate_history(config: &BackfillConfig) -> Result<Dataset, DatasetError> {
    config.validate()?;

    let mut rng = match config.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let injector = EventInjector::with_probability(config.event_probability)?;

    let mut series = Vec::with_capacity(config.sites.len() * config.depths.len());
    for site in &config.sites {
        for depth in &config.depths {
            let station_config = StationConfig::new()
                .with_site(site)
                .with_sensor(&format!("{}_sensor_01", site))
                .with_depth(depth.as_str());
            series.push(Series {
                station: station_config.station_id()?,
                state: station_config.build_state(&mut rng)?,
            });
        }
    }

    let mut clock = SimulatedClock::new(config.start_time()?);
    let step = Duration::minutes(config.sample_interval_minutes as i64);
    let samples = config.num_samples();

    let mut dataset = Dataset::new();
    dataset.rows.reserve(samples * series.len());
    dataset.metadata = DatasetMetadata {
        seed: config.seed,
        sample_interval_minutes: Some(config.sample_interval_minutes),
        ..DatasetMetadata::default()
    };

    for _ in 0..samples {
        let now = clock.now();
        for s in series.iter_mut() {
            dataset.push(generate(&mut s.state, &s.station, now, &mut rng));

            if config.with_events {
                if let Some(event) = injector.inject(&mut s.state, &mut rng) {
                    dataset.metadata.events.push(EventRecord {
                        timestamp: now,
                        site_id: s.station.site_id.clone(),
                        sensor_id: s.station.sensor_id.clone(),
                        event,
                    });
                }
            }
        }
        clock.advance(step);
    }

    Ok(dataset)
}
