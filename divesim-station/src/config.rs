// Divesim Station - Station file loading
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Station list loading and run settings.
//!
//! A station file is JSON:
//!
//! ```json
//! {
//!   "stations": [
//!     { "site_id": "capo_vaticano", "depth_zone": "shallow" },
//!     { "site_id": "stromboli_east", "depth_zone": "deep", "weather_regime": "stormy" }
//!   ]
//! }
//! ```
//!
//! Omitted fields take the [`StationConfig`] defaults.

use divesim::{ConfigError, StationConfig, TransportError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Station errors.
#[derive(Debug, Error)]
pub enum StationError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid station file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("No stations configured")]
    NoStations,

    #[error("Station {index}: {source}")]
    Station { index: usize, source: ConfigError },

    #[error("Cannot bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[cfg(feature = "backfill")]
    #[error(transparent)]
    Dataset(#[from] divesim_testdata::DatasetError),
}

#[derive(Debug, Deserialize)]
struct StationsFile {
    stations: Vec<StationConfig>,
}

/// Parse and validate a station list.
pub fn parse_stations(json: &str, path: &Path) -> Result<Vec<StationConfig>, StationError> {
    let file: StationsFile = serde_json::from_str(json).map_err(|source| StationError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate_stations(&file.stations)?;
    Ok(file.stations)
}

/// Load and validate a station file.
pub fn load_stations(path: impl AsRef<Path>) -> Result<Vec<StationConfig>, StationError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| StationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_stations(&json, path)
}

/// Every station must be valid; an empty list is an error.
pub fn validate_stations(stations: &[StationConfig]) -> Result<(), StationError> {
    if stations.is_empty() {
        return Err(StationError::NoStations);
    }
    for (index, station) in stations.iter().enumerate() {
        station
            .validate()
            .map_err(|source| StationError::Station { index, source })?;
    }
    Ok(())
}

/// Settings shared by every station loop.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    /// Pause between cycles.
    pub interval: Duration,
    /// Base seed; station `i` uses `seed + i`.
    pub seed: Option<u64>,
    /// Stop each station after this many cycles.
    pub max_cycles: Option<u64>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            seed: None,
            max_cycles: None,
        }
    }
}

impl RunSettings {
    /// Random source for the station at `index`.
    pub fn station_rng(&self, index: usize) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
            None => StdRng::from_entropy(),
        }
    }
}
