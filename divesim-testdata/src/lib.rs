// Divesim Testdata - Historical dataset backfill
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Divesim Testdata
//!
//! Historical dataset backfill for the Divesim ecosystem.
//!
//! Dashboards and alert pipelines need history before a live station has
//! produced any. This crate replays the real generation engine over a
//! simulated clock for several sites and depth zones at once:
//!
//! - **Backfill**: `hours_back` of readings at a fixed interval per station
//! - **Export**: CSV with the station wire field names, or JSON with metadata
//! - **Manifest**: per-channel ranges, alert and event counts
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use divesim_testdata::{generate_history, BackfillConfig, DatasetManifest};
//!
//! // The last 24 hours, one reading every 10 minutes, at three sites
//! let config = BackfillConfig::new().with_seed(42);
//! let dataset = generate_history(&config).unwrap();
//!
//! dataset.to_csv("history_24h.csv").unwrap();
//! DatasetManifest::from_dataset(&dataset)
//!     .to_json_file("history_24h.manifest.json")
//!     .unwrap();
//! ```

pub mod dataset;
pub mod generator;
pub mod manifest;

// Re-exports for convenience
pub use dataset::{ChannelStats, Dataset, DatasetError, DatasetMetadata, EventRecord};
pub use generator::{generate_history, BackfillConfig, DEFAULT_SITES, MAX_HOURS_BACK};
pub use manifest::{ChannelManifest, DatasetManifest};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
