// Divesim Station - History backfill
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Publishes generated history before the live loop starts, so dashboards
//! have data from the first scrape.

use crate::config::StationError;
use crate::topics::Topics;
use divesim::{StationConfig, Transport};
use divesim_testdata::{generate_history, BackfillConfig};
use std::collections::HashMap;
use tracing::{info, warn};

/// Result of a backfill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillSummary {
    pub readings: usize,
    pub published: usize,
    pub failed: usize,
}

/// Generate `hours_back` of history for every configured site, at every
/// depth, and publish each reading on its site's data topic.
pub fn publish_history<T: Transport + ?Sized>(
    transport: &mut T,
    stations: &[StationConfig],
    hours_back: u32,
    seed: Option<u64>,
) -> Result<BackfillSummary, StationError> {
    let mut sites: Vec<&str> = Vec::new();
    for station in stations {
        if !sites.contains(&station.site_id.as_str()) {
            sites.push(&station.site_id);
        }
    }

    let mut config = BackfillConfig::new()
        .with_hours_back(hours_back)
        .with_sites(&sites);
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }

    let dataset = generate_history(&config)?;
    info!(
        "Backfilling {} readings ({}h, {} sites)",
        dataset.len(),
        hours_back,
        sites.len()
    );

    let mut topics: HashMap<&str, Topics> = HashMap::new();
    let mut summary = BackfillSummary {
        readings: dataset.len(),
        ..BackfillSummary::default()
    };

    for reading in dataset.rows() {
        let topic = topics
            .entry(reading.site_id.as_str())
            .or_insert_with(|| Topics::new(&reading.site_id));
        let payload = serde_json::to_vec(reading).map_err(divesim::TransportError::from)?;
        match transport.publish(topic.data(), &payload) {
            Ok(()) => summary.published += 1,
            Err(e) => {
                summary.failed += 1;
                warn!(site = %reading.site_id, "Backfill publish failed: {}", e);
            }
        }
    }

    Ok(summary)
}
