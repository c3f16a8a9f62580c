// Divesim Testdata - Dataset manifest
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Dataset manifest for describing generated datasets.
//!
//! A manifest is a small JSON summary written next to a dataset: what was
//! generated, the observed range of every channel and how many alerts and
//! events it contains.

use crate::dataset::{Dataset, DatasetError};
use chrono::{DateTime, Utc};
use divesim::{AlertType, DepthZone, SensorChannel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Dataset manifest describing a generated dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetManifest {
    /// Dataset name (matches filename without extension).
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Number of readings.
    pub sample_count: usize,
    /// Sample interval in minutes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_interval_minutes: Option<u32>,
    /// Sites present.
    pub sites: Vec<String>,
    /// Depth zones present.
    pub depths: Vec<DepthZone>,
    /// Observed range of every channel.
    pub channels: Vec<ChannelManifest>,
    /// Alert count per alert type.
    pub alert_counts: BTreeMap<String, usize>,
    /// Injected events.
    pub event_count: usize,
    /// Generation timestamp.
    pub generated_at: DateTime<Utc>,
    /// Random seed used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Channel information in manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelManifest {
    pub channel: SensorChannel,
    pub unit: String,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl DatasetManifest {
    /// Create an empty manifest.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            sample_count: 0,
            sample_interval_minutes: None,
            sites: Vec::new(),
            depths: Vec::new(),
            channels: Vec::new(),
            alert_counts: BTreeMap::new(),
            event_count: 0,
            generated_at: Utc::now(),
            seed: None,
        }
    }

    /// Summarize a dataset.
    ///
    /// Name and description are taken from the dataset metadata when set.
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let name = dataset.metadata.name.as_deref().unwrap_or("dataset");
        let mut manifest = Self::new(name);
        manifest.description = dataset.metadata.description.clone().unwrap_or_default();
        manifest.sample_count = dataset.len();
        manifest.sample_interval_minutes = dataset.metadata.sample_interval_minutes;
        manifest.seed = dataset.metadata.seed;
        manifest.sites = dataset.sites();
        manifest.depths = dataset.depths();
        manifest.event_count = dataset.metadata.events.len();

        manifest.channels = SensorChannel::ALL
            .iter()
            .filter_map(|&channel| {
                dataset.stats(channel).map(|s| ChannelManifest {
                    channel,
                    unit: channel.unit().to_string(),
                    min: s.min,
                    max: s.max,
                    mean: s.mean,
                })
            })
            .collect();

        for alert_type in AlertType::ALL {
            manifest.alert_counts.insert(alert_type.as_str().to_string(), 0);
        }
        for alert in dataset.alerts() {
            *manifest
                .alert_counts
                .entry(alert.alert_type.as_str().to_string())
                .or_insert(0) += 1;
        }

        manifest
    }

    /// Set description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = desc.to_string();
        self
    }

    /// Set seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Total alerts across all types.
    pub fn total_alerts(&self) -> usize {
        self.alert_counts.values().sum()
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to JSON file.
    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<(), DatasetError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load from JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{generate_history, BackfillConfig};
    use chrono::DateTime;
    use tempfile::NamedTempFile;

    fn dataset() -> Dataset {
        let config = BackfillConfig::new()
            .with_start(DateTime::parse_from_rfc3339("2024-07-01T00:00:00+00:00").unwrap())
            .with_hours_back(4)
            .with_seed(42);
        generate_history(&config)
            .unwrap()
            .with_name("history_4h")
            .with_description("four hours, three sites")
    }

    #[test]
    fn test_manifest_creation() {
        let manifest = DatasetManifest::new("test_dataset")
            .with_description("Test dataset")
            .with_seed(42);

        assert_eq!(manifest.name, "test_dataset");
        assert_eq!(manifest.seed, Some(42));
        assert_eq!(manifest.total_alerts(), 0);
    }

    #[test]
    fn test_from_dataset() {
        let dataset = dataset();
        let manifest = DatasetManifest::from_dataset(&dataset);

        assert_eq!(manifest.name, "history_4h");
        assert_eq!(manifest.sample_count, 24 * 9);
        assert_eq!(manifest.sample_interval_minutes, Some(10));
        assert_eq!(manifest.seed, Some(42));
        assert_eq!(manifest.sites.len(), 3);
        assert_eq!(manifest.depths, DepthZone::ALL.to_vec());
        assert_eq!(manifest.channels.len(), 5);
        assert_eq!(manifest.alert_counts.len(), 4);
        assert_eq!(manifest.total_alerts(), dataset.alerts().len());
        assert_eq!(manifest.event_count, dataset.metadata.events.len());

        let visibility = manifest
            .channels
            .iter()
            .find(|c| c.channel == SensorChannel::Visibility)
            .unwrap();
        assert_eq!(visibility.unit, "m");
        assert!(visibility.min >= 1.0 && visibility.max <= 30.0);
    }

    #[test]
    fn test_manifest_json() {
        let manifest = DatasetManifest::from_dataset(&dataset());

        let json = manifest.to_json().unwrap();
        assert!(json.contains("\"name\": \"history_4h\""));
        assert!(json.contains("\"temperature\""));

        let temp_file = NamedTempFile::new().unwrap();
        manifest.to_json_file(temp_file.path()).unwrap();
        let loaded = DatasetManifest::from_json_file(temp_file.path()).unwrap();
        assert_eq!(loaded.sample_count, manifest.sample_count);
        assert_eq!(loaded.alert_counts, manifest.alert_counts);
    }
}
