// Divesim Testdata - Dataset structures
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Dataset structures and I/O operations.
//!
//! A [`Dataset`] is an ordered series of [`Reading`]s, exactly as the
//! station would have published them, plus the events injected while
//! generating it.

use chrono::Duration;
use divesim::{
    evaluate, Alert, ConfigError, DepthZone, EnvironmentEvent, Reading, SensorChannel, Timestamp,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;

/// Dataset error types.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Empty dataset")]
    Empty,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// An event injected into one series while backfilling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Timestamp of the reading the event followed.
    pub timestamp: Timestamp,
    pub site_id: String,
    pub sensor_id: String,
    pub event: EnvironmentEvent,
}

/// Dataset metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    /// Dataset name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Generation seed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Sample interval in minutes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_interval_minutes: Option<u32>,
    /// Events injected during generation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<EventRecord>,
}

/// A series of readings across one or more stations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Readings, in generation order.
    pub rows: Vec<Reading>,
    /// Metadata.
    #[serde(default)]
    pub metadata: DatasetMetadata,
}

/// Basic statistics for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl Dataset {
    /// Create an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dataset from readings.
    pub fn from_rows(rows: Vec<Reading>) -> Self {
        Self {
            rows,
            metadata: DatasetMetadata::default(),
        }
    }

    /// Append a reading.
    pub fn push(&mut self, reading: Reading) {
        self.rows.push(reading);
    }

    /// Get all rows.
    pub fn rows(&self) -> &[Reading] {
        &self.rows
    }

    /// Get number of readings.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Site identifiers, in first-seen order.
    pub fn sites(&self) -> Vec<String> {
        let mut sites: Vec<String> = Vec::new();
        for row in &self.rows {
            if !sites.contains(&row.site_id) {
                sites.push(row.site_id.clone());
            }
        }
        sites
    }

    /// Depth zones present, in first-seen order.
    pub fn depths(&self) -> Vec<DepthZone> {
        let mut depths = Vec::new();
        for row in &self.rows {
            if !depths.contains(&row.depth_zone) {
                depths.push(row.depth_zone);
            }
        }
        depths
    }

    /// Time span between the earliest and latest reading.
    pub fn duration(&self) -> Duration {
        let first = self.rows.iter().map(|r| r.timestamp).min();
        let last = self.rows.iter().map(|r| r.timestamp).max();
        match (first, last) {
            (Some(first), Some(last)) => last - first,
            _ => Duration::zero(),
        }
    }

    /// Get a channel as a vector of values.
    pub fn column(&self, channel: SensorChannel) -> Vec<f64> {
        self.rows.iter().map(|r| r.value(channel)).collect()
    }

    /// Keep only the readings of one site and/or depth zone.
    ///
    /// Metadata is kept; recorded events are filtered by site.
    pub fn filter(&self, site: Option<&str>, depth: Option<DepthZone>) -> Dataset {
        let rows = self
            .rows
            .iter()
            .filter(|r| site.map_or(true, |s| r.site_id == s))
            .filter(|r| depth.map_or(true, |d| r.depth_zone == d))
            .cloned()
            .collect();

        let mut metadata = self.metadata.clone();
        if let Some(site) = site {
            metadata.events.retain(|e| e.site_id == site);
        }

        Dataset { rows, metadata }
    }

    /// Evaluate every reading, in row order.
    pub fn alerts(&self) -> Vec<Alert> {
        self.rows.iter().flat_map(evaluate).collect()
    }

    /// Set name.
    pub fn with_name(mut self, name: &str) -> Self {
        self.metadata.name = Some(name.to_string());
        self
    }

    /// Set description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.metadata.description = Some(description.to_string());
        self
    }

    /// Write readings as CSV, one row per reading with a header line.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), DatasetError> {
        if self.rows.is_empty() {
            return Err(DatasetError::Empty);
        }
        let mut writer = csv::Writer::from_writer(writer);
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read readings from CSV produced by [`Dataset::write_csv`].
    pub fn read_csv<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut reader = csv::Reader::from_reader(reader);
        let rows = reader
            .deserialize()
            .collect::<Result<Vec<Reading>, csv::Error>>()?;
        if rows.is_empty() {
            return Err(DatasetError::Empty);
        }
        Ok(Dataset::from_rows(rows))
    }

    /// Export to CSV file.
    pub fn to_csv(&self, path: impl AsRef<Path>) -> Result<(), DatasetError> {
        let file = File::create(path)?;
        self.write_csv(BufWriter::new(file))
    }

    /// Import from CSV file.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let file = File::open(path)?;
        Self::read_csv(BufReader::new(file))
    }

    /// Export to JSON file, metadata included.
    pub fn to_json(&self, path: impl AsRef<Path>) -> Result<(), DatasetError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Import from JSON file.
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let dataset = serde_json::from_reader(reader)?;
        Ok(dataset)
    }

    /// Calculate basic statistics for a channel.
    pub fn stats(&self, channel: SensorChannel) -> Option<ChannelStats> {
        let values = self.column(channel);

        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let sum: f64 = values.iter().sum();
        let mean = sum / count as f64;

        let variance: f64 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;
        let std_dev = variance.sqrt();

        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        Some(ChannelStats {
            count,
            mean,
            std_dev,
            min,
            max,
        })
    }
}
