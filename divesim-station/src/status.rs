// Divesim Station - Status board
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Latest state of every running station, served on `/status`.

use crate::runner::CycleReport;
use divesim::{Alert, EnvironmentEvent, Reading};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;
use tokio::sync::RwLock;

/// Last known state of one station.
#[derive(Debug, Clone, Serialize)]
pub struct StationStatus {
    pub site_id: String,
    pub sensor_id: String,
    pub cycles: u64,
    pub last_reading: Reading,
    /// Alerts raised by the last reading.
    pub active_alerts: Vec<Alert>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_event: Option<EnvironmentEvent>,
    pub publish_failures: u64,
}

/// Status information response.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub version: String,
    pub uptime_secs: u64,
    pub running: bool,
    pub stations: Vec<StationStatus>,
}

impl StatusResponse {
    /// Ready once every expected station has reported at least once.
    pub fn is_ready(&self, expected_stations: usize) -> bool {
        self.running && self.stations.len() >= expected_stations
    }
}

/// Shared between station tasks and HTTP handlers.
#[derive(Debug)]
pub struct StatusBoard {
    start_time: Instant,
    stations: RwLock<BTreeMap<String, StationStatus>>,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            stations: RwLock::new(BTreeMap::new()),
        }
    }
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed cycle.
    pub async fn record(&self, report: &CycleReport) {
        let key = format!("{}/{}", report.reading.site_id, report.reading.sensor_id);
        let mut stations = self.stations.write().await;
        let entry = stations.entry(key).or_insert_with(|| StationStatus {
            site_id: report.reading.site_id.clone(),
            sensor_id: report.reading.sensor_id.clone(),
            cycles: 0,
            last_reading: report.reading.clone(),
            active_alerts: Vec::new(),
            last_event: None,
            publish_failures: 0,
        });
        entry.cycles += 1;
        entry.last_reading = report.reading.clone();
        entry.active_alerts = report.alerts.clone();
        if report.event.is_some() {
            entry.last_event = report.event;
        }
        entry.publish_failures += report.failed as u64;
    }

    /// Snapshot for `/status`.
    pub async fn snapshot(&self, running: bool) -> StatusResponse {
        let stations = self.stations.read().await;
        StatusResponse {
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: self.start_time.elapsed().as_secs(),
            running,
            stations: stations.values().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use divesim::{evaluate, DepthZone, WeatherRegime};

    fn report(site: &str, battery: f64, event: Option<EnvironmentEvent>) -> CycleReport {
        let reading = Reading {
            timestamp: DateTime::parse_from_rfc3339("2024-07-01T12:00:00+02:00").unwrap(),
            site_id: site.to_string(),
            sensor_id: "sensor_01".to_string(),
            depth_zone: DepthZone::Shallow,
            temperature: 19.0,
            current_speed: 0.6,
            current_direction: 90,
            visibility: 14.0,
            luminosity: 800.0,
            battery_level: battery,
            weather_regime: WeatherRegime::Calm,
        };
        CycleReport {
            alerts: evaluate(&reading),
            reading,
            event,
            published: 7,
            failed: 0,
        }
    }

    #[tokio::test]
    async fn test_record_and_snapshot() {
        let board = StatusBoard::new();
        board.record(&report("tropea_reef", 90.0, None)).await;
        board
            .record(&report(
                "tropea_reef",
                15.0,
                Some(EnvironmentEvent::Maintenance {
                    previous_charge: 15.0,
                }),
            ))
            .await;
        board.record(&report("capo_vaticano", 80.0, None)).await;

        let status = board.snapshot(true).await;
        assert_eq!(status.stations.len(), 2);
        // BTreeMap order
        assert_eq!(status.stations[0].site_id, "capo_vaticano");

        let tropea = &status.stations[1];
        assert_eq!(tropea.cycles, 2);
        assert_eq!(tropea.last_reading.battery_level, 15.0);
        assert_eq!(tropea.active_alerts.len(), 1);
        assert!(tropea.last_event.is_some());
    }

    #[tokio::test]
    async fn test_event_is_sticky() {
        let board = StatusBoard::new();
        let event = EnvironmentEvent::Maintenance {
            previous_charge: 40.0,
        };
        board.record(&report("a", 90.0, Some(event))).await;
        board.record(&report("a", 89.0, None)).await;

        let status = board.snapshot(true).await;
        assert_eq!(status.stations[0].last_event, Some(event));
    }

    #[tokio::test]
    async fn test_readiness() {
        let board = StatusBoard::new();
        assert!(!board.snapshot(true).await.is_ready(1));

        board.record(&report("a", 90.0, None)).await;
        assert!(board.snapshot(true).await.is_ready(1));
        assert!(!board.snapshot(true).await.is_ready(2));
        assert!(!board.snapshot(false).await.is_ready(1));
    }

    #[tokio::test]
    async fn test_status_json() {
        let board = StatusBoard::new();
        board.record(&report("a", 5.0, None)).await;
        let json = serde_json::to_value(board.snapshot(true).await).unwrap();

        assert_eq!(json["stations"][0]["last_reading"]["depth"], "shallow");
        assert_eq!(json["stations"][0]["active_alerts"][0]["type"], "battery");
        assert_eq!(json["stations"][0]["active_alerts"][0]["level"], "critical");
    }
}
