// Divesim Station - Prometheus metrics definitions
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Prometheus metrics for dive-site stations.
//!
//! Channel gauges are labeled by site and sensor so several stations can
//! share one exporter.

use divesim::{Alert, EnvironmentEvent, Reading};
use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_gauge_vec, register_int_counter, CounterVec, Encoder,
    GaugeVec, IntCounter, TextEncoder,
};

lazy_static! {
    // ============================================================
    // Channel gauges (last reading)
    // ============================================================

    /// Water temperature in °C.
    pub static ref TEMPERATURE_CELSIUS: GaugeVec = register_gauge_vec!(
        "divesim_temperature_celsius",
        "Water temperature in degrees Celsius",
        &["site", "sensor"]
    ).unwrap();

    /// Current speed in m/s.
    pub static ref CURRENT_SPEED: GaugeVec = register_gauge_vec!(
        "divesim_current_speed_meters_per_second",
        "Water current speed in m/s",
        &["site", "sensor"]
    ).unwrap();

    /// Current direction in degrees.
    pub static ref CURRENT_DIRECTION: GaugeVec = register_gauge_vec!(
        "divesim_current_direction_degrees",
        "Water current direction in degrees (0-359)",
        &["site", "sensor"]
    ).unwrap();

    /// Visibility in meters.
    pub static ref VISIBILITY_METERS: GaugeVec = register_gauge_vec!(
        "divesim_visibility_meters",
        "Underwater visibility in meters (1-30)",
        &["site", "sensor"]
    ).unwrap();

    /// Ambient light in lux.
    pub static ref LUMINOSITY_LUX: GaugeVec = register_gauge_vec!(
        "divesim_luminosity_lux",
        "Ambient light in lux",
        &["site", "sensor"]
    ).unwrap();

    /// Battery charge in percent.
    pub static ref BATTERY_PERCENT: GaugeVec = register_gauge_vec!(
        "divesim_battery_percent",
        "Station battery charge in percent (0-100)",
        &["site", "sensor"]
    ).unwrap();

    // ============================================================
    // Counters
    // ============================================================

    /// Completed generation cycles.
    pub static ref CYCLES_TOTAL: CounterVec = register_counter_vec!(
        "divesim_cycles_total",
        "Completed generation cycles",
        &["site", "sensor"]
    ).unwrap();

    /// Alerts raised (labeled by type and severity).
    pub static ref ALERTS_TOTAL: CounterVec = register_counter_vec!(
        "divesim_alerts_total",
        "Safety alerts raised",
        &["site", "type", "level"]
    ).unwrap();

    /// Environment events injected.
    pub static ref EVENTS_TOTAL: CounterVec = register_counter_vec!(
        "divesim_events_total",
        "Environment events injected",
        &["site", "kind"]
    ).unwrap();

    /// Messages accepted by the transport.
    pub static ref MESSAGES_PUBLISHED_TOTAL: IntCounter = register_int_counter!(
        "divesim_messages_published_total",
        "Messages accepted by the transport"
    ).unwrap();

    /// Publish calls that failed (never retried).
    pub static ref PUBLISH_FAILURES_TOTAL: CounterVec = register_counter_vec!(
        "divesim_publish_failures_total",
        "Publish calls rejected by the transport",
        &["site"]
    ).unwrap();
}

/// Update channel gauges from a reading.
pub fn update_reading(reading: &Reading) {
    let labels = [reading.site_id.as_str(), reading.sensor_id.as_str()];
    TEMPERATURE_CELSIUS
        .with_label_values(&labels)
        .set(reading.temperature);
    CURRENT_SPEED
        .with_label_values(&labels)
        .set(reading.current_speed);
    CURRENT_DIRECTION
        .with_label_values(&labels)
        .set(reading.current_direction as f64);
    VISIBILITY_METERS
        .with_label_values(&labels)
        .set(reading.visibility);
    LUMINOSITY_LUX
        .with_label_values(&labels)
        .set(reading.luminosity);
    BATTERY_PERCENT
        .with_label_values(&labels)
        .set(reading.battery_level);
    CYCLES_TOTAL.with_label_values(&labels).inc();
}

/// Increment the alert counter.
pub fn record_alert(alert: &Alert) {
    ALERTS_TOTAL
        .with_label_values(&[
            alert.site_id.as_str(),
            alert.alert_type.as_str(),
            alert.severity.as_str(),
        ])
        .inc();
}

/// Increment the event counter.
pub fn record_event(site_id: &str, event: &EnvironmentEvent) {
    EVENTS_TOTAL
        .with_label_values(&[site_id, event.kind().as_str()])
        .inc();
}

/// Account for one cycle's publishing outcome.
pub fn record_publish(site_id: &str, published: usize, failed: usize) {
    MESSAGES_PUBLISHED_TOTAL.inc_by(published as u64);
    if failed > 0 {
        PUBLISH_FAILURES_TOTAL
            .with_label_values(&[site_id])
            .inc_by(failed as f64);
    }
}

/// Encode all metrics to Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}
