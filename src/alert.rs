// Divesim - Alert evaluation
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Safety alert evaluation
//!
//! A pure function from a [`Reading`] to the alerts it triggers. Channels
//! are checked independently, always in the order temperature, current,
//! visibility, battery. Alerts are never merged or deduplicated.

use crate::clock::Timestamp;
use crate::reading::Reading;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Water temperature below this is critical (°C)
pub const TEMPERATURE_CRITICAL_BELOW: f64 = 12.0;

/// Current faster than this warrants a warning (m/s)
pub const CURRENT_WARNING_ABOVE: f64 = 1.5;

/// Visibility below this warrants a warning (m)
pub const VISIBILITY_WARNING_BELOW: f64 = 5.0;

/// Battery below this raises an alert (%)
pub const BATTERY_ALERT_BELOW: f64 = 20.0;

/// Battery below this makes the alert critical (%)
pub const BATTERY_CRITICAL_BELOW: f64 = 10.0;

/// Channel that triggered an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Temperature,
    Current,
    Visibility,
    Battery,
}

impl AlertType {
    /// All alert types in evaluation order
    pub const ALL: [AlertType; 4] = [
        AlertType::Temperature,
        AlertType::Current,
        AlertType::Visibility,
        AlertType::Battery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Temperature => "temperature",
            AlertType::Current => "current",
            AlertType::Visibility => "visibility",
            AlertType::Battery => "battery",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A threshold crossing derived from one reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    #[serde(rename = "level")]
    pub severity: Severity,
    pub message: String,
    #[serde(rename = "value")]
    pub observed_value: f64,
    pub threshold: f64,
    pub timestamp: Timestamp,
    pub site_id: String,
}

impl Alert {
    fn from_reading(
        reading: &Reading,
        alert_type: AlertType,
        severity: Severity,
        message: &str,
        observed_value: f64,
        threshold: f64,
    ) -> Self {
        Self {
            alert_type,
            severity,
            message: message.to_string(),
            observed_value,
            threshold,
            timestamp: reading.timestamp,
            site_id: reading.site_id.clone(),
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} at {}: {} (value {}, threshold {})",
            self.severity, self.alert_type, self.site_id, self.message, self.observed_value,
            self.threshold
        )
    }
}

/// Evaluate every threshold rule against a reading.
pub fn evaluate(reading: &Reading) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if reading.temperature < TEMPERATURE_CRITICAL_BELOW {
        alerts.push(Alert::from_reading(
            reading,
            AlertType::Temperature,
            Severity::Critical,
            "Critical water temperature",
            reading.temperature,
            TEMPERATURE_CRITICAL_BELOW,
        ));
    }

    if reading.current_speed > CURRENT_WARNING_ABOVE {
        alerts.push(Alert::from_reading(
            reading,
            AlertType::Current,
            Severity::Warning,
            "Strong current",
            reading.current_speed,
            CURRENT_WARNING_ABOVE,
        ));
    }

    if reading.visibility < VISIBILITY_WARNING_BELOW {
        alerts.push(Alert::from_reading(
            reading,
            AlertType::Visibility,
            Severity::Warning,
            "Poor visibility",
            reading.visibility,
            VISIBILITY_WARNING_BELOW,
        ));
    }

    if reading.battery_level < BATTERY_ALERT_BELOW {
        let severity = if reading.battery_level < BATTERY_CRITICAL_BELOW {
            Severity::Critical
        } else {
            Severity::Warning
        };
        alerts.push(Alert::from_reading(
            reading,
            AlertType::Battery,
            severity,
            "Low battery",
            reading.battery_level,
            BATTERY_ALERT_BELOW,
        ));
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{DepthZone, WeatherRegime};
    use chrono::DateTime;

    fn nominal() -> Reading {
        Reading {
            timestamp: DateTime::parse_from_rfc3339("2024-07-01T12:00:00+02:00").unwrap(),
            site_id: "tropea_reef".to_string(),
            sensor_id: "sensor_01".to_string(),
            depth_zone: DepthZone::Shallow,
            temperature: 18.0,
            current_speed: 0.4,
            current_direction: 45,
            visibility: 15.0,
            luminosity: 600.0,
            battery_level: 80.0,
            weather_regime: WeatherRegime::Calm,
        }
    }

    #[test]
    fn test_nominal_reading_is_quiet() {
        assert!(evaluate(&nominal()).is_empty());
    }

    #[test]
    fn test_temperature_boundary() {
        let mut r = nominal();
        r.temperature = 12.0;
        assert!(evaluate(&r).is_empty());

        r.temperature = 11.99;
        let alerts = evaluate(&r);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::Temperature);
        assert_eq!(alerts[0].severity, Severity::Critical);
        assert_eq!(alerts[0].threshold, 12.0);
        assert_eq!(alerts[0].observed_value, 11.99);
    }

    #[test]
    fn test_current_boundary() {
        let mut r = nominal();
        r.current_speed = 1.5;
        assert!(evaluate(&r).is_empty());

        r.current_speed = 1.51;
        let alerts = evaluate(&r);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Severity::Warning);
        assert_eq!(alerts[0].threshold, 1.5);
    }

    #[test]
    fn test_visibility_boundary() {
        let mut r = nominal();
        r.visibility = 5.0;
        assert!(evaluate(&r).is_empty());

        r.visibility = 4.9;
        let alerts = evaluate(&r);
        assert_eq!(alerts[0].alert_type, AlertType::Visibility);
        assert_eq!(alerts[0].severity, Severity::Warning);
    }

    #[test]
    fn test_battery_severity_tiers() {
        let mut r = nominal();
        r.battery_level = 20.0;
        assert!(evaluate(&r).is_empty());

        r.battery_level = 19.9;
        assert_eq!(evaluate(&r)[0].severity, Severity::Warning);

        r.battery_level = 10.0;
        assert_eq!(evaluate(&r)[0].severity, Severity::Warning);

        r.battery_level = 9.9;
        let alerts = evaluate(&r);
        assert_eq!(alerts[0].severity, Severity::Critical);
        assert_eq!(alerts[0].threshold, 20.0);
    }

    #[test]
    fn test_all_channels_in_fixed_order() {
        let mut r = nominal();
        r.temperature = 9.0;
        r.current_speed = 2.2;
        r.visibility = 2.0;
        r.battery_level = 5.0;

        let types: Vec<AlertType> = evaluate(&r).iter().map(|a| a.alert_type).collect();
        assert_eq!(types, AlertType::ALL.to_vec());
    }

    #[test]
    fn test_alert_carries_reading_context() {
        let mut r = nominal();
        r.visibility = 3.2;
        let alert = &evaluate(&r)[0];
        assert_eq!(alert.site_id, "tropea_reef");
        assert_eq!(alert.timestamp, r.timestamp);
    }

    #[test]
    fn test_alert_wire_format() {
        let mut r = nominal();
        r.battery_level = 7.5;
        let json = serde_json::to_value(&evaluate(&r)[0]).unwrap();
        assert_eq!(json["type"], "battery");
        assert_eq!(json["level"], "critical");
        assert_eq!(json["value"], 7.5);
        assert_eq!(json["threshold"], 20.0);
        assert_eq!(json["site_id"], "tropea_reef");
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::Warning);
    }
}
