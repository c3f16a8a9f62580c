// Divesim Station - Topic layout
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Topic layout for one dive site.
//!
//! ```text
//! dive/{site}/sensors/data           full reading
//! dive/{site}/sensors/{channel}      temperature, current, visibility, luminosity
//! dive/{site}/status/battery         battery level
//! dive/{site}/alerts                 one message per alert
//! ```

use divesim::SensorChannel;

/// Root of every topic.
pub const TOPIC_ROOT: &str = "dive";

/// Precomputed topics for one site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    data: String,
    channels: [String; 5],
    alerts: String,
}

impl Topics {
    pub fn new(site_id: &str) -> Self {
        let channels = SensorChannel::ALL.map(|channel| match channel {
            SensorChannel::Battery => format!("{}/{}/status/battery", TOPIC_ROOT, site_id),
            other => format!("{}/{}/sensors/{}", TOPIC_ROOT, site_id, other.as_str()),
        });
        Self {
            data: format!("{}/{}/sensors/data", TOPIC_ROOT, site_id),
            channels,
            alerts: format!("{}/{}/alerts", TOPIC_ROOT, site_id),
        }
    }

    /// Full reading topic
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Single-channel topic
    pub fn channel(&self, channel: SensorChannel) -> &str {
        let idx = match channel {
            SensorChannel::Temperature => 0,
            SensorChannel::Current => 1,
            SensorChannel::Visibility => 2,
            SensorChannel::Luminosity => 3,
            SensorChannel::Battery => 4,
        };
        &self.channels[idx]
    }

    /// Alert topic
    pub fn alerts(&self) -> &str {
        &self.alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_layout() {
        let topics = Topics::new("capo_vaticano");
        assert_eq!(topics.data(), "dive/capo_vaticano/sensors/data");
        assert_eq!(
            topics.channel(SensorChannel::Temperature),
            "dive/capo_vaticano/sensors/temperature"
        );
        assert_eq!(
            topics.channel(SensorChannel::Current),
            "dive/capo_vaticano/sensors/current"
        );
        assert_eq!(
            topics.channel(SensorChannel::Visibility),
            "dive/capo_vaticano/sensors/visibility"
        );
        assert_eq!(
            topics.channel(SensorChannel::Luminosity),
            "dive/capo_vaticano/sensors/luminosity"
        );
        assert_eq!(
            topics.channel(SensorChannel::Battery),
            "dive/capo_vaticano/status/battery"
        );
        assert_eq!(topics.alerts(), "dive/capo_vaticano/alerts");
    }

    #[test]
    fn test_every_channel_has_its_own_topic() {
        let topics = Topics::new("tropea_reef");
        for channel in SensorChannel::ALL {
            let topic = topics.channel(channel);
            assert!(topic.ends_with(channel.as_str()), "{} -> {}", channel.as_str(), topic);
        }
        let mut all: Vec<&str> = SensorChannel::ALL.iter().map(|c| topics.channel(*c)).collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), SensorChannel::ALL.len());
    }

    #[test]
    fn test_sites_do_not_share_topics() {
        let a = Topics::new("tropea_reef");
        let b = Topics::new("stromboli_east");
        assert_ne!(a.data(), b.data());
        assert!(a.alerts().contains("tropea_reef"));
    }
}
