// Divesim Station - Station runner
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Station runner.
//!
//! One runner owns one station: its environment state, random source and
//! clock. A cycle generates a reading, evaluates it, publishes it and then
//! maybe injects an event for the next cycle. Publishing is fire and
//! forget: a rejected message is counted and logged, never retried, and the
//! cycle always completes.

use crate::config::RunSettings;
use crate::metrics;
use crate::status::StatusBoard;
use crate::topics::Topics;
use divesim::{
    evaluate, generate, Alert, Clock, ConfigError, EnvironmentEvent, EnvironmentState,
    EventInjector, Reading, StationConfig, StationId, SystemClock, Transport, TransportError,
};
use rand::rngs::StdRng;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// Longest a stopped station keeps sleeping.
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

/// Outcome of one cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub reading: Reading,
    pub alerts: Vec<Alert>,
    /// Event applied after the reading; it shapes the next cycle.
    pub event: Option<EnvironmentEvent>,
    /// Messages accepted by the transport.
    pub published: usize,
    /// Messages rejected by the transport.
    pub failed: usize,
}

/// Drives one simulated station.
pub struct StationRunner<C: Clock = SystemClock> {
    station: StationId,
    topics: Topics,
    state: EnvironmentState,
    injector: EventInjector,
    rng: StdRng,
    clock: C,
    cycles: u64,
}

impl<C: Clock> StationRunner<C> {
    /// Build a runner from a validated station config.
    pub fn from_config(
        config: &StationConfig,
        mut rng: StdRng,
        clock: C,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let station = config.station_id()?;
        let state = config.build_state(&mut rng)?;
        let injector = EventInjector::with_probability(config.validated_event_probability()?)?;

        Ok(Self {
            topics: Topics::new(&station.site_id),
            station,
            state,
            injector,
            rng,
            clock,
            cycles: 0,
        })
    }

    pub fn station(&self) -> &StationId {
        &self.station
    }

    /// Run one generate, evaluate, publish, inject cycle.
    pub fn cycle<T: Transport + ?Sized>(&mut self, transport: &mut T) -> CycleReport {
        let reading = generate(&mut self.state, &self.station, self.clock.now(), &mut self.rng);
        let alerts = evaluate(&reading);

        info!(
            site = %self.station.site_id,
            sensor = %self.station.sensor_id,
            depth = %reading.depth_zone,
            weather = %reading.weather_regime,
            "{}",
            reading
        );

        let mut outcome = PublishOutcome::default();
        outcome.record(publish(transport, self.topics.data(), &reading));
        for (channel, payload) in reading.channel_payloads() {
            outcome.record(publish(transport, self.topics.channel(channel), &payload));
        }
        for alert in &alerts {
            warn!(site = %alert.site_id, "ALERT {}: {}", alert.severity, alert.message);
            outcome.record(publish(transport, self.topics.alerts(), alert));
        }
        for error in &outcome.errors {
            warn!(site = %self.station.site_id, "Publish failed: {}", error);
        }

        let event = self.injector.inject(&mut self.state, &mut self.rng);
        if let Some(ref event) = event {
            info!(site = %self.station.site_id, "Event: {}", event);
        }

        self.cycles += 1;

        let report = CycleReport {
            reading,
            alerts,
            event,
            published: outcome.published,
            failed: outcome.errors.len(),
        };
        record_metrics(&report);
        report
    }
}

impl<C: Clock + Send + 'static> StationRunner<C> {
    /// Cycle until `running` is cleared or the cycle cap is reached.
    ///
    /// The flag is checked between cycles and while sleeping, so a cycle in
    /// progress always completes. Returns the number of cycles run.
    pub async fn run<T>(
        mut self,
        transport: Arc<Mutex<T>>,
        running: Arc<AtomicBool>,
        board: Arc<StatusBoard>,
        settings: RunSettings,
    ) -> u64
    where
        T: Transport + Send + ?Sized,
    {
        info!(
            site = %self.station.site_id,
            sensor = %self.station.sensor_id,
            "Station started: depth={}, weather={}, interval={:?}",
            self.state.depth_zone(),
            self.state.weather_regime(),
            settings.interval
        );

        while running.load(Ordering::SeqCst) {
            let report = {
                let mut transport = transport.lock().await;
                self.cycle(&mut *transport)
            };
            board.record(&report).await;

            if settings.max_cycles.map_or(false, |max| self.cycles >= max) {
                info!(site = %self.station.site_id, "Cycle limit reached");
                break;
            }

            sleep_while_running(settings.interval, &running).await;
        }

        info!(
            site = %self.station.site_id,
            "Station stopped after {} cycles",
            self.cycles
        );
        self.cycles
    }
}

#[cfg(test)]
impl<C: Clock> StationRunner<C> {
    fn state(&self) -> &EnvironmentState {
        &self.state
    }

    fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    fn cycles(&self) -> u64 {
        self.cycles
    }
}

#[derive(Default)]
struct PublishOutcome {
    published: usize,
    errors: Vec<TransportError>,
}

impl PublishOutcome {
    fn record(&mut self, result: Result<(), TransportError>) {
        match result {
            Ok(()) => self.published += 1,
            Err(e) => self.errors.push(e),
        }
    }
}

fn publish<T, V>(transport: &mut T, topic: &str, value: &V) -> Result<(), TransportError>
where
    T: Transport + ?Sized,
    V: Serialize + ?Sized,
{
    let payload = serde_json::to_vec(value)?;
    debug!(topic, bytes = payload.len(), "publish");
    transport.publish(topic, &payload)
}

fn record_metrics(report: &CycleReport) {
    metrics::update_reading(&report.reading);
    for alert in &report.alerts {
        metrics::record_alert(alert);
    }
    if let Some(ref event) = report.event {
        metrics::record_event(&report.reading.site_id, event);
    }
    metrics::record_publish(&report.reading.site_id, report.published, report.failed);
}

async fn sleep_while_running(interval: Duration, running: &AtomicBool) {
    let deadline = Instant::now() + interval;
    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        sleep((deadline - now).min(SHUTDOWN_POLL)).await;
    }
}
