// Divesim Station - Simulated dive-site monitoring station
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Divesim Station
//!
//! Runs one or more simulated dive-site stations, publishes their readings
//! and alerts, and exposes Prometheus metrics.
//!
//! ## Usage
//!
//! ```bash
//! # One station, JSON lines on stdout, metrics on :9100
//! divesim-station --site capo_vaticano --depth shallow
//!
//! # Several stations from a file, reproducible, ten cycles each
//! divesim-station --config stations.json --seed 42 --cycles 10 --interval 1
//!
//! # Publish the last 24 hours first
//! divesim-station --backfill-hours 24
//! ```

mod config;
mod metrics;
mod runner;
mod status;
mod topics;

#[cfg(feature = "backfill")]
mod backfill;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use clap::{Parser, ValueEnum};
use config::{load_stations, validate_stations, RunSettings, StationError};
use divesim::{
    NullTransport, StationConfig, SystemClock, Transport, WriterTransport,
    DEFAULT_EVENT_PROBABILITY,
};
use metrics::encode_metrics;
use runner::StationRunner;
use status::{StatusBoard, StatusResponse};
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

/// Where published messages go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Output {
    /// JSON lines `{"topic": .., "payload": ..}` on stdout
    Stdout,
    /// Discard
    #[value(name = "none")]
    Discard,
}

/// Divesim dive-site station simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Dive site identifier
    #[arg(long, default_value = "capo_vaticano")]
    site: String,

    /// Sensor identifier
    #[arg(long, default_value = "sensor_01")]
    sensor: String,

    /// Initial depth zone (surface, shallow, deep)
    #[arg(short, long, default_value = "shallow")]
    depth: String,

    /// Initial weather regime (calm, stormy, changing); random when omitted
    #[arg(short, long)]
    weather: Option<String>,

    /// Seconds between cycles (at least 1)
    #[arg(short, long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,

    /// Per-cycle probability of a random environment event
    #[arg(long, default_value_t = DEFAULT_EVENT_PROBABILITY)]
    event_probability: f64,

    /// Seed for reproducible runs (station i uses seed + i)
    #[arg(long)]
    seed: Option<u64>,

    /// Stop each station after this many cycles
    #[arg(long)]
    cycles: Option<u64>,

    /// Station list (JSON); replaces the single-station flags
    #[arg(short, long)]
    config: Option<String>,

    /// Port for the metrics server
    #[arg(short, long, default_value = "9100")]
    port: u16,

    /// Do not start the metrics server
    #[arg(long)]
    no_server: bool,

    /// Message sink
    #[arg(short, long, value_enum, default_value = "stdout")]
    output: Output,

    /// Publish this many hours of generated history before going live
    #[cfg(feature = "backfill")]
    #[arg(long)]
    backfill_hours: Option<u32>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn station_config(&self) -> StationConfig {
        let config = StationConfig::new()
            .with_site(&self.site)
            .with_sensor(&self.sensor)
            .with_depth(&self.depth)
            .with_event_probability(self.event_probability);
        match &self.weather {
            Some(w) => config.with_weather(w),
            None => config,
        }
    }

    fn run_settings(&self) -> RunSettings {
        RunSettings {
            interval: Duration::from_secs(self.interval),
            seed: self.seed,
            max_cycles: self.cycles,
        }
    }
}

type SharedTransport = Arc<Mutex<Box<dyn Transport + Send>>>;

/// Application state shared across handlers.
struct AppState {
    board: Arc<StatusBoard>,
    running: Arc<AtomicBool>,
    station_count: usize,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        EnvFilter::from_default_env().add_directive(level.into())
    });

    // Logs go to stderr so stdout stays a clean message stream.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Divesim Station v{}", env!("CARGO_PKG_VERSION"));

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), StationError> {
    let stations = match &args.config {
        Some(path) => load_stations(path)?,
        None => {
            let stations = vec![args.station_config()];
            validate_stations(&stations)?;
            stations
        }
    };
    let settings = args.run_settings();

    let sink: Box<dyn Transport + Send> = match args.output {
        Output::Stdout => Box::new(WriterTransport::new(std::io::stdout())),
        Output::Discard => Box::new(NullTransport::new()),
    };
    let transport: SharedTransport = Arc::new(Mutex::new(sink));

    let runners = stations
        .iter()
        .enumerate()
        .map(|(index, station)| {
            StationRunner::from_config(station, settings.station_rng(index), SystemClock)
                .map_err(|source| StationError::Station { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    #[cfg(feature = "backfill")]
    {
        if let Some(hours) = args.backfill_hours {
            let mut transport = transport.lock().await;
            let summary =
                backfill::publish_history(&mut **transport, &stations, hours, settings.seed)?;
            info!(
                "Backfill complete: {} readings, {} published, {} failed",
                summary.readings, summary.published, summary.failed
            );
        }
    }

    let running = Arc::new(AtomicBool::new(true));
    let board = Arc::new(StatusBoard::new());

    {
        let running = Arc::clone(&running);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown requested");
                running.store(false, Ordering::SeqCst);
            }
        });
    }

    if !args.no_server {
        let state = Arc::new(AppState {
            board: Arc::clone(&board),
            running: Arc::clone(&running),
            station_count: runners.len(),
        });

        // Build router
        let app = Router::new()
            .route("/", get(root_handler))
            .route("/metrics", get(metrics_handler))
            .route("/health", get(health_handler))
            .route("/ready", get(ready_handler))
            .route("/status", get(status_handler))
            .with_state(state);

        // Start server
        let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| StationError::Bind { addr, source })?;
        info!("Starting server on http://{}", addr);
        info!("Metrics endpoint: http://{}/metrics", addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!("Server error: {}", e);
            }
        });
    }

    let mut handles = Vec::with_capacity(runners.len());
    for runner in runners {
        info!(
            "Launching station {}/{}",
            runner.station().site_id,
            runner.station().sensor_id
        );
        handles.push(tokio::spawn(runner.run(
            Arc::clone(&transport),
            Arc::clone(&running),
            Arc::clone(&board),
            settings.clone(),
        )));
    }

    let mut total_cycles = 0;
    for handle in handles {
        match handle.await {
            Ok(cycles) => total_cycles += cycles,
            Err(e) => warn!("Station task failed: {}", e),
        }
    }
    running.store(false, Ordering::SeqCst);

    let mut transport = transport.lock().await;
    let sent = transport.metrics();
    transport.close();
    info!(
        "Stopped: {} cycles, {} messages published, {} failed",
        total_cycles, sent.messages_sent, sent.failures
    );

    Ok(())
}

/// Root handler - shows a simple HTML page.
async fn root_handler() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Divesim Station</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 800px; margin: 50px auto; padding: 20px; }
        h1 { color: #1b4f72; }
        a { color: #2e86c1; text-decoration: none; }
        a:hover { text-decoration: underline; }
        .endpoints { background: #f4f9fc; padding: 20px; border-radius: 8px; margin: 20px 0; }
        .endpoint { margin: 10px 0; }
        code { background: #e9ecef; padding: 2px 6px; border-radius: 4px; }
    </style>
</head>
<body>
    <h1>Divesim Station</h1>
    <p>Simulated underwater monitoring stations for dive sites.</p>

    <div class="endpoints">
        <h2>Endpoints</h2>
        <div class="endpoint"><a href="/metrics">/metrics</a> - Prometheus metrics</div>
        <div class="endpoint"><a href="/health">/health</a> - Health check</div>
        <div class="endpoint"><a href="/ready">/ready</a> - Readiness check</div>
        <div class="endpoint"><a href="/status">/status</a> - Last reading and active alerts per station (JSON)</div>
    </div>

    <h2>Metrics</h2>
    <ul>
        <li><code>divesim_temperature_celsius</code> - Water temperature</li>
        <li><code>divesim_current_speed_meters_per_second</code> - Current speed</li>
        <li><code>divesim_current_direction_degrees</code> - Current direction</li>
        <li><code>divesim_visibility_meters</code> - Visibility</li>
        <li><code>divesim_luminosity_lux</code> - Ambient light</li>
        <li><code>divesim_battery_percent</code> - Battery charge</li>
        <li><code>divesim_cycles_total</code> - Generation cycles</li>
        <li><code>divesim_alerts_total</code> - Safety alerts by type and level</li>
        <li><code>divesim_events_total</code> - Environment events by kind</li>
        <li><code>divesim_publish_failures_total</code> - Rejected publishes</li>
    </ul>
</body>
</html>"#,
    )
}

/// Metrics handler - returns Prometheus text format.
async fn metrics_handler() -> impl IntoResponse {
    let metrics = encode_metrics();
    (
        StatusCode::OK,
        [("Content-Type", "text/plain; charset=utf-8")],
        metrics,
    )
}

/// Health check handler.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Readiness check handler.
async fn ready_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = state
        .board
        .snapshot(state.running.load(Ordering::SeqCst))
        .await;
    readiness(&status, state.station_count)
}

fn readiness(status: &StatusResponse, station_count: usize) -> (StatusCode, &'static str) {
    if status.is_ready(station_count) {
        (StatusCode::OK, "Ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Not ready")
    }
}

/// Status handler - returns JSON status information.
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(
        state
            .board
            .snapshot(state.running.load(Ordering::SeqCst))
            .await,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let args = Args::parse_from(["divesim-station"]);
        assert_eq!(args.site, "capo_vaticano");
        assert_eq!(args.depth, "shallow");
        assert_eq!(args.interval, 30);
        assert_eq!(args.port, 9100);
        assert_eq!(args.output, Output::Stdout);
        assert!(args.weather.is_none());

        let config = args.station_config();
        assert_eq!(config, StationConfig::default());
        assert_eq!(args.run_settings(), RunSettings::default());
    }

    #[test]
    fn test_cli_station_flags() {
        let args = Args::parse_from([
            "divesim-station",
            "--site",
            "stromboli_east",
            "--depth",
            "deep",
            "--weather",
            "stormy",
            "--interval",
            "5",
            "--seed",
            "42",
            "--cycles",
            "10",
            "--output",
            "none",
        ]);
        let config = args.station_config();
        assert_eq!(config.site_id, "stromboli_east");
        assert_eq!(config.weather_regime.as_deref(), Some("stormy"));
        assert_eq!(args.output, Output::Discard);

        let settings = args.run_settings();
        assert_eq!(settings.interval, Duration::from_secs(5));
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.max_cycles, Some(10));
    }

    #[test]
    fn test_cli_rejects_zero_interval() {
        assert!(Args::try_parse_from(["divesim-station", "--interval", "0"]).is_err());
        let args = Args::parse_from(["divesim-station", "--interval", "1"]);
        assert_eq!(args.interval, 1);
    }

    #[test]
    fn test_cli_rejects_unknown_output() {
        assert!(Args::try_parse_from(["divesim-station", "--output", "mqtt"]).is_err());
    }

    #[tokio::test]
    async fn test_readiness() {
        let board = StatusBoard::new();
        let status = board.snapshot(true).await;
        assert_eq!(readiness(&status, 1).0, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(readiness(&status, 0).0, StatusCode::OK);
    }
}
