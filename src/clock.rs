// Divesim - Dive-site telemetry engine
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Clock abstraction
//!
//! Readings are stamped with a [`Timestamp`] and the diurnal terms read the
//! local hour of day from it.

use chrono::{DateTime, Duration, FixedOffset, Local, Timelike};

/// Timestamp carried by readings and alerts (site-local offset preserved).
pub type Timestamp = DateTime<FixedOffset>;

/// Source of wall-clock time
pub trait Clock {
    /// Current timestamp
    fn now(&self) -> Timestamp;

    /// Current hour of day, 0-23
    fn hour(&self) -> u32 {
        self.now().hour()
    }
}

/// Host wall clock in the local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Local::now().fixed_offset()
    }
}

/// Manually advanced clock for backfills and tests
#[derive(Debug, Clone)]
pub struct SimulatedClock {
    current: Timestamp,
}

impl SimulatedClock {
    /// Create a clock frozen at `start`
    pub fn new(start: Timestamp) -> Self {
        Self { current: start }
    }

    /// Move the clock forward
    pub fn advance(&mut self, step: Duration) {
        self.current += step;
    }

    /// Jump to an absolute time
    pub fn set(&mut self, at: Timestamp) {
        self.current = at;
    }
}

impl Clock for SimulatedClock {
    fn now(&self) -> Timestamp {
        self.current
    }
}
