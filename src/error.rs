// Divesim - Dive-site telemetry engine
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for Divesim
//!
//! Generation and evaluation never fail: every input is an enum or bounded
//! state and every output is clamped. The only fallible paths are building a
//! station from configuration and handing payloads to a transport.

use thiserror::Error;

/// Result type alias for Divesim operations
pub type Result<T> = std::result::Result<T, DivesimError>;

/// Main error type for Divesim operations
#[derive(Error, Debug)]
pub enum DivesimError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Transport error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Errors raised while building station state from configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A configuration value is not recognized or out of range
    #[error("Invalid configuration for `{field}`: {value:?} ({reason})")]
    InvalidConfiguration {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidConfiguration {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Errors related to the publishing transport
#[derive(Error, Debug)]
pub enum TransportError {
    /// Transport has been closed
    #[error("Transport closed")]
    Closed,

    /// Buffer full
    #[error("Send buffer full ({capacity} messages)")]
    BufferFull { capacity: usize },

    /// Underlying writer failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
