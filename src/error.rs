//! Error types for the sweep pipeline.
//!
//! Every remote call recovers locally from these errors by logging them; only
//! `ScanInProgress` and `ScanFailed` ever reach the caller of a scan.

use thiserror::Error;

/// Errors raised by configuration, remote clients and the scan pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SweepError {
    /// A required setting (usually a base URL) is absent.
    #[error("{0} is missing in the config")]
    ConfigurationMissing(String),

    /// Network or protocol failure talking to an upstream API.
    #[error("{0}")]
    Transport(String),

    /// Upstream answered with a non-success status.
    #[error("Request failed with status code {status}")]
    HttpStatus { status: u16 },

    /// Upstream answered, but not with the shape we expect.
    #[error("{0}")]
    UnexpectedResponse(String),

    #[error("Unknown size format: {0}")]
    UnknownSizeFormat(String),

    #[error("A scan is already in progress")]
    ScanInProgress,

    #[error("Scan failed: {0}")]
    ScanFailed(String),

    /// Configuration could not be loaded or applied.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for SweepError {
    fn from(err: reqwest::Error) -> Self {
        SweepError::Transport(err.to_string())
    }
}

impl From<config::ConfigError> for SweepError {
    fn from(err: config::ConfigError) -> Self {
        SweepError::Config(err.to_string())
    }
}
