//! Harness error type.
//!
//! Numerical anomalies inside the control step are never errors; only
//! configuration, trace loading, prompting and report output can fail.

use std::io;

use spd_common::config::ConfigError;
use thiserror::Error;

use crate::bus::BusError;
use crate::trace::TraceError;

/// Errors surfaced by the validation harness and CLI.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Scenario configuration failed to load or validate.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Golden trace could not be read.
    #[error(transparent)]
    Trace(#[from] TraceError),

    /// Register access failed.
    #[error(transparent)]
    Bus(#[from] BusError),

    /// Report export failed.
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Configuration could not be rendered as TOML.
    #[error("failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),

    /// Terminal or file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No golden trace path given on the command line or in the config.
    #[error("no golden trace given (pass a path or set harness.golden_path)")]
    NoGoldenTrace,
}
