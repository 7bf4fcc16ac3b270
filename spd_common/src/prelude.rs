//! Prelude module for common re-exports.
//!
//! ```rust
//! use spd_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── Control Law Types ──────────────────────────────────────────────
pub use crate::control::{AccumulationMode, DiscreteCoeffs, PidTuning};

// ─── Encoder ────────────────────────────────────────────────────────
pub use crate::encoder::{EncoderGeometry, rpm_to_rad_per_sec};

// ─── Reference Scenario ─────────────────────────────────────────────
pub use crate::consts::{W_TARGET, YSAT_VOLT};
