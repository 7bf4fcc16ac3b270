//! Simulation/validation configuration (TOML).
//!
//! One file describes a complete closed-loop scenario: tuning, encoder
//! geometry, output limit, plant and harness settings. Every section is
//! optional and defaults to the reference bench scenario.
//!
//! ```toml
//! [shared]
//! service_name = "speed-loop-sim"
//!
//! [tuning]
//! kp = 0.11
//! ki = 0.08
//!
//! [harness]
//! steps = 100
//! accumulation = "step_rounded"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use spd_common::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
use spd_common::consts::{
    DEFAULT_REPORTED_MISMATCHES, DEFAULT_TOLERANCE, REFERENCE_STEPS, W_TARGET, YSAT_VOLT,
};
use spd_common::control::{AccumulationMode, PidTuning};
use spd_common::encoder::EncoderGeometry;

use crate::harness::Tolerance;
use crate::plant::PlantParams;

/// Default service name when none is configured.
pub const DEFAULT_SERVICE_NAME: &str = "speed-loop-sim";

/// Actuator output settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output saturation limit [V].
    #[serde(default = "default_ysat")]
    pub ysat: f32,
}

fn default_ysat() -> f32 {
    YSAT_VOLT
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { ysat: YSAT_VOLT }
    }
}

/// Validation harness settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Number of closed-loop samples.
    #[serde(default = "default_steps")]
    pub steps: usize,
    /// Velocity setpoint [rad/s].
    #[serde(default = "default_setpoint")]
    pub setpoint: f32,
    /// Accumulation order of the Δ-form controller.
    #[serde(default)]
    pub accumulation: AccumulationMode,
    /// Absolute comparison tolerance.
    #[serde(default = "default_tolerance")]
    pub abs_tol: f32,
    /// Relative comparison tolerance (controller-vs-controller only).
    #[serde(default = "default_tolerance")]
    pub rel_tol: f32,
    /// Number of failing samples listed in a golden report.
    #[serde(default = "default_reported")]
    pub max_reported_mismatches: usize,
    /// Golden trace used when none is given on the command line.
    #[serde(default)]
    pub golden_path: Option<PathBuf>,
}

fn default_steps() -> usize {
    REFERENCE_STEPS
}

fn default_setpoint() -> f32 {
    W_TARGET
}

fn default_tolerance() -> f32 {
    DEFAULT_TOLERANCE
}

fn default_reported() -> usize {
    DEFAULT_REPORTED_MISMATCHES
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            steps: REFERENCE_STEPS,
            setpoint: W_TARGET,
            accumulation: AccumulationMode::default(),
            abs_tol: DEFAULT_TOLERANCE,
            rel_tol: DEFAULT_TOLERANCE,
            max_reported_mismatches: DEFAULT_REPORTED_MISMATCHES,
            golden_path: None,
        }
    }
}

impl HarnessConfig {
    /// Tolerance pair for comparisons.
    pub fn tolerance(&self) -> Tolerance {
        Tolerance {
            abs: self.abs_tol,
            rel: self.rel_tol,
        }
    }
}

/// Complete scenario configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_shared")]
    pub shared: SharedConfig,
    #[serde(default)]
    pub tuning: PidTuning,
    #[serde(default)]
    pub encoder: EncoderGeometry,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub plant: PlantParams,
    #[serde(default)]
    pub harness: HarnessConfig,
}

fn default_shared() -> SharedConfig {
    SharedConfig {
        log_level: LogLevel::default(),
        service_name: DEFAULT_SERVICE_NAME.to_string(),
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            shared: default_shared(),
            tuning: PidTuning::default(),
            encoder: EncoderGeometry::default(),
            output: OutputConfig::default(),
            plant: PlantParams::default(),
            harness: HarnessConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Load and validate a scenario file.
    ///
    /// A relative `harness.golden_path` is taken relative to the directory
    /// holding the scenario file.
    pub fn load_validated(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.validate()?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Anchor a relative golden trace path at `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        if let Some(golden) = &self.harness.golden_path {
            if golden.is_relative() {
                self.harness.golden_path = Some(base.join(golden));
            }
        }
    }

    /// Validate every section.
    ///
    /// Degenerate tunings (`Kp = 0`, `Ki = 0`, `N <= 0`) are accepted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.tuning.validate()?;
        self.encoder.validate()?;
        self.plant.validate()?;

        if !(self.output.ysat.is_finite() && self.output.ysat > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "ysat must be finite and > 0, got {}",
                self.output.ysat
            )));
        }

        let h = &self.harness;
        if h.steps == 0 {
            return Err(ConfigError::ValidationError(
                "harness.steps must be > 0".to_string(),
            ));
        }
        if !h.setpoint.is_finite() {
            return Err(ConfigError::ValidationError(
                "harness.setpoint must be finite".to_string(),
            ));
        }
        for (name, tol) in [("abs_tol", h.abs_tol), ("rel_tol", h.rel_tol)] {
            if !(tol.is_finite() && tol >= 0.0) {
                return Err(ConfigError::ValidationError(format!(
                    "harness.{name} must be finite and >= 0, got {tol}"
                )));
            }
        }
        Ok(())
    }

    /// Sample period in double precision (coefficient derivation).
    #[inline]
    pub fn sample_period(&self) -> f64 {
        self.encoder.sample_period()
    }
}
