//! Control-law types shared between the coefficient deriver, the
//! controllers and the register loader.
//!
//! Defines `PidTuning`, `DiscreteCoeffs` and `AccumulationMode`.

use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;

use crate::config::{ConfigError, require_finite, require_non_negative};

/// Continuous-time 2-DOF PID tuning.
///
/// Degenerate values are valid input: `ki = 0` disables the integral path,
/// `kp = 0` removes the derivative time constant and `n <= 0` removes the
/// derivative filter pole.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidTuning {
    /// Proportional gain.
    #[serde(default = "default_kp")]
    pub kp: f64,
    /// Integral gain (0 = disabled).
    #[serde(default = "default_ki")]
    pub ki: f64,
    /// Derivative gain (0 = disabled).
    #[serde(default = "default_kd")]
    pub kd: f64,
    /// Derivative filter order; the filter pole is `a = 1/n`.
    #[serde(default = "default_n")]
    pub n: f64,
    /// Setpoint weight in the proportional path.
    #[serde(default = "default_b")]
    pub b: f64,
    /// Setpoint weight in the derivative path.
    #[serde(default)]
    pub c: f64,
    /// Anti-windup back-calculation gain [1/s].
    #[serde(default = "default_kb")]
    pub kb: f64,
}

fn default_kp() -> f64 {
    0.11
}

fn default_ki() -> f64 {
    0.08
}

fn default_kd() -> f64 {
    0.0011
}

fn default_n() -> f64 {
    120.0
}

fn default_b() -> f64 {
    1.0
}

fn default_kb() -> f64 {
    12.0
}

impl Default for PidTuning {
    fn default() -> Self {
        Self {
            kp: default_kp(),
            ki: default_ki(),
            kd: default_kd(),
            n: default_n(),
            b: default_b(),
            c: 0.0,
            kb: default_kb(),
        }
    }
}

impl PidTuning {
    /// Validate the tuning.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if any value is non-finite or
    /// if `ki`, `kd` or `kb` is negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_finite("kp", self.kp)?;
        require_non_negative("ki", self.ki)?;
        require_non_negative("kd", self.kd)?;
        require_finite("n", self.n)?;
        require_finite("b", self.b)?;
        require_finite("c", self.c)?;
        require_non_negative("kb", self.kb)?;
        Ok(())
    }

    /// Integral time constant `Ti = Kp/Ki`, `None` when the integral path is off.
    pub fn integral_time(&self) -> Option<f64> {
        (self.kp > 0.0 && self.ki > 0.0).then(|| self.kp / self.ki)
    }

    /// Derivative time constant `Td = Kd/Kp`, zero when `Kp <= 0`.
    pub fn derivative_time(&self) -> f64 {
        if self.kp > 0.0 { self.kd / self.kp } else { 0.0 }
    }

    /// Derivative filter pole `a = 1/N`, zero when `N <= 0`.
    pub fn filter_pole(&self) -> f64 {
        if self.n > 0.0 { 1.0 / self.n } else { 0.0 }
    }
}

/// Number of coefficient registers.
pub const COEFF_COUNT: usize = 9;

/// Discrete Δ-form coefficients, stored in single precision.
///
/// `a0` weights the previous delta output, `c1..c3` the setpoint history,
/// `c4..c6` the measurement history and `c7a`/`c7b` the two anti-windup
/// taps.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(C)]
pub struct DiscreteCoeffs {
    pub a0: f32,
    pub c1: f32,
    pub c2: f32,
    pub c3: f32,
    pub c4: f32,
    pub c5: f32,
    pub c6: f32,
    pub c7a: f32,
    pub c7b: f32,
}

const_assert_eq!(
    core::mem::size_of::<DiscreteCoeffs>(),
    COEFF_COUNT * core::mem::size_of::<u32>()
);

impl DiscreteCoeffs {
    /// Coefficients baked into the reference hardware for the default
    /// tuning at 200 Hz. Derivation reproduces them to within a few ULP.
    pub const HARDWARE_REFERENCE: Self = Self::from_bits([
        0x3C86_4B8B,
        0x3DE2_1965,
        0xBDE4_FC8E,
        0x3AEC_5C01,
        0xBEA7_5178,
        0x3F0B_6AB1,
        0xBE5F_6EF6,
        0x3B9D_4952,
        0xB8A5_05D6,
    ]);

    /// Build from raw IEEE-754 bit patterns in register order.
    pub const fn from_bits(bits: [u32; COEFF_COUNT]) -> Self {
        Self {
            a0: f32::from_bits(bits[0]),
            c1: f32::from_bits(bits[1]),
            c2: f32::from_bits(bits[2]),
            c3: f32::from_bits(bits[3]),
            c4: f32::from_bits(bits[4]),
            c5: f32::from_bits(bits[5]),
            c6: f32::from_bits(bits[6]),
            c7a: f32::from_bits(bits[7]),
            c7b: f32::from_bits(bits[8]),
        }
    }

    /// Raw bit patterns in register order (a0, c1..c6, c7a, c7b).
    pub fn to_bits(&self) -> [u32; COEFF_COUNT] {
        self.as_array().map(f32::to_bits)
    }

    /// Values in register order (a0, c1..c6, c7a, c7b).
    pub fn as_array(&self) -> [f32; COEFF_COUNT] {
        [
            self.a0, self.c1, self.c2, self.c3, self.c4, self.c5, self.c6, self.c7a, self.c7b,
        ]
    }

    /// Returns true if all coefficients are finite (not NaN, not Inf).
    pub fn is_finite(&self) -> bool {
        self.as_array().iter().all(|c| c.is_finite())
    }
}

/// Accumulation order of the nine-term Δ sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccumulationMode {
    /// Round after every multiply and every add (non-fused hardware pipeline).
    #[default]
    StepRounded,
    /// Fused multiply-add per term.
    Fused,
}
