//! Encoder geometry and speed-unit conversions.
//!
//! The board latches a quadrature count every gate period; one count per
//! gate period corresponds to `2π·gate_hz/CPR` rad/s.

use core::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::consts::{CPR_QUAD, GATE_HZ};

/// Fixed encoder/gate geometry, constructed once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderGeometry {
    /// Counts per revolution in quadrature (4x) decoding.
    #[serde(default = "default_cpr")]
    pub counts_per_rev: u32,
    /// Gate (sampling) frequency [Hz].
    #[serde(default = "default_gate_hz")]
    pub gate_hz: u32,
}

fn default_cpr() -> u32 {
    CPR_QUAD
}

fn default_gate_hz() -> u32 {
    GATE_HZ
}

impl Default for EncoderGeometry {
    fn default() -> Self {
        Self {
            counts_per_rev: CPR_QUAD,
            gate_hz: GATE_HZ,
        }
    }
}

impl EncoderGeometry {
    /// Validate the geometry.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if either field is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.counts_per_rev == 0 {
            return Err(ConfigError::ValidationError(
                "counts_per_rev must be > 0".to_string(),
            ));
        }
        if self.gate_hz == 0 {
            return Err(ConfigError::ValidationError(
                "gate_hz must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Sample period `Ts = 1/gate_hz` [s], double precision.
    #[inline]
    pub fn sample_period(&self) -> f64 {
        1.0 / f64::from(self.gate_hz)
    }

    /// Sample period in single precision, as used by the f32 loop.
    #[inline]
    pub fn sample_period_f32(&self) -> f32 {
        self.sample_period() as f32
    }

    /// Measured velocity represented by one count per gate [rad/s].
    #[inline]
    pub fn rad_per_sec_per_count(&self) -> f32 {
        (TAU * f64::from(self.gate_hz) / f64::from(self.counts_per_rev)) as f32
    }

    /// Measured speed represented by one count per gate [RPM].
    #[inline]
    pub fn rpm_per_count(&self) -> f32 {
        (60.0 * f64::from(self.gate_hz) / f64::from(self.counts_per_rev)) as f32
    }
}

/// Convert revolutions per minute to rad/s.
#[inline]
pub fn rpm_to_rad_per_sec(rpm: f32) -> f32 {
    rpm * (TAU / 60.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_geometry_matches_hardware_factor() {
        let g = EncoderGeometry::default();
        assert_eq!(g.rad_per_sec_per_count().to_bits(), 0x3F70_CAF0);
        assert_eq!(g.sample_period_f32(), 0.005_f32);
    }

    #[test]
    fn rpm_factor_is_consistent_with_rad_factor() {
        let g = EncoderGeometry::default();
        let via_rpm = rpm_to_rad_per_sec(g.rpm_per_count());
        assert!((via_rpm - g.rad_per_sec_per_count()).abs() < 1e-6);
    }

    #[test]
    fn zero_geometry_rejected() {
        let g = EncoderGeometry {
            counts_per_rev: 0,
            ..Default::default()
        };
        assert!(g.validate().is_err());
        let g = EncoderGeometry {
            gate_hz: 0,
            ..Default::default()
        };
        assert!(g.validate().is_err());
    }

    #[test]
    fn rpm_conversion() {
        assert!((rpm_to_rad_per_sec(60.0) - core::f32::consts::TAU).abs() < 1e-5);
    }
}
