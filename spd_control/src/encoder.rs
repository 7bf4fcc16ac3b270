//! Fixed-rate digital tachometer model.
//!
//! Converts the plant's true angular velocity into the integer speed
//! count latched by the board every gate period, and back into the
//! quantized measured velocity the controller sees.
//!
//! ```text
//! θ        += x_true·Ts                  (fused multiply-add)
//! C_now     = floor(θ / rad_per_count)
//! spdcnt    = C_now − C_prev             (16-bit register)
//! x_meas    = spdcnt · (rad_per_count / Ts)
//! ```
//!
//! `C_prev` carries the quantization remainder forward, so the sum of
//! emitted counts over any window equals the change of `floor(θ/rpc)`.
//!
//! ## 16-bit limit
//!
//! The status register holds the count in 16 bits. Deltas outside
//! `i16::MIN..=i16::MAX` wrap (two's complement truncation, as the
//! register would). The full delta is still reported in
//! [`EncoderSample::delta`] and [`EncoderSample::overflowed`] is set.

use spd_common::encoder::EncoderGeometry;
use tracing::warn;

/// One latched encoder sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncoderSample {
    /// Register value (wrapped to 16 bits).
    pub spdcnt: i16,
    /// Untruncated count delta.
    pub delta: i64,
    /// Quantized measured velocity [rad/s], from the register value.
    pub x_meas: f32,
    /// True when `delta` did not fit in the 16-bit register.
    pub overflowed: bool,
}

/// Quantizing encoder state.
#[derive(Debug, Clone)]
pub struct EncoderQuantizer {
    ts: f32,
    /// Measured velocity of one count per gate [rad/s].
    count_to_velocity: f32,
    /// Rotation represented by one count [rad].
    rad_per_count: f32,
    theta_rad: f32,
    c_prev: i64,
}

impl EncoderQuantizer {
    /// Create a quantizer for the given board geometry.
    pub fn new(geometry: &EncoderGeometry) -> Self {
        Self::with_factor(
            geometry.sample_period_f32(),
            geometry.rad_per_sec_per_count(),
        )
    }

    /// Create a quantizer from an explicit sample period and rad/s-per-count
    /// factor.
    pub fn with_factor(ts: f32, count_to_velocity: f32) -> Self {
        Self {
            ts,
            count_to_velocity,
            rad_per_count: count_to_velocity * ts,
            theta_rad: 0.0,
            c_prev: 0,
        }
    }

    /// Latch one gate period at true velocity `x_true` [rad/s].
    pub fn sample(&mut self, x_true: f32) -> EncoderSample {
        self.theta_rad = x_true.mul_add(self.ts, self.theta_rad);
        let c_now = self.count();

        // Counts saturate at the i64 range for non-physical angles.
        let delta = c_now.saturating_sub(self.c_prev);
        self.c_prev = c_now;

        let spdcnt = delta as i16;
        let overflowed = i64::from(spdcnt) != delta;
        if overflowed {
            warn!(delta, spdcnt, "speed count exceeds 16-bit register; wrapped");
        }

        EncoderSample {
            spdcnt,
            delta,
            x_meas: f32::from(spdcnt) * self.count_to_velocity,
            overflowed,
        }
    }

    /// `floor(θ / rad_per_count)` at the current angle.
    #[inline]
    pub fn count(&self) -> i64 {
        (self.theta_rad / self.rad_per_count).floor() as i64
    }

    /// Accumulated angle [rad].
    #[inline]
    pub fn theta_rad(&self) -> f32 {
        self.theta_rad
    }

    #[inline]
    pub fn rad_per_count(&self) -> f32 {
        self.rad_per_count
    }

    #[inline]
    pub fn count_to_velocity(&self) -> f32 {
        self.count_to_velocity
    }

    #[inline]
    pub fn sample_period(&self) -> f32 {
        self.ts
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
