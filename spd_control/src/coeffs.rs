//! Continuous 2-DOF PID tuning → Δ-form discrete coefficients.
//!
//! All intermediate arithmetic is double precision; each coefficient is
//! rounded to f32 exactly once, on storage. The derivation is total: the
//! degenerate tunings (`Ki = 0`, `Kp = 0`, `N <= 0`, `den <= 0`) map to
//! explicit zero fallbacks instead of NaN/Inf.
//!
//! ```text
//! den = Ts + a·Td
//! a0  = a·Td / den
//! c1  =  Kp·(b + Ts/Ti + Td·c/den)
//! c2  = −Kp·(b·(Ts + 2a·Td) + a·Td·Ts/Ti + 2·Td·c) / den
//! c3  =  Kp·Td·(a·b + c) / den
//! c4  = −Kp·(1 + Ts/Ti + Td/den)
//! c5  =  Kp·(Ts + 2a·Td + a·Td·Ts/Ti + 2·Td) / den
//! c6  = −Kp·Td·(a + 1) / den
//! c7a =  Ki·Kb·Ts
//! c7b = −c7a·a0
//! ```

use spd_common::control::{DiscreteCoeffs, PidTuning};
use tracing::debug;

/// Time constants and filter pole resolved from a tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeConstants {
    /// `Ts/Ti`, exactly zero when the integral path is disabled.
    pub ts_over_ti: f64,
    /// Derivative time constant `Td` [s].
    pub td: f64,
    /// Derivative filter pole `a = 1/N`.
    pub a: f64,
    /// Common denominator `Ts + a·Td`.
    pub den: f64,
}

impl TimeConstants {
    /// Resolve the time constants of `tuning` at sample period `ts`.
    pub fn resolve(tuning: &PidTuning, ts: f64) -> Self {
        let td = tuning.derivative_time();
        let a = tuning.filter_pole();
        Self {
            ts_over_ti: tuning.integral_time().map_or(0.0, |ti| ts / ti),
            td,
            a,
            den: ts + a * td,
        }
    }

    /// `num / den`, or zero when `den <= 0`.
    #[inline]
    fn over_den(&self, num: f64) -> f64 {
        if self.den > 0.0 { num / self.den } else { 0.0 }
    }
}

/// Derive the nine Δ-form coefficients from `tuning` at sample period `ts`.
///
/// Deterministic: identical inputs always give identical bit patterns.
pub fn derive_coeffs(tuning: &PidTuning, ts: f64) -> DiscreteCoeffs {
    let tc = TimeConstants::resolve(tuning, ts);
    let PidTuning {
        kp, ki, b, c, kb, ..
    } = *tuning;
    let TimeConstants {
        ts_over_ti,
        td,
        a,
        ..
    } = tc;

    if tc.den <= 0.0 {
        debug!(den = tc.den, "non-positive coefficient denominator; 1/den terms zeroed");
    }

    let a0 = tc.over_den(a * td);
    let c1 = kp * (b + ts_over_ti + tc.over_den(td * c));
    let c2 = -kp * tc.over_den(b * (ts + 2.0 * a * td) + a * td * ts_over_ti + 2.0 * td * c);
    let c3 = kp * tc.over_den(td * (a * b + c));
    let c4 = -kp * (1.0 + ts_over_ti + tc.over_den(td));
    let c5 = kp * tc.over_den(ts + 2.0 * a * td + a * td * ts_over_ti + 2.0 * td);
    let c6 = -kp * tc.over_den(td * (a + 1.0));
    let c7a = ki * kb * ts;
    let c7b = -c7a * a0;

    DiscreteCoeffs {
        a0: a0 as f32,
        c1: c1 as f32,
        c2: c2 as f32,
        c3: c3 as f32,
        c4: c4 as f32,
        c5: c5 as f32,
        c6: c6 as f32,
        c7a: c7a as f32,
        c7b: c7b as f32,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
