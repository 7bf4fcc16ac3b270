//! Separated-form 2-DOF PID used as a cross-validation oracle.
//!
//! Computes the same continuous law as the Δ-form recurrence through a
//! conventional structure, entirely in f32:
//!
//! ```text
//! P[n] = Kp·(b·w − x)
//! D[n] = αd·D[n-1] + βd·(c·Δw − Δx)        αd = a·Td/(a·Td + Ts), βd = Kp·Td/(a·Td + Ts)
//! I[n] = I[n-1] + Ki·(w − x + Kb·e_sat[n-1])·Ts
//! y    = clamp(P + I + D, −YSAT, +YSAT)
//! ```
//!
//! Single-tap back-calculation: only the previous cycle's saturation
//! error is fed into the integrator.

use spd_common::control::PidTuning;

use super::{ControllerKind, SpeedController, saturate};

/// Gains resolved once from the tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceGains {
    pub kp: f32,
    pub ki: f32,
    pub kb: f32,
    pub b: f32,
    pub c: f32,
    /// Derivative filter feedback `a·Td/(a·Td + Ts)`.
    pub d_feedback: f32,
    /// Derivative input gain `Kp·Td/(a·Td + Ts)`.
    pub d_gain: f32,
    pub ts: f32,
}

impl ReferenceGains {
    /// Resolve the oracle gains from `tuning` at sample period `ts`.
    pub fn new(tuning: &PidTuning, ts: f32) -> Self {
        let kp = tuning.kp as f32;
        let kd = tuning.kd as f32;
        let td = if kp > 1e-12 { kd / kp } else { 0.0 };
        let a = tuning.filter_pole() as f32;
        let den = a * td + ts;
        let (d_feedback, d_gain) = if den > 0.0 {
            ((a * td) / den, (kp * td) / den)
        } else {
            (0.0, 0.0)
        };

        Self {
            kp,
            ki: tuning.ki as f32,
            kb: tuning.kb as f32,
            b: tuning.b as f32,
            c: tuning.c as f32,
            d_feedback,
            d_gain,
            ts,
        }
    }
}

/// Internal state of the oracle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReferenceState {
    /// Integral accumulator.
    pub integral: f32,
    /// Filtered derivative term D[n-1].
    pub derivative_prev: f32,
    pub setpoint_prev: f32,
    pub measurement_prev: f32,
    /// Previous unsaturated output, for anti-windup.
    pub unsaturated_prev: f32,
    /// Previous saturated output, for anti-windup.
    pub saturated_prev: f32,
}

/// Separated P/I/D controller.
#[derive(Debug, Clone)]
pub struct ReferencePid {
    gains: ReferenceGains,
    ysat: f32,
    state: ReferenceState,
}

impl ReferencePid {
    pub fn new(tuning: &PidTuning, ts: f32, ysat: f32) -> Self {
        Self {
            gains: ReferenceGains::new(tuning, ts),
            ysat,
            state: ReferenceState::default(),
        }
    }

    #[inline]
    pub fn gains(&self) -> &ReferenceGains {
        &self.gains
    }

    #[inline]
    pub fn state(&self) -> &ReferenceState {
        &self.state
    }
}

impl SpeedController for ReferencePid {
    fn step(&mut self, w: f32, x: f32) -> f32 {
        let g = &self.gains;
        let s = &mut self.state;
        let error = w - x;

        // ── P term (setpoint-weighted) ──────────────────────────
        let p_term = g.kp * (g.b * w - x);

        // ── D term (first-order filtered, weighted input) ───────
        let input_change = g.c * (w - s.setpoint_prev) - (x - s.measurement_prev);
        let d_term = g.d_feedback * s.derivative_prev + g.d_gain * input_change;

        // ── I term (back-calculation, single tap) ───────────────
        let saturation_error = s.saturated_prev - s.unsaturated_prev;
        s.integral += g.ki * (error + g.kb * saturation_error) * g.ts;

        let unsaturated = p_term + s.integral + d_term;
        let saturated = saturate(unsaturated, self.ysat);

        s.setpoint_prev = w;
        s.measurement_prev = x;
        s.derivative_prev = d_term;
        s.unsaturated_prev = unsaturated;
        s.saturated_prev = saturated;

        saturated
    }

    #[inline]
    fn reset(&mut self) {
        self.state = ReferenceState::default();
    }

    #[inline]
    fn kind(&self) -> ControllerKind {
        ControllerKind::Reference
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
