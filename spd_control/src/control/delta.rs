//! Δ-form (incremental) 2-DOF PID with a first-order derivative filter
//! folded into the recurrence and two-tap anti-windup back-calculation.
//!
//! ```text
//! e_sat[k]  = y_sat[n-k] − y_unsat[n-k]                      (k = 1, 2)
//! dy[n]     = a0·dy[n-1]
//!           + c1·w[n] + c2·w[n-1] + c3·w[n-2]
//!           + c4·x[n] + c5·x[n-1] + c6·x[n-2]
//!           + c7a·e_sat[1] + c7b·e_sat[2]
//! y_unsat[n] = y_unsat[n-1] + dy[n]
//! y_sat[n]   = clamp(y_unsat[n], −YSAT, +YSAT)
//! ```
//!
//! The nine products are accumulated serially in exactly that order,
//! starting from zero. There is no integrator state to freeze: the
//! saturation error of the two previous cycles pulls the accumulator back
//! into range whenever the output was clipped.

use core::marker::PhantomData;

use spd_common::control::DiscreteCoeffs;

use super::history::History;
use super::{ControllerKind, SpeedController, saturate};
use crate::arith::Arithmetic;

/// Dynamic state of the Δ-form recurrence.
///
/// At most two past samples of each signal are retained.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControllerState {
    /// Previous unsaturated delta output dy[n-1].
    pub dy1: f32,
    /// Setpoint history w[n-1], w[n-2].
    pub w: History,
    /// Measurement history x[n-1], x[n-2].
    pub x: History,
    /// Unsaturated output history.
    pub y_unsat: History,
    /// Saturated output history.
    pub y_sat: History,
}

impl ControllerState {
    /// Saturation errors of the previous two cycles.
    #[inline]
    fn saturation_errors<A: Arithmetic>(&self) -> (f32, f32) {
        (
            A::add(self.y_sat.prev(), -self.y_unsat.prev()),
            A::add(self.y_sat.prev2(), -self.y_unsat.prev2()),
        )
    }
}

/// Δ-form controller, generic over the accumulation strategy.
#[derive(Debug, Clone)]
pub struct DeltaPid<A: Arithmetic> {
    coeffs: DiscreteCoeffs,
    ysat: f32,
    state: ControllerState,
    _arith: PhantomData<A>,
}

impl<A: Arithmetic> DeltaPid<A> {
    /// Create a controller in the reset state.
    pub fn new(coeffs: DiscreteCoeffs, ysat: f32) -> Self {
        Self {
            coeffs,
            ysat,
            state: ControllerState::default(),
            _arith: PhantomData,
        }
    }

    /// Coefficients loaded into this controller.
    #[inline]
    pub fn coeffs(&self) -> &DiscreteCoeffs {
        &self.coeffs
    }

    /// Saturation limit.
    #[inline]
    pub fn ysat(&self) -> f32 {
        self.ysat
    }

    /// Snapshot of the dynamic state.
    #[inline]
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Unsaturated increment for the current sample.
    #[inline]
    fn delta(&self, w: f32, x: f32) -> f32 {
        let c = &self.coeffs;
        let s = &self.state;
        let (e_sat_1, e_sat_2) = s.saturation_errors::<A>();

        let terms = [
            (c.a0, s.dy1),
            (c.c1, w),
            (c.c2, s.w.prev()),
            (c.c3, s.w.prev2()),
            (c.c4, x),
            (c.c5, s.x.prev()),
            (c.c6, s.x.prev2()),
            (c.c7a, e_sat_1),
            (c.c7b, e_sat_2),
        ];
        terms
            .iter()
            .fold(0.0, |acc, &(coeff, signal)| A::mul_acc(acc, coeff, signal))
    }
}

impl<A: Arithmetic> SpeedController for DeltaPid<A> {
    fn step(&mut self, w: f32, x: f32) -> f32 {
        let dy = self.delta(w, x);
        let y_unsat = A::add(self.state.y_unsat.prev(), dy);
        let y_sat = saturate(y_unsat, self.ysat);

        let s = &mut self.state;
        s.dy1 = dy;
        s.w.push(w);
        s.x.push(x);
        s.y_unsat.push(y_unsat);
        s.y_sat.push(y_sat);

        y_sat
    }

    #[inline]
    fn reset(&mut self) {
        self.state = ControllerState::default();
    }

    #[inline]
    fn kind(&self) -> ControllerKind {
        ControllerKind::Delta(A::MODE)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
