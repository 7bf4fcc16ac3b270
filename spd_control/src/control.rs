//! Controller engine root.
//!
//! Every speed controller shares one contract: one `step(w, x)` per gate
//! period returning the saturated actuator command. Implementations:
//!
//! - [`delta::DeltaPid`]: Δ-form 2-DOF PID with two-tap anti-windup,
//!   generic over the [`Arithmetic`](crate::arith::Arithmetic) strategy.
//! - [`reference::ReferencePid`]: separated P/I/D oracle with single-tap
//!   back-calculation, used for cross-validation only.

pub mod delta;
pub mod history;
pub mod reference;

use std::fmt;

use spd_common::control::{AccumulationMode, DiscreteCoeffs};

use crate::arith::{Fused, StepRounded};
use delta::DeltaPid;

/// Per-sample speed controller.
///
/// Not reentrant: callers invoke `step` exactly once per sample period on
/// an instance they own.
pub trait SpeedController {
    /// Advance one sample: setpoint `w`, measurement `x` → saturated output.
    fn step(&mut self, w: f32, x: f32) -> f32;

    /// Clear all dynamic state; coefficients and limits are kept.
    fn reset(&mut self);

    /// Which implementation this is, for logs and reports.
    fn kind(&self) -> ControllerKind;
}

/// Identifies a controller implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerKind {
    /// Δ-form recurrence with the given accumulation order.
    Delta(AccumulationMode),
    /// Separated P/I/D oracle.
    Reference,
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delta(AccumulationMode::StepRounded) => write!(f, "delta/step_rounded"),
            Self::Delta(AccumulationMode::Fused) => write!(f, "delta/fused"),
            Self::Reference => write!(f, "reference"),
        }
    }
}

impl<T: SpeedController + ?Sized> SpeedController for Box<T> {
    #[inline]
    fn step(&mut self, w: f32, x: f32) -> f32 {
        (**self).step(w, x)
    }

    #[inline]
    fn reset(&mut self) {
        (**self).reset();
    }

    #[inline]
    fn kind(&self) -> ControllerKind {
        (**self).kind()
    }
}

/// Build a Δ-form controller with the requested accumulation order.
pub fn build_delta(
    mode: AccumulationMode,
    coeffs: DiscreteCoeffs,
    ysat: f32,
) -> Box<dyn SpeedController> {
    match mode {
        AccumulationMode::StepRounded => Box::new(DeltaPid::<StepRounded>::new(coeffs, ysat)),
        AccumulationMode::Fused => Box::new(DeltaPid::<Fused>::new(coeffs, ysat)),
    }
}

/// Clamp to `[-ysat, +ysat]` without panicking on degenerate limits.
#[inline]
pub(crate) fn saturate(y: f32, ysat: f32) -> f32 {
    y.max(-ysat).min(ysat)
}
