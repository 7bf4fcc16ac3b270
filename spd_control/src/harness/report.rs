//! Comparison reports.

use serde::Serialize;
use spd_common::consts::REL_ERR_FLOOR;
use tracing::{info, warn};

use crate::control::ControllerKind;

/// Comparison tolerances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tolerance {
    pub abs: f32,
    pub rel: f32,
}

/// One controller-vs-controller sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CrossSample {
    pub n: usize,
    pub y_primary: f32,
    pub y_oracle: f32,
    pub abs_err: f32,
    pub rel_err: f32,
    /// `abs_err <= tol.abs || rel_err <= tol.rel`.
    pub within: bool,
}

impl CrossSample {
    /// Compare two outputs. The relative error is taken against the
    /// primary output, floored at `REL_ERR_FLOOR`.
    pub fn compare(n: usize, y_primary: f32, y_oracle: f32, tol: Tolerance) -> Self {
        let abs_err = (y_primary - y_oracle).abs();
        let rel_err = abs_err / y_primary.abs().max(REL_ERR_FLOOR);
        Self {
            n,
            y_primary,
            y_oracle,
            abs_err,
            rel_err,
            within: abs_err <= tol.abs || rel_err <= tol.rel,
        }
    }
}

/// Controller-vs-controller comparison over a run.
#[derive(Debug, Clone, Serialize)]
pub struct CrossCheckReport {
    #[serde(serialize_with = "display")]
    pub primary: ControllerKind,
    #[serde(serialize_with = "display")]
    pub oracle: ControllerKind,
    pub tolerance: Tolerance,
    pub samples: Vec<CrossSample>,
    pub mismatch_count: usize,
    /// Largest absolute error seen.
    pub max_abs_err: f32,
    /// Relative error at the sample with the largest absolute error.
    pub rel_err_at_max: f32,
    /// Index of the largest absolute error; `None` while all errors are 0.
    pub max_err_index: Option<usize>,
}

fn display<S: serde::Serializer>(kind: &ControllerKind, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(kind)
}

impl CrossCheckReport {
    pub fn new(primary: ControllerKind, oracle: ControllerKind, tolerance: Tolerance) -> Self {
        Self {
            primary,
            oracle,
            tolerance,
            samples: Vec::new(),
            mismatch_count: 0,
            max_abs_err: 0.0,
            rel_err_at_max: 0.0,
            max_err_index: None,
        }
    }

    /// Record one sample pair and return its comparison.
    pub fn push(&mut self, n: usize, y_primary: f32, y_oracle: f32) -> CrossSample {
        let cmp = CrossSample::compare(n, y_primary, y_oracle, self.tolerance);
        if !cmp.within {
            self.mismatch_count += 1;
        }
        if is_worse(cmp.abs_err, self.max_abs_err) {
            self.max_abs_err = cmp.abs_err;
            self.rel_err_at_max = cmp.rel_err;
            self.max_err_index = Some(n);
        }
        self.samples.push(cmp);
        cmp
    }

    /// True when every sample is within tolerance.
    pub fn passed(&self) -> bool {
        self.mismatch_count == 0
    }
}

/// True when `err` replaces `worst`. The first NaN outranks every
/// finite error and is then kept.
#[inline]
fn is_worse(err: f32, worst: f32) -> bool {
    if worst.is_nan() {
        false
    } else {
        err.is_nan() || err > worst
    }
}

/// One golden-trace sample outside tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoldenMismatch {
    pub index: usize,
    pub simulated: f32,
    pub reference: f32,
    pub abs_err: f32,
}

/// Simulation-vs-golden comparison.
#[derive(Debug, Clone, Serialize)]
pub struct GoldenReport {
    pub reference_count: usize,
    pub simulated_count: usize,
    /// `min(reference_count, simulated_count)`.
    pub compared: usize,
    pub pass: usize,
    pub fail: usize,
    pub abs_tol: f32,
    /// First failing samples, in index order.
    pub mismatches: Vec<GoldenMismatch>,
    /// Largest absolute error over all compared samples.
    pub max_abs_err: f32,
    pub max_err_index: Option<usize>,
}

impl GoldenReport {
    /// True when at least one sample was compared and none failed.
    pub fn passed(&self) -> bool {
        self.compared > 0 && self.fail == 0
    }
}

/// Compare simulated outputs against a golden trace element-wise.
///
/// Only the common prefix is compared. At most `max_reported` failing
/// samples are kept in the report; counts cover all of them.
pub fn compare_golden(
    simulated: &[f32],
    reference: &[f32],
    abs_tol: f32,
    max_reported: usize,
) -> GoldenReport {
    let compared = simulated.len().min(reference.len());
    if simulated.len() != reference.len() {
        warn!(
            simulated = simulated.len(),
            reference = reference.len(),
            compared,
            "trace lengths differ; comparing common prefix"
        );
    }

    let mut report = GoldenReport {
        reference_count: reference.len(),
        simulated_count: simulated.len(),
        compared,
        pass: 0,
        fail: 0,
        abs_tol,
        mismatches: Vec::new(),
        max_abs_err: 0.0,
        max_err_index: None,
    };

    for (index, (&sim, &gold)) in simulated.iter().zip(reference).enumerate() {
        let abs_err = (sim - gold).abs();
        if is_worse(abs_err, report.max_abs_err) {
            report.max_abs_err = abs_err;
            report.max_err_index = Some(index);
        }

        // NaN never passes.
        if abs_err <= abs_tol {
            report.pass += 1;
            continue;
        }
        report.fail += 1;
        if report.mismatches.len() < max_reported {
            warn!(index, simulated = sim, reference = gold, abs_err, "golden mismatch");
            report.mismatches.push(GoldenMismatch {
                index,
                simulated: sim,
                reference: gold,
                abs_err,
            });
        }
    }

    info!(
        compared,
        pass = report.pass,
        fail = report.fail,
        max_abs_err = report.max_abs_err,
        "golden comparison complete"
    );
    report
}
