//! Closed-loop validation harness.
//!
//! Drives the first-order plant through the encoder model and one or two
//! speed controllers for a bounded number of samples, records the trace,
//! and compares outputs against another controller or a golden trace.

pub mod closed_loop;
pub mod export;
pub mod report;

pub use closed_loop::{ClosedLoop, Trace, TraceSample};
pub use report::{
    CrossCheckReport, CrossSample, GoldenMismatch, GoldenReport, Tolerance, compare_golden,
};
