//! Closed-loop regression against the captured hardware output trace.
//!
//! Reference bench: Ts = 5 ms, YSAT = 12 V, W = 100 rad/s, plant Ku = 50,
//! λ = 5, 100 samples from rest.

use std::path::Path;

use spd_common::control::{AccumulationMode, DiscreteCoeffs, PidTuning};
use spd_control::harness::{ClosedLoop, compare_golden};
use spd_control::trace::load_trace;
use spd_control::{SimulationConfig, build_delta, derive_coeffs};

const GOLDEN: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/data/y_values_step1_to_100.txt"
);

fn run_outputs(coeffs: DiscreteCoeffs, mode: AccumulationMode) -> Vec<f32> {
    let cfg = SimulationConfig::default();
    let mut ctrl = build_delta(mode, coeffs, cfg.output.ysat);
    let mut lp = ClosedLoop::from_config(&cfg);
    lp.run(&mut ctrl, cfg.harness.steps).outputs()
}

fn golden() -> Vec<f32> {
    load_trace(Path::new(GOLDEN)).expect("golden trace")
}

#[test]
fn golden_trace_has_one_value_per_step() {
    let g = golden();
    assert_eq!(g.len(), 100);
    assert!((g[0] - 11.04).abs() < 1e-6);
}

#[test]
fn hardware_coefficients_reproduce_golden_trace() {
    let sim = run_outputs(DiscreteCoeffs::HARDWARE_REFERENCE, AccumulationMode::StepRounded);
    let report = compare_golden(&sim, &golden(), 1e-3, 10);

    assert_eq!(report.compared, 100);
    assert!(report.passed(), "mismatches: {:?}", report.mismatches);
    assert!(report.max_abs_err < 1e-5, "max err {}", report.max_abs_err);
}

#[test]
fn derived_coefficients_reproduce_golden_trace() {
    let cfg = SimulationConfig::default();
    let coeffs = derive_coeffs(&cfg.tuning, cfg.sample_period());
    let sim = run_outputs(coeffs, AccumulationMode::StepRounded);
    let report = compare_golden(&sim, &golden(), 1e-3, 10);
    assert!(report.passed(), "mismatches: {:?}", report.mismatches);
}

#[test]
fn fused_accumulation_stays_within_tolerance() {
    let sim = run_outputs(DiscreteCoeffs::HARDWARE_REFERENCE, AccumulationMode::Fused);
    let report = compare_golden(&sim, &golden(), 1e-3, 10);
    assert!(report.passed(), "mismatches: {:?}", report.mismatches);
}

#[test]
fn detuned_controller_is_rejected() {
    let tuning = PidTuning {
        kp: 0.2,
        ..PidTuning::default()
    };
    let coeffs = derive_coeffs(&tuning, 0.005);
    let sim = run_outputs(coeffs, AccumulationMode::StepRounded);
    let report = compare_golden(&sim, &golden(), 1e-3, 3);

    assert!(!report.passed());
    assert_eq!(report.mismatches.len(), 3);
    assert_eq!(report.mismatches[0].index, 0);
    assert!(report.fail >= 3);
}
