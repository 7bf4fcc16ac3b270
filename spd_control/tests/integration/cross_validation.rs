//! Δ-form controller against the separated P/I/D oracle.

use spd_common::control::AccumulationMode;
use spd_control::control::reference::ReferencePid;
use spd_control::harness::{ClosedLoop, Tolerance};
use spd_control::{ControllerKind, SimulationConfig, SpeedController, build_delta, derive_coeffs};

fn cross_check(mode: AccumulationMode) -> spd_control::harness::CrossCheckReport {
    let cfg = SimulationConfig::default();
    let ts = cfg.sample_period();
    let mut primary = build_delta(mode, derive_coeffs(&cfg.tuning, ts), cfg.output.ysat);
    let mut oracle = ReferencePid::new(&cfg.tuning, ts as f32, cfg.output.ysat);
    let mut lp = ClosedLoop::from_config(&cfg);
    let (_, report) = lp.cross_check(
        &mut primary,
        &mut oracle,
        cfg.harness.steps,
        cfg.harness.tolerance(),
    );
    report
}

#[test]
fn controllers_agree_on_reference_tuning() {
    let report = cross_check(AccumulationMode::StepRounded);

    assert_eq!(report.samples.len(), 100);
    assert_eq!(report.primary, ControllerKind::Delta(AccumulationMode::StepRounded));
    assert_eq!(report.oracle, ControllerKind::Reference);
    assert!(report.passed(), "{} mismatches", report.mismatch_count);
    assert!(report.samples.iter().all(|s| s.within));
}

#[test]
fn fused_controller_agrees_with_oracle() {
    let report = cross_check(AccumulationMode::Fused);
    assert!(report.passed(), "{} mismatches", report.mismatch_count);
}

#[test]
fn both_controllers_idle_at_zero_input() {
    let cfg = SimulationConfig::default();
    let ts = cfg.sample_period();
    let mut delta = build_delta(
        AccumulationMode::StepRounded,
        derive_coeffs(&cfg.tuning, ts),
        cfg.output.ysat,
    );
    let mut oracle = ReferencePid::new(&cfg.tuning, ts as f32, cfg.output.ysat);
    for _ in 0..50 {
        assert_eq!(delta.step(0.0, 0.0), 0.0);
        assert_eq!(oracle.step(0.0, 0.0), 0.0);
    }
}

#[test]
fn zero_tolerance_flags_any_difference() {
    let cfg = SimulationConfig::default();
    let ts = cfg.sample_period();
    let mut primary = build_delta(
        AccumulationMode::StepRounded,
        derive_coeffs(&cfg.tuning, ts),
        cfg.output.ysat,
    );
    let mut oracle = ReferencePid::new(&cfg.tuning, ts as f32, cfg.output.ysat);
    let mut lp = ClosedLoop::from_config(&cfg);
    let (_, report) = lp.cross_check(
        &mut primary,
        &mut oracle,
        cfg.harness.steps,
        Tolerance { abs: 0.0, rel: 0.0 },
    );

    let differing = report.samples.iter().filter(|s| s.abs_err > 0.0).count();
    assert_eq!(report.mismatch_count, differing);
    assert_eq!(report.max_err_index.is_some(), differing > 0);
}
