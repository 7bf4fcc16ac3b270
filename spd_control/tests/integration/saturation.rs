//! Output limit properties.

use proptest::prelude::*;
use spd_common::control::{AccumulationMode, DiscreteCoeffs};
use spd_control::control::reference::ReferencePid;
use spd_control::harness::ClosedLoop;
use spd_control::{SimulationConfig, SpeedController, build_delta};

const YSAT: f32 = 12.0;

fn input_sequence() -> impl Strategy<Value = Vec<(f32, f32)>> {
    prop::collection::vec((-1.0e4_f32..1.0e4, -1.0e4_f32..1.0e4), 1..200)
}

proptest! {
    #[test]
    fn delta_output_never_exceeds_limit(inputs in input_sequence(), fused in any::<bool>()) {
        let mode = if fused { AccumulationMode::Fused } else { AccumulationMode::StepRounded };
        let mut ctrl = build_delta(mode, DiscreteCoeffs::HARDWARE_REFERENCE, YSAT);
        for (w, x) in inputs {
            let y = ctrl.step(w, x);
            prop_assert!((-YSAT..=YSAT).contains(&y), "y = {}", y);
        }
    }

    #[test]
    fn reference_output_never_exceeds_limit(inputs in input_sequence()) {
        let cfg = SimulationConfig::default();
        let mut ctrl = ReferencePid::new(&cfg.tuning, 0.005, YSAT);
        for (w, x) in inputs {
            let y = ctrl.step(w, x);
            prop_assert!((-YSAT..=YSAT).contains(&y), "y = {}", y);
        }
    }
}

#[test]
fn large_setpoint_clamps_exactly_at_limit() {
    let mut cfg = SimulationConfig::default();
    cfg.harness.setpoint = 1000.0;
    let mut ctrl = build_delta(
        AccumulationMode::StepRounded,
        DiscreteCoeffs::HARDWARE_REFERENCE,
        cfg.output.ysat,
    );
    let mut lp = ClosedLoop::from_config(&cfg);
    let trace = lp.run(&mut ctrl, 200);

    assert_eq!(trace.samples[0].y, YSAT);
    assert!(trace.samples.iter().all(|s| s.y.abs() <= YSAT));
    assert!(trace.samples.iter().all(|s| s.duty <= 100.0 + 1e-4));
    assert_eq!(trace.peak_output(), YSAT);
}

#[test]
fn negative_setpoint_clamps_at_negative_limit() {
    let mut cfg = SimulationConfig::default();
    cfg.harness.setpoint = -1000.0;
    let mut ctrl = build_delta(
        AccumulationMode::StepRounded,
        DiscreteCoeffs::HARDWARE_REFERENCE,
        cfg.output.ysat,
    );
    let mut lp = ClosedLoop::from_config(&cfg);
    let trace = lp.run(&mut ctrl, 50);

    assert_eq!(trace.samples[0].y, -YSAT);
    assert!(lp.velocity() < 0.0);
}
