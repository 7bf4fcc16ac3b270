//! Shipped scenario file.

use std::fs;
use std::path::Path;

use spd_common::control::{AccumulationMode, PidTuning};
use spd_control::SimulationConfig;
use spd_control::config::HarnessConfig;
use spd_control::trace::load_trace;
use tempfile::TempDir;

const SCENARIO: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config/speed_loop.toml");

#[test]
fn shipped_scenario_is_the_reference_bench() {
    let cfg = SimulationConfig::load_validated(Path::new(SCENARIO)).expect("scenario");
    assert_eq!(cfg.tuning, PidTuning::default());
    assert_eq!(cfg.encoder.counts_per_rev, 1336);
    assert_eq!(cfg.encoder.gate_hz, 200);
    assert_eq!(cfg.harness.steps, 100);
    assert!(cfg.harness.golden_path.is_some());
}

#[test]
fn shipped_golden_path_resolves_from_any_directory() {
    let cfg = SimulationConfig::load_validated(Path::new(SCENARIO)).expect("scenario");
    let golden = cfg.harness.golden_path.expect("golden path");
    assert!(golden.is_absolute(), "{golden:?}");

    let values = load_trace(&golden).expect("golden trace");
    assert_eq!(values.len(), 100);
}

#[test]
fn relative_golden_path_follows_scenario_file() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("traces")).unwrap();
    fs::write(dir.path().join("traces/y.txt"), "1.0\n2.0\n").unwrap();
    let path = dir.path().join("scenario.toml");
    fs::write(&path, "[harness]\ngolden_path = \"traces/y.txt\"\n").unwrap();

    let cfg = SimulationConfig::load_validated(&path).unwrap();
    let golden = cfg.harness.golden_path.unwrap();
    assert_eq!(golden, dir.path().join("traces/y.txt"));
    assert_eq!(load_trace(&golden).unwrap(), vec![1.0, 2.0]);
}

#[test]
fn invalid_scenario_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[output]\nysat = -1.0\n").unwrap();
    assert!(SimulationConfig::load_validated(&path).is_err());
}

#[test]
fn missing_scenario_is_rejected() {
    let dir = TempDir::new().unwrap();
    assert!(SimulationConfig::load_validated(&dir.path().join("none.toml")).is_err());
}

#[test]
fn partial_harness_section_keeps_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fused.toml");
    fs::write(&path, "[harness]\naccumulation = \"fused\"\n").unwrap();

    let cfg = SimulationConfig::load_validated(&path).unwrap();
    assert_eq!(cfg.harness.accumulation, AccumulationMode::Fused);
    assert_eq!(
        HarnessConfig {
            accumulation: AccumulationMode::StepRounded,
            ..cfg.harness.clone()
        },
        HarnessConfig::default()
    );
}
