//! Process exit status of the `spd_control` binary.
//!
//! 0 on pass, 1 on a tolerance failure, 2 on a fatal error.

use std::process::{Command, Output};

use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_spd_control");
const GOLDEN: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/data/y_values_step1_to_100.txt"
);
const SCENARIO: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config/speed_loop.toml");

fn run(args: &[&str]) -> Output {
    // Run away from the crate root so nothing depends on the caller's cwd.
    let cwd = TempDir::new().unwrap();
    Command::new(BIN)
        .args(args)
        .current_dir(cwd.path())
        .output()
        .expect("spawn spd_control")
}

#[test]
fn golden_within_tolerance_exits_zero() {
    let out = run(&["golden", GOLDEN]);
    assert_eq!(out.status.code(), Some(0), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stdout).contains("PASS"));
}

#[test]
fn golden_outside_tolerance_exits_one() {
    let out = run(&["golden", GOLDEN, "--tol", "0"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stdout).contains("FAIL"));
}

#[test]
fn golden_without_trace_exits_two() {
    let out = run(&["golden"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn scenario_golden_path_works_outside_crate_dir() {
    let out = run(&["--config", SCENARIO, "golden"]);
    assert_eq!(out.status.code(), Some(0), "{}", String::from_utf8_lossy(&out.stderr));
}

#[test]
fn missing_scenario_exits_two() {
    let out = run(&["--config", "does/not/exist.toml", "coeffs"]);
    assert_eq!(out.status.code(), Some(2));
}
