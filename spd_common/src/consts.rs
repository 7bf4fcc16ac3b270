//! Reference scenario constants.
//!
//! Single source of truth for the board geometry and the reference
//! closed-loop scenario used for golden-trace validation.

/// Encoder counts per revolution in quadrature (4x) decoding.
pub const CPR_QUAD: u32 = 1336;

/// Gate frequency of the speed counter [Hz] (200 Hz → 5 ms).
pub const GATE_HZ: u32 = 200;

/// Output voltage saturation [V].
pub const YSAT_VOLT: f32 = 12.0;

/// Reference velocity setpoint [rad/s].
pub const W_TARGET: f32 = 100.0;

/// Reference first-order plant input gain.
pub const PLANT_KU: f32 = 50.0;

/// Reference first-order plant decay rate [1/s].
pub const PLANT_LAMBDA: f32 = 5.0;

/// Number of samples in the reference closed-loop run.
pub const REFERENCE_STEPS: usize = 100;

/// Default comparison tolerance (absolute and relative).
pub const DEFAULT_TOLERANCE: f32 = 1e-3;

/// Number of failing samples printed by a golden comparison.
pub const DEFAULT_REPORTED_MISMATCHES: usize = 10;

/// Floor for the relative-error denominator.
pub const REL_ERR_FLOOR: f32 = 1e-12;
