//! # Speed-Loop Control Library
//!
//! Software model of a fixed-logic motor-speed controller, built to
//! reproduce the hardware's single-precision arithmetic closely enough
//! that a simulated closed loop matches captured hardware traces.
//!
//! ## Layers
//!
//! 1. **coeffs**: continuous PID tuning → nine f32 filter coefficients
//! 2. **control**: Δ-form 2-DOF PID with two-tap anti-windup, plus a
//!    separated P/I/D oracle for cross-validation
//! 3. **encoder**: fixed-gate quantizing tachometer model
//! 4. **harness**: plant + encoder + controller loop, golden and
//!    cross-controller comparison
//! 5. **bus**: register-level coefficient loading
//!
//! ## Determinism
//!
//! Every step is a pure function of the ordered input sequence and the
//! state since the last reset. Accumulation order is chosen once, at
//! construction, through the [`arith::Arithmetic`] strategy.

pub mod arith;
pub mod bus;
pub mod coeffs;
pub mod config;
pub mod control;
pub mod encoder;
pub mod error;
pub mod harness;
pub mod plant;
pub mod prompt;
pub mod trace;

pub use coeffs::derive_coeffs;
pub use config::SimulationConfig;
pub use control::{ControllerKind, SpeedController, build_delta};
pub use error::HarnessError;
