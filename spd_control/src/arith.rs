//! Arithmetic strategies for the single-precision recurrence.
//!
//! The reference hardware accumulates the Δ sum serially through a
//! multiplier followed by an adder, rounding to f32 after each stage.
//! [`StepRounded`] reproduces that. [`Fused`] performs each
//! multiply-accumulate with a single rounding (`f32::mul_add`).
//!
//! rustc never contracts `a * b + c` into an FMA on its own, so plain f32
//! operators are already rounding barriers; the trait makes the choice
//! explicit and injectable.

use spd_common::control::AccumulationMode;

/// Primitive f32 operations used by the controller recurrence.
pub trait Arithmetic: Copy + Default + core::fmt::Debug {
    /// Configuration value selecting this strategy.
    const MODE: AccumulationMode;

    /// Rounded product.
    fn mul(a: f32, b: f32) -> f32;

    /// Rounded sum.
    fn add(a: f32, b: f32) -> f32;

    /// `acc + a·b` under this strategy's rounding rules.
    fn mul_acc(acc: f32, a: f32, b: f32) -> f32;
}

/// Round after every multiply and every add.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepRounded;

impl Arithmetic for StepRounded {
    const MODE: AccumulationMode = AccumulationMode::StepRounded;

    #[inline]
    fn mul(a: f32, b: f32) -> f32 {
        a * b
    }

    #[inline]
    fn add(a: f32, b: f32) -> f32 {
        a + b
    }

    #[inline]
    fn mul_acc(acc: f32, a: f32, b: f32) -> f32 {
        Self::add(acc, Self::mul(a, b))
    }
}

/// Single rounding per multiply-accumulate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fused;

impl Arithmetic for Fused {
    const MODE: AccumulationMode = AccumulationMode::Fused;

    #[inline]
    fn mul(a: f32, b: f32) -> f32 {
        a * b
    }

    #[inline]
    fn add(a: f32, b: f32) -> f32 {
        a + b
    }

    #[inline]
    fn mul_acc(acc: f32, a: f32, b: f32) -> f32 {
        a.mul_add(b, acc)
    }
}
