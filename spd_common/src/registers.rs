//! Peripheral register map of the speed-controller IP core.
//!
//! All writable registers hold raw IEEE-754 single-precision bit patterns;
//! values are transferred by bit reinterpretation, never by format
//! conversion. The status register is read-only and carries the signed
//! speed count in its low half-word.

use static_assertions::const_assert_eq;

use crate::control::{COEFF_COUNT, DiscreteCoeffs};

/// a0 (derivative-filter feedback on the previous delta).
pub const REG_A0: u32 = 0x00;
pub const REG_C1: u32 = 0x04;
pub const REG_C2: u32 = 0x08;
pub const REG_C3: u32 = 0x0C;
pub const REG_C4: u32 = 0x10;
pub const REG_C5: u32 = 0x14;
pub const REG_C6: u32 = 0x18;
/// Anti-windup tap 1.
pub const REG_C7A: u32 = 0x1C;
/// Anti-windup tap 2.
pub const REG_C7B: u32 = 0x20;
/// Output saturation limit [V].
pub const REG_YSAT: u32 = 0x24;
/// Reciprocal of the saturation limit (duty scaling).
pub const REG_RECIP_YSAT: u32 = 0x28;
/// Target velocity [rad/s].
pub const REG_W_TARGET: u32 = 0x2C;
/// Status (RO): low 16 bits = signed speed count.
pub const REG_STATUS: u32 = 0x30;

/// Register width in bytes.
pub const REG_STRIDE: u32 = 4;

/// Total number of registers in the map.
pub const REG_COUNT: usize = (REG_STATUS / REG_STRIDE) as usize + 1;

/// Coefficient registers in write order.
pub const COEFF_REGISTERS: [u32; COEFF_COUNT] = [
    REG_A0, REG_C1, REG_C2, REG_C3, REG_C4, REG_C5, REG_C6, REG_C7A, REG_C7B,
];

const_assert_eq!(REG_C7B, REG_A0 + (COEFF_COUNT as u32 - 1) * REG_STRIDE);
const_assert_eq!(REG_COUNT, 13);

/// Reinterpret an `f32` as its register word.
#[inline]
pub fn f32_to_word(value: f32) -> u32 {
    value.to_bits()
}

/// Reinterpret a register word as an `f32`.
#[inline]
pub fn word_to_f32(word: u32) -> f32 {
    f32::from_bits(word)
}

/// Decode the signed speed count from a raw status word.
#[inline]
pub fn status_speed_count(status: u32) -> i16 {
    (status & 0xFFFF) as u16 as i16
}

/// One register write: offset and raw word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterWrite {
    pub offset: u32,
    pub word: u32,
}

/// Full write sequence for a coefficient-load event.
///
/// Coefficients first (a0, c1..c6, c7a, c7b), then YSAT, 1/YSAT and the
/// target velocity.
pub fn load_sequence(coeffs: &DiscreteCoeffs, ysat: f32, w_target: f32) -> [RegisterWrite; 12] {
    let mut writes = [RegisterWrite { offset: 0, word: 0 }; 12];
    for (slot, (offset, word)) in writes
        .iter_mut()
        .zip(COEFF_REGISTERS.iter().zip(coeffs.to_bits()))
    {
        *slot = RegisterWrite {
            offset: *offset,
            word,
        };
    }
    writes[9] = RegisterWrite {
        offset: REG_YSAT,
        word: f32_to_word(ysat),
    };
    writes[10] = RegisterWrite {
        offset: REG_RECIP_YSAT,
        word: f32_to_word(1.0 / ysat),
    };
    writes[11] = RegisterWrite {
        offset: REG_W_TARGET,
        word: f32_to_word(w_target),
    };
    writes
}
