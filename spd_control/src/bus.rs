//! Register bus and coefficient loading.
//!
//! The speed-controller core is programmed through 32-bit memory-mapped
//! registers. [`RegisterBus`] abstracts the transport so the load
//! sequence can run against real hardware or the in-memory
//! [`MemoryBus`] used for simulation and tests.
//!
//! # Load sequence
//!
//! 1. nine coefficient words (a0, c1..c6, c7a, c7b)
//! 2. YSAT, 1/YSAT
//! 3. target velocity
//!
//! The status register is read-only; software only ever reads it.

use spd_common::control::DiscreteCoeffs;
use spd_common::registers::{
    REG_COUNT, REG_STATUS, REG_STRIDE, REG_W_TARGET, load_sequence, status_speed_count,
    word_to_f32,
};
use thiserror::Error;
use tracing::{debug, info};

/// Register access errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BusError {
    /// Offset not a multiple of the register width.
    #[error("unaligned register offset 0x{0:02X}")]
    Unaligned(u32),

    /// Offset past the end of the register map.
    #[error("register offset 0x{0:02X} outside map")]
    OutOfRange(u32),

    /// Write to a read-only register.
    #[error("register 0x{0:02X} is read-only")]
    ReadOnly(u32),
}

/// 32-bit register transport.
pub trait RegisterBus {
    /// Transport identifier for logs (e.g. "memory", "mmio").
    fn name(&self) -> &'static str;

    /// Write one raw word.
    fn write32(&mut self, offset: u32, word: u32) -> Result<(), BusError>;

    /// Read one raw word.
    fn read32(&self, offset: u32) -> Result<u32, BusError>;
}

/// Register file held in memory.
///
/// The status register can be driven from the simulation side with
/// [`MemoryBus::latch_speed_count`].
#[derive(Debug, Clone, Default)]
pub struct MemoryBus {
    regs: [u32; REG_COUNT],
    writes: usize,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful writes since creation.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Present a speed count in the status register, as the core's gate
    /// logic would at the end of a period.
    pub fn latch_speed_count(&mut self, spdcnt: i16) {
        let slot = (REG_STATUS / REG_STRIDE) as usize;
        self.regs[slot] = (self.regs[slot] & 0xFFFF_0000) | u32::from(spdcnt as u16);
    }

    fn slot(offset: u32) -> Result<usize, BusError> {
        if offset % REG_STRIDE != 0 {
            return Err(BusError::Unaligned(offset));
        }
        let slot = (offset / REG_STRIDE) as usize;
        if slot >= REG_COUNT {
            return Err(BusError::OutOfRange(offset));
        }
        Ok(slot)
    }
}

impl RegisterBus for MemoryBus {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn write32(&mut self, offset: u32, word: u32) -> Result<(), BusError> {
        let slot = Self::slot(offset)?;
        if offset == REG_STATUS {
            return Err(BusError::ReadOnly(offset));
        }
        self.regs[slot] = word;
        self.writes += 1;
        Ok(())
    }

    fn read32(&self, offset: u32) -> Result<u32, BusError> {
        Ok(self.regs[Self::slot(offset)?])
    }
}

/// Write coefficients, saturation limits and target velocity to the core.
pub fn load_controller<B: RegisterBus + ?Sized>(
    bus: &mut B,
    coeffs: &DiscreteCoeffs,
    ysat: f32,
    w_target: f32,
) -> Result<(), BusError> {
    for write in load_sequence(coeffs, ysat, w_target) {
        debug!(
            offset = format_args!("0x{:02X}", write.offset),
            word = format_args!("0x{:08X}", write.word),
            "register write"
        );
        bus.write32(write.offset, write.word)?;
    }
    info!(bus = bus.name(), ysat, w_target, "controller loaded");
    Ok(())
}

/// Read the signed speed count from the status register.
pub fn read_speed_count<B: RegisterBus + ?Sized>(bus: &B) -> Result<i16, BusError> {
    bus.read32(REG_STATUS).map(status_speed_count)
}

/// Read back the target velocity register [rad/s].
pub fn read_target_velocity<B: RegisterBus + ?Sized>(bus: &B) -> Result<f32, BusError> {
    bus.read32(REG_W_TARGET).map(word_to_f32)
}
