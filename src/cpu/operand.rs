//! Typed operand primitives.
//!
//! Every operand kind is fixed at decode time, so execution never has to
//! validate widths: an 8-bit operation carries an [`Operand8`], a 16-bit
//! operation an [`Operand16`], and there is no implicit conversion
//! between the two.

use crate::bus::Bus;
use crate::memory_map::HIGH_PAGE_BASE;

use super::Cpu;
use super::registers::{R8, R16};

/// An 8-bit readable (and, except for immediates, writable) location.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operand8 {
    /// Direct register storage.
    Reg(R8),
    /// Read-only immediate, value captured at decode time.
    Imm(u8),
    /// Byte addressed through a 16-bit register pair, e.g. (HL).
    Ind(R16),
    /// Byte at a direct address, e.g. (a16).
    Mem(u16),
    /// Byte at 0xFF00 + n, the LDH pseudo-pointer. The offset is an
    /// unsigned byte; the whole high page is reachable.
    High(u8),
    /// Byte at 0xFF00 + C.
    HighC,
}

/// A 16-bit readable/writable location.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operand16 {
    /// A register pair or SP.
    Reg(R16),
    /// Read-only immediate, value captured at decode time.
    Imm(u16),
    /// Little-endian word at a direct address.
    Mem(u16),
}

impl Cpu {
    pub(crate) fn read_operand8(&self, bus: &Bus, operand: Operand8) -> u8 {
        match operand {
            Operand8::Reg(register) => self.regs.get8(register),
            Operand8::Imm(value) => value,
            Operand8::Ind(pair) => bus.read8(self.regs.get_pair(pair)),
            Operand8::Mem(address) => bus.read8(address),
            Operand8::High(offset) => bus.read8(HIGH_PAGE_BASE + offset as u16),
            Operand8::HighC => bus.read8(HIGH_PAGE_BASE + self.regs.c as u16),
        }
    }

    pub(crate) fn write_operand8(&mut self, bus: &mut Bus, operand: Operand8, value: u8) {
        match operand {
            Operand8::Reg(register) => self.regs.set8(register, value),
            // The decoder never binds an immediate as a destination.
            Operand8::Imm(_) => unreachable!("write to an immediate operand"),
            Operand8::Ind(pair) => bus.write8(self.regs.get_pair(pair), value),
            Operand8::Mem(address) => bus.write8(address, value),
            Operand8::High(offset) => bus.write8(HIGH_PAGE_BASE + offset as u16, value),
            Operand8::HighC => bus.write8(HIGH_PAGE_BASE + self.regs.c as u16, value),
        }
    }

    pub(crate) fn read_operand16(&self, bus: &Bus, operand: Operand16) -> u16 {
        match operand {
            Operand16::Reg(pair) => self.regs.get_pair(pair),
            Operand16::Imm(value) => value,
            Operand16::Mem(address) => bus.read16(address),
        }
    }

    pub(crate) fn write_operand16(&mut self, bus: &mut Bus, operand: Operand16, value: u16) {
        match operand {
            Operand16::Reg(pair) => self.regs.set_pair(pair, value),
            Operand16::Imm(_) => unreachable!("write to an immediate operand"),
            Operand16::Mem(address) => bus.write16(address, value),
        }
    }
}
