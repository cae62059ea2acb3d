//! Rotate, shift and bit-test helpers, shared by the accumulator rotate
//! opcodes and the 0xCB page.

use super::Cpu;
use super::decode::CbOp;
use super::registers::{Flag, Variant};

impl Cpu {
    /// Flag routine for the CB-page rotates and shifts: Z 0 0 C, plus S
    /// and parity on the Z80.
    fn shift_flags(&mut self, result: u8, carry: bool) {
        self.regs.set_flag(Flag::Z, result == 0);
        self.regs.set_flag(Flag::N, false);
        self.regs.set_flag(Flag::H, false);
        self.regs.set_flag(Flag::C, carry);
        if self.regs.variant == Variant::Z80 {
            self.regs.set_flag(Flag::S, result & 0x80 != 0);
            self.regs.set_flag(Flag::PV, Self::parity_even(result));
        }
    }

    /// Flag routine for RLCA/RLA/RRCA/RRA: only N, H and C change on the
    /// Z80 (S, Z and P/V are preserved); the LR35902 also clears Z.
    fn rotate_a_flags(&mut self, carry: bool) {
        self.regs.set_flag(Flag::N, false);
        self.regs.set_flag(Flag::H, false);
        self.regs.set_flag(Flag::C, carry);
        if self.regs.variant == Variant::Lr35902 {
            self.regs.set_flag(Flag::Z, false);
        }
    }

    // --- Pure Shift Cores (result, carry-out) ---
    fn rlc_core(value: u8) -> (u8, bool) {
        (value.rotate_left(1), value & 0x80 != 0)
    }
    fn rrc_core(value: u8) -> (u8, bool) {
        (value.rotate_right(1), value & 0x01 != 0)
    }
    fn rl_core(value: u8, carry_in: bool) -> (u8, bool) {
        ((value << 1) | carry_in as u8, value & 0x80 != 0)
    }
    fn rr_core(value: u8, carry_in: bool) -> (u8, bool) {
        ((value >> 1) | ((carry_in as u8) << 7), value & 0x01 != 0)
    }
    fn sla_core(value: u8) -> (u8, bool) {
        (value << 1, value & 0x80 != 0)
    }
    fn sra_core(value: u8) -> (u8, bool) {
        ((value >> 1) | (value & 0x80), value & 0x01 != 0)
    }
    fn srl_core(value: u8) -> (u8, bool) {
        (value >> 1, value & 0x01 != 0)
    }

    // --- Accumulator Rotates ---
    pub(crate) fn rlca(&mut self) {
        let (result, carry) = Self::rlc_core(self.regs.a);
        self.regs.a = result;
        self.rotate_a_flags(carry);
    }
    pub(crate) fn rrca(&mut self) {
        let (result, carry) = Self::rrc_core(self.regs.a);
        self.regs.a = result;
        self.rotate_a_flags(carry);
    }
    pub(crate) fn rla(&mut self) {
        let (result, carry) = Self::rl_core(self.regs.a, self.regs.flag(Flag::C));
        self.regs.a = result;
        self.rotate_a_flags(carry);
    }
    pub(crate) fn rra(&mut self) {
        let (result, carry) = Self::rr_core(self.regs.a, self.regs.flag(Flag::C));
        self.regs.a = result;
        self.rotate_a_flags(carry);
    }

    /// CB-page rotate/shift dispatch. BIT/RES/SET are handled by the
    /// caller; SWAP only decodes on the LR35902.
    pub(crate) fn shift(&mut self, op: CbOp, value: u8) -> u8 {
        let (result, carry) = match op {
            CbOp::Rlc => Self::rlc_core(value),
            CbOp::Rrc => Self::rrc_core(value),
            CbOp::Rl => Self::rl_core(value, self.regs.flag(Flag::C)),
            CbOp::Rr => Self::rr_core(value, self.regs.flag(Flag::C)),
            CbOp::Sla => Self::sla_core(value),
            CbOp::Sra => Self::sra_core(value),
            CbOp::Srl => Self::srl_core(value),
            CbOp::Swap => (value.rotate_left(4), false),
            CbOp::Bit(_) | CbOp::Res(_) | CbOp::Set(_) => {
                unreachable!("bit operations do not go through shift")
            }
        };
        self.shift_flags(result, carry);
        result
    }

    /// BIT b, r: Z reflects the tested bit, H sets, N clears, C is
    /// preserved. The Z80 mirrors Z into P/V and reports S for a set
    /// bit 7.
    pub(crate) fn bit_test(&mut self, bit: u8, value: u8) {
        let set = value & (1 << bit) != 0;
        self.regs.set_flag(Flag::Z, !set);
        self.regs.set_flag(Flag::N, false);
        self.regs.set_flag(Flag::H, true);
        if self.regs.variant == Variant::Z80 {
            self.regs.set_flag(Flag::PV, !set);
            self.regs.set_flag(Flag::S, bit == 7 && set);
        }
    }
}
