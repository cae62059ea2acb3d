//! Arithmetic and logic helpers.
//!
//! Each operation has one body; the flag effects are routed through
//! per-variant hooks. The LR35902 computes Z, N, H and C; the Z80
//! additionally computes S and P/V (signed overflow for arithmetic,
//! parity for logic).

use lazy_static::lazy_static;

use super::Cpu;
use super::registers::{Flag, R16, Variant};

lazy_static! {
    // Even-parity lookup for the Z80 P flag.
    static ref PARITY: [bool; 256] = {
        let mut table = [false; 256];
        for (value, even) in table.iter_mut().enumerate() {
            *even = (value as u8).count_ones() % 2 == 0;
        }
        table
    };
}

impl Cpu {
    /// Flag routine for 8-bit adds and subtracts: Z N H C, plus S and
    /// signed overflow on the Z80.
    fn arith_flags(&mut self, result: u8, half: bool, carry: bool, subtract: bool, overflow: bool) {
        self.regs.set_flag(Flag::Z, result == 0);
        self.regs.set_flag(Flag::N, subtract);
        self.regs.set_flag(Flag::H, half);
        self.regs.set_flag(Flag::C, carry);
        if self.regs.variant == Variant::Z80 {
            self.regs.set_flag(Flag::S, result & 0x80 != 0);
            self.regs.set_flag(Flag::PV, overflow);
        }
    }

    /// Flag routine for AND/OR/XOR: Z cleared-N H cleared-C, plus S and
    /// parity on the Z80.
    fn logic_flags(&mut self, result: u8, half: bool) {
        self.regs.set_flag(Flag::Z, result == 0);
        self.regs.set_flag(Flag::N, false);
        self.regs.set_flag(Flag::H, half);
        self.regs.set_flag(Flag::C, false);
        if self.regs.variant == Variant::Z80 {
            self.regs.set_flag(Flag::S, result & 0x80 != 0);
            self.regs.set_flag(Flag::PV, PARITY[result as usize]);
        }
    }

    pub(crate) fn add_a(&mut self, value: u8, use_carry: bool) {
        let carry_in = if use_carry && self.regs.flag(Flag::C) {
            1
        } else {
            0
        };
        let a = self.regs.a;
        let (first, c1) = a.overflowing_add(value);
        let (result, c2) = first.overflowing_add(carry_in);
        let half = (a & 0x0F) + (value & 0x0F) + carry_in > 0x0F;
        let overflow = (!(a ^ value) & (a ^ result) & 0x80) != 0;
        self.regs.a = result;
        self.arith_flags(result, half, c1 || c2, false, overflow);
    }

    fn sub_core(&mut self, value: u8, use_carry: bool) -> u8 {
        let carry_in = if use_carry && self.regs.flag(Flag::C) {
            1
        } else {
            0
        };
        let a = self.regs.a;
        let (first, b1) = a.overflowing_sub(value);
        let (result, b2) = first.overflowing_sub(carry_in);
        let half = (a & 0x0F) < (value & 0x0F) + carry_in;
        let overflow = ((a ^ value) & (a ^ result) & 0x80) != 0;
        self.arith_flags(result, half, b1 || b2, true, overflow);
        result
    }

    pub(crate) fn sub_a(&mut self, value: u8, use_carry: bool) {
        self.regs.a = self.sub_core(value, use_carry);
    }

    /// Compare: subtraction flags, result discarded.
    pub(crate) fn cp_a(&mut self, value: u8) {
        let _ = self.sub_core(value, false);
    }

    pub(crate) fn and_a(&mut self, value: u8) {
        self.regs.a &= value;
        let result = self.regs.a;
        self.logic_flags(result, true);
    }

    pub(crate) fn xor_a(&mut self, value: u8) {
        self.regs.a ^= value;
        let result = self.regs.a;
        self.logic_flags(result, false);
    }

    pub(crate) fn or_a(&mut self, value: u8) {
        self.regs.a |= value;
        let result = self.regs.a;
        self.logic_flags(result, false);
    }

    /// INC r: carry is preserved; the Z80 overflow case is old == 0x7F.
    pub(crate) fn inc8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.regs.set_flag(Flag::Z, result == 0);
        self.regs.set_flag(Flag::N, false);
        self.regs.set_flag(Flag::H, (value & 0x0F) == 0x0F);
        if self.regs.variant == Variant::Z80 {
            self.regs.set_flag(Flag::S, result & 0x80 != 0);
            self.regs.set_flag(Flag::PV, value == 0x7F);
        }
        result
    }

    /// DEC r: carry is preserved; H is the borrow from bit 4 (the low
    /// nibble of the result becomes 0x0F); the Z80 overflow case is
    /// old == 0x80.
    pub(crate) fn dec8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.regs.set_flag(Flag::Z, result == 0);
        self.regs.set_flag(Flag::N, true);
        self.regs.set_flag(Flag::H, (value & 0x0F) == 0x00);
        if self.regs.variant == Variant::Z80 {
            self.regs.set_flag(Flag::S, result & 0x80 != 0);
            self.regs.set_flag(Flag::PV, value == 0x80);
        }
        result
    }

    /// ADD HL, rr: only N, H (bit 11) and C are touched, so Z (and the
    /// Z80's S and P/V) survive on both variants.
    pub(crate) fn add_hl(&mut self, value: u16) {
        let hl = self.regs.get_pair(R16::HL);
        let (result, carry) = hl.overflowing_add(value);
        let half = (hl & 0x0FFF) + (value & 0x0FFF) > 0x0FFF;
        self.regs.set_pair(R16::HL, result);
        self.regs.set_flag(Flag::N, false);
        self.regs.set_flag(Flag::H, half);
        self.regs.set_flag(Flag::C, carry);
    }

    /// Shared by ADD SP, n and LD HL, SP+n. The offset is sign-extended
    /// for the sum, but H and C come from the unsigned 8-bit add of the
    /// low byte of SP and the raw offset byte, not the 16-bit result.
    pub(crate) fn add_sp_signed(&mut self, offset: i8) -> u16 {
        let sp = self.regs.sp;
        let unsigned = offset as u8;
        let half = (sp & 0x000F) + (unsigned & 0x0F) as u16 > 0x000F;
        let carry = (sp & 0x00FF) + unsigned as u16 > 0x00FF;
        self.regs.set_flag(Flag::Z, false);
        self.regs.set_flag(Flag::N, false);
        self.regs.set_flag(Flag::H, half);
        self.regs.set_flag(Flag::C, carry);
        sp.wrapping_add(offset as i16 as u16)
    }

    /// CCF: C inverts and N clears on both variants; the old carry moves
    /// into H on the Z80, while the LR35902 clears H.
    pub(crate) fn ccf(&mut self) {
        let old_carry = self.regs.flag(Flag::C);
        self.regs.set_flag(Flag::N, false);
        self.regs.set_flag(
            Flag::H,
            match self.regs.variant {
                Variant::Z80 => old_carry,
                Variant::Lr35902 => false,
            },
        );
        self.regs.set_flag(Flag::C, !old_carry);
    }

    /// Decimal-adjust A after a BCD add or subtract.
    pub(crate) fn daa(&mut self) {
        let n_flag = self.regs.flag(Flag::N);
        let h_flag = self.regs.flag(Flag::H);
        let c_flag = self.regs.flag(Flag::C);
        let a = self.regs.a;

        let mut adjustment = 0u8;
        let mut set_carry = false;
        if !n_flag {
            if c_flag || a > 0x99 {
                adjustment |= 0x60;
                set_carry = true;
            }
            if h_flag || (a & 0x0F) > 0x09 {
                adjustment |= 0x06;
            }
            self.regs.a = a.wrapping_add(adjustment);
        } else {
            if c_flag {
                adjustment |= 0x60;
                set_carry = true;
            }
            if h_flag {
                adjustment |= 0x06;
            }
            self.regs.a = a.wrapping_sub(adjustment);
        }

        let result = self.regs.a;
        self.regs.set_flag(Flag::Z, result == 0);
        self.regs.set_flag(Flag::C, set_carry);
        match self.regs.variant {
            // The LR35902 always clears H.
            Variant::Lr35902 => self.regs.set_flag(Flag::H, false),
            // The Z80 recomputes H from the nibble adjustment and keeps
            // its sign and parity flags current.
            Variant::Z80 => {
                let half = if !n_flag {
                    (a & 0x0F) > 0x09
                } else {
                    h_flag && (a & 0x0F) < 0x06
                };
                self.regs.set_flag(Flag::H, half);
                self.regs.set_flag(Flag::S, result & 0x80 != 0);
                self.regs.set_flag(Flag::PV, PARITY[result as usize]);
            }
        }
    }

    pub(crate) fn parity_even(value: u8) -> bool {
        PARITY[value as usize]
    }
}
