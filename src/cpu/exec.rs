//! Execution dispatch: one decoded [`Instruction`] in, state changes and
//! any extra branch cycles out.

use std::mem;

use crate::bus::Bus;

use super::Cpu;
use super::decode::{CbOp, Cond, Instruction, Op};
use super::registers::{Flag, R16};

impl Cpu {
    /// Executes a decoded instruction. PC has already been advanced past
    /// it. The return value is the extra cycle cost of taken branches,
    /// added to the instruction's base cycle count by `step`.
    pub(crate) fn execute(&mut self, bus: &mut Bus, found: &Instruction) -> u16 {
        match found.op {
            Op::Nop => 0,
            Op::Stop => {
                self.stop_requested = true;
                log::warn!("STOP executed at PC={:#06X}", self.regs.pc);
                0
            }
            Op::Halt => {
                self.halted = true;
                0
            }
            Op::Di => {
                self.iff1 = false;
                self.iff2 = false;
                self.ei_pending = false;
                0
            }
            Op::Ei => {
                self.ei_pending = true;
                0
            }

            // --- Loads ---
            Op::Ld8 { dst, src } => {
                let value = self.read_operand8(bus, src);
                self.write_operand8(bus, dst, value);
                0
            }
            Op::Ld16 { dst, src } => {
                let value = self.read_operand16(bus, src);
                self.write_operand16(bus, dst, value);
                0
            }
            Op::LdToHli { dec } => {
                let hl = self.regs.get_pair(R16::HL);
                bus.write8(hl, self.regs.a);
                self.regs.set_pair(R16::HL, Self::bump(hl, dec));
                0
            }
            Op::LdFromHli { dec } => {
                let hl = self.regs.get_pair(R16::HL);
                self.regs.a = bus.read8(hl);
                self.regs.set_pair(R16::HL, Self::bump(hl, dec));
                0
            }
            Op::LdHlSp(offset) => {
                let value = self.add_sp_signed(offset);
                self.regs.set_pair(R16::HL, value);
                0
            }
            Op::AddSp(offset) => {
                self.regs.sp = self.add_sp_signed(offset);
                0
            }

            // --- 8-bit Arithmetic and Logic ---
            Op::Inc8(operand) => {
                let value = self.read_operand8(bus, operand);
                let result = self.inc8(value);
                self.write_operand8(bus, operand, result);
                0
            }
            Op::Dec8(operand) => {
                let value = self.read_operand8(bus, operand);
                let result = self.dec8(value);
                self.write_operand8(bus, operand, result);
                0
            }
            Op::Add { src, carry } => {
                let value = self.read_operand8(bus, src);
                self.add_a(value, carry);
                0
            }
            Op::Sub { src, carry } => {
                let value = self.read_operand8(bus, src);
                self.sub_a(value, carry);
                0
            }
            Op::And(src) => {
                let value = self.read_operand8(bus, src);
                self.and_a(value);
                0
            }
            Op::Xor(src) => {
                let value = self.read_operand8(bus, src);
                self.xor_a(value);
                0
            }
            Op::Or(src) => {
                let value = self.read_operand8(bus, src);
                self.or_a(value);
                0
            }
            Op::Cp(src) => {
                let value = self.read_operand8(bus, src);
                self.cp_a(value);
                0
            }
            Op::Daa => {
                self.daa();
                0
            }
            Op::Cpl => {
                self.regs.a = !self.regs.a;
                self.regs.set_flag(Flag::N, true);
                self.regs.set_flag(Flag::H, true);
                0
            }
            Op::Scf => {
                self.regs.set_flag(Flag::N, false);
                self.regs.set_flag(Flag::H, false);
                self.regs.set_flag(Flag::C, true);
                0
            }
            Op::Ccf => {
                self.ccf();
                0
            }

            // --- 16-bit Arithmetic ---
            Op::Inc16(pair) => {
                let value = self.regs.get_pair(pair);
                self.regs.set_pair(pair, value.wrapping_add(1));
                0
            }
            Op::Dec16(pair) => {
                let value = self.regs.get_pair(pair);
                self.regs.set_pair(pair, value.wrapping_sub(1));
                0
            }
            Op::AddHl(pair) => {
                let value = self.regs.get_pair(pair);
                self.add_hl(value);
                0
            }

            // --- Accumulator Rotates ---
            Op::Rlca => {
                self.rlca();
                0
            }
            Op::Rla => {
                self.rla();
                0
            }
            Op::Rrca => {
                self.rrca();
                0
            }
            Op::Rra => {
                self.rra();
                0
            }

            // --- Control Flow ---
            Op::Jp { cond, addr } => match cond {
                None => {
                    self.regs.pc = addr;
                    0
                }
                Some(cond) if self.condition(cond) => {
                    self.regs.pc = addr;
                    4
                }
                Some(_) => 0,
            },
            Op::JpHl => {
                self.regs.pc = self.regs.get_pair(R16::HL);
                0
            }
            Op::Jr { cond, offset } => match cond {
                None => {
                    self.relative_jump(offset);
                    0
                }
                Some(cond) if self.condition(cond) => {
                    self.relative_jump(offset);
                    4
                }
                Some(_) => 0,
            },
            Op::Call { cond, addr } => match cond {
                None => {
                    let pc = self.regs.pc;
                    self.push16(bus, pc);
                    self.regs.pc = addr;
                    0
                }
                Some(cond) if self.condition(cond) => {
                    let pc = self.regs.pc;
                    self.push16(bus, pc);
                    self.regs.pc = addr;
                    12
                }
                Some(_) => 0,
            },
            Op::Ret { cond } => match cond {
                None => {
                    self.regs.pc = self.pop16(bus);
                    0
                }
                Some(cond) if self.condition(cond) => {
                    self.regs.pc = self.pop16(bus);
                    12
                }
                Some(_) => 0,
            },
            Op::Reti => {
                self.regs.pc = self.pop16(bus);
                self.iff1 = true;
                self.iff2 = true;
                self.ei_pending = false;
                0
            }
            Op::Rst(vector) => {
                let pc = self.regs.pc;
                self.push16(bus, pc);
                self.regs.pc = vector;
                0
            }
            Op::Djnz(offset) => {
                self.regs.b = self.regs.b.wrapping_sub(1);
                if self.regs.b != 0 {
                    self.relative_jump(offset);
                    5
                } else {
                    0
                }
            }

            // --- Stack ---
            Op::Push(pair) => {
                let value = self.regs.get_pair(pair);
                self.push16(bus, value);
                0
            }
            Op::Pop(pair) => {
                let value = self.pop16(bus);
                self.regs.set_pair(pair, value);
                0
            }

            // --- Bit-operation Page ---
            Op::Cb { op, operand } => {
                self.execute_cb(bus, op, operand);
                0
            }

            // --- Z80 Exchanges and Block Moves ---
            Op::ExAfAf => {
                let shadow = self
                    .shadow
                    .as_mut()
                    .expect("shadow registers exist on the Z80 variant");
                mem::swap(&mut self.regs.a, &mut shadow.a);
                mem::swap(&mut self.regs.f, &mut shadow.f);
                0
            }
            Op::Exx => {
                let shadow = self
                    .shadow
                    .as_mut()
                    .expect("shadow registers exist on the Z80 variant");
                mem::swap(&mut self.regs.b, &mut shadow.b);
                mem::swap(&mut self.regs.c, &mut shadow.c);
                mem::swap(&mut self.regs.d, &mut shadow.d);
                mem::swap(&mut self.regs.e, &mut shadow.e);
                mem::swap(&mut self.regs.h, &mut shadow.h);
                mem::swap(&mut self.regs.l, &mut shadow.l);
                0
            }
            Op::ExDeHl => {
                mem::swap(&mut self.regs.d, &mut self.regs.h);
                mem::swap(&mut self.regs.e, &mut self.regs.l);
                0
            }
            Op::ExSpHl => {
                let hl = self.regs.get_pair(R16::HL);
                let at_sp = bus.read16(self.regs.sp);
                bus.write16(self.regs.sp, hl);
                self.regs.set_pair(R16::HL, at_sp);
                0
            }
            Op::BlockMove { dec, repeat } => self.block_move(bus, dec, repeat),
        }
    }

    fn condition(&self, cond: Cond) -> bool {
        match cond {
            Cond::Nz => !self.regs.flag(Flag::Z),
            Cond::Z => self.regs.flag(Flag::Z),
            Cond::Nc => !self.regs.flag(Flag::C),
            Cond::C => self.regs.flag(Flag::C),
            Cond::Po => !self.regs.flag(Flag::PV),
            Cond::Pe => self.regs.flag(Flag::PV),
            Cond::P => !self.regs.flag(Flag::S),
            Cond::M => self.regs.flag(Flag::S),
        }
    }

    #[inline(always)]
    fn relative_jump(&mut self, offset: i8) {
        self.regs.pc = self.regs.pc.wrapping_add(offset as i16 as u16);
    }

    #[inline(always)]
    fn bump(value: u16, dec: bool) -> u16 {
        if dec {
            value.wrapping_sub(1)
        } else {
            value.wrapping_add(1)
        }
    }

    /// One step of LDI/LDD/LDIR/LDDR: copy (HL) to (DE), step both
    /// pointers, decrement BC. S, Z and C are unchanged; H and N clear;
    /// P/V reports whether BC is still nonzero. The repeating forms
    /// rewind PC while BC is nonzero.
    fn block_move(&mut self, bus: &mut Bus, dec: bool, repeat: bool) -> u16 {
        let hl = self.regs.get_pair(R16::HL);
        let de = self.regs.get_pair(R16::DE);
        let value = bus.read8(hl);
        bus.write8(de, value);

        self.regs.set_pair(R16::HL, Self::bump(hl, dec));
        self.regs.set_pair(R16::DE, Self::bump(de, dec));
        let bc = self.regs.get_pair(R16::BC).wrapping_sub(1);
        self.regs.set_pair(R16::BC, bc);

        self.regs.set_flag(Flag::H, false);
        self.regs.set_flag(Flag::N, false);
        self.regs.set_flag(Flag::PV, bc != 0);

        if repeat && bc != 0 {
            self.regs.pc = self.regs.pc.wrapping_sub(2);
            5
        } else {
            0
        }
    }

    fn execute_cb(&mut self, bus: &mut Bus, op: CbOp, operand: super::operand::Operand8) {
        match op {
            CbOp::Bit(bit) => {
                let value = self.read_operand8(bus, operand);
                self.bit_test(bit, value);
            }
            CbOp::Res(bit) => {
                let value = self.read_operand8(bus, operand);
                self.write_operand8(bus, operand, value & !(1 << bit));
            }
            CbOp::Set(bit) => {
                let value = self.read_operand8(bus, operand);
                self.write_operand8(bus, operand, value | (1 << bit));
            }
            _ => {
                let value = self.read_operand8(bus, operand);
                let result = self.shift(op, value);
                self.write_operand8(bus, operand, result);
            }
        }
    }
}
