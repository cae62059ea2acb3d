//! Opcode decoding for both CPU variants.
//!
//! Decoding produces an [`Instruction`] value: the operation with its
//! operand bindings captured, the encoded length, and the base cycle
//! count. A per-variant page is consulted before the shared page, so
//! opcodes whose meaning differs between the Z80 and the LR35902 (or
//! which exist on only one of them) resolve to the right operation.

use crate::bus::Bus;

use super::operand::{Operand8, Operand16};
use super::registers::{R8, R16, Variant};

/// Branch condition codes. PO/PE/P/M test the Z80 parity and sign flags
/// and are never produced when decoding for the LR35902.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Cond {
    Nz,
    Z,
    Nc,
    C,
    Po,
    Pe,
    P,
    M,
}

/// Operations on the 0xCB bit-operation page.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CbOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
    Bit(u8),
    Res(u8),
    Set(u8),
}

/// One opcode family with its operand bindings.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Op {
    Nop,
    Stop,
    Halt,
    Di,
    Ei,
    Ld8 { dst: Operand8, src: Operand8 },
    Ld16 { dst: Operand16, src: Operand16 },
    /// LD (HL+), A / LD (HL-), A; `dec` selects the HL- form.
    LdToHli { dec: bool },
    /// LD A, (HL+) / LD A, (HL-).
    LdFromHli { dec: bool },
    /// LD HL, SP + n (n signed).
    LdHlSp(i8),
    /// ADD SP, n (n signed).
    AddSp(i8),
    Inc8(Operand8),
    Dec8(Operand8),
    Inc16(R16),
    Dec16(R16),
    Add { src: Operand8, carry: bool },
    Sub { src: Operand8, carry: bool },
    And(Operand8),
    Xor(Operand8),
    Or(Operand8),
    Cp(Operand8),
    AddHl(R16),
    Daa,
    Cpl,
    Scf,
    Ccf,
    Rlca,
    Rla,
    Rrca,
    Rra,
    Jp { cond: Option<Cond>, addr: u16 },
    JpHl,
    Jr { cond: Option<Cond>, offset: i8 },
    Call { cond: Option<Cond>, addr: u16 },
    Ret { cond: Option<Cond> },
    Reti,
    Rst(u16),
    Push(R16),
    Pop(R16),
    Cb { op: CbOp, operand: Operand8 },
    // --- Z80 only ---
    ExAfAf,
    Exx,
    ExDeHl,
    ExSpHl,
    Djnz(i8),
    /// ED-page block transfers; `dec` selects LDD/LDDR, `repeat` the
    /// auto-repeating forms.
    BlockMove { dec: bool, repeat: bool },
}

/// A decoded instruction: operands bound, length and base cycles fixed.
/// Conditional branches report extra cycles from execution when taken.
#[derive(Debug, Copy, Clone)]
pub struct Instruction {
    pub op: Op,
    pub length: u8,
    pub cycles: u8,
}

#[inline(always)]
fn instruction(op: Op, length: u8, cycles: u8) -> Instruction {
    Instruction { op, length, cycles }
}

// --- Immediate readers (operands of the instruction at `pc`) ---

#[inline(always)]
fn d8(bus: &Bus, pc: u16) -> u8 {
    bus.read8(pc.wrapping_add(1))
}

#[inline(always)]
fn r8(bus: &Bus, pc: u16) -> i8 {
    bus.read8(pc.wrapping_add(1)) as i8
}

#[inline(always)]
fn d16(bus: &Bus, pc: u16) -> u16 {
    bus.read16(pc.wrapping_add(1))
}

/// Operand encoding shared by the LD/ALU grids and the CB page:
/// B, C, D, E, H, L, (HL), A for indices 0..=7.
fn grid_operand(index: u8) -> Operand8 {
    match index & 7 {
        0 => Operand8::Reg(R8::B),
        1 => Operand8::Reg(R8::C),
        2 => Operand8::Reg(R8::D),
        3 => Operand8::Reg(R8::E),
        4 => Operand8::Reg(R8::H),
        5 => Operand8::Reg(R8::L),
        6 => Operand8::Ind(R16::HL),
        _ => Operand8::Reg(R8::A),
    }
}

/// Decodes the instruction at `pc` for the given variant.
///
/// Unrecognized opcodes are a fatal decode error reported with the PC
/// and the raw bytes.
pub(crate) fn decode(variant: Variant, bus: &Bus, pc: u16) -> Result<Instruction, String> {
    let opcode = bus.read8(pc);

    let overridden = match variant {
        Variant::Lr35902 => decode_lr35902(opcode, bus, pc),
        Variant::Z80 => decode_z80(opcode, bus, pc)?,
    };
    if let Some(found) = overridden {
        return Ok(found);
    }

    if opcode == 0xCB {
        return decode_cb(variant, bus, pc);
    }

    decode_common(opcode, bus, pc)
}

/// Opcodes whose meaning is specific to the LR35902.
fn decode_lr35902(opcode: u8, bus: &Bus, pc: u16) -> Option<Instruction> {
    use Operand8 as O8;
    use Operand16 as O16;

    let found = match opcode {
        0x08 => instruction(
            Op::Ld16 {
                dst: O16::Mem(d16(bus, pc)),
                src: O16::Reg(R16::SP),
            },
            3,
            20,
        ),
        0x10 => instruction(Op::Stop, 2, 4),
        0x22 => instruction(Op::LdToHli { dec: false }, 1, 8),
        0x2A => instruction(Op::LdFromHli { dec: false }, 1, 8),
        0x32 => instruction(Op::LdToHli { dec: true }, 1, 8),
        0x3A => instruction(Op::LdFromHli { dec: true }, 1, 8),
        0xD9 => instruction(Op::Reti, 1, 16),
        0xE0 => instruction(
            Op::Ld8 {
                dst: O8::High(d8(bus, pc)),
                src: O8::Reg(R8::A),
            },
            2,
            12,
        ),
        0xE2 => instruction(
            Op::Ld8 {
                dst: O8::HighC,
                src: O8::Reg(R8::A),
            },
            1,
            8,
        ),
        0xE8 => instruction(Op::AddSp(r8(bus, pc)), 2, 16),
        0xEA => instruction(
            Op::Ld8 {
                dst: O8::Mem(d16(bus, pc)),
                src: O8::Reg(R8::A),
            },
            3,
            16,
        ),
        0xF0 => instruction(
            Op::Ld8 {
                dst: O8::Reg(R8::A),
                src: O8::High(d8(bus, pc)),
            },
            2,
            12,
        ),
        0xF2 => instruction(
            Op::Ld8 {
                dst: O8::Reg(R8::A),
                src: O8::HighC,
            },
            1,
            8,
        ),
        0xF8 => instruction(Op::LdHlSp(r8(bus, pc)), 2, 12),
        0xFA => instruction(
            Op::Ld8 {
                dst: O8::Reg(R8::A),
                src: O8::Mem(d16(bus, pc)),
            },
            3,
            16,
        ),
        _ => return None,
    };
    Some(found)
}

/// Opcodes whose meaning is specific to the Z80, including the 0xED
/// block-transfer page. The I/O opcodes (0xD3, 0xDB) and the indexed
/// prefixes (0xDD, 0xFD) are decode errors: the bus has no port space.
fn decode_z80(opcode: u8, bus: &Bus, pc: u16) -> Result<Option<Instruction>, String> {
    use Operand8 as O8;
    use Operand16 as O16;

    let found = match opcode {
        0x08 => instruction(Op::ExAfAf, 1, 4),
        0x10 => instruction(Op::Djnz(r8(bus, pc)), 2, 8),
        0x22 => instruction(
            Op::Ld16 {
                dst: O16::Mem(d16(bus, pc)),
                src: O16::Reg(R16::HL),
            },
            3,
            16,
        ),
        0x2A => instruction(
            Op::Ld16 {
                dst: O16::Reg(R16::HL),
                src: O16::Mem(d16(bus, pc)),
            },
            3,
            16,
        ),
        0x32 => instruction(
            Op::Ld8 {
                dst: O8::Mem(d16(bus, pc)),
                src: O8::Reg(R8::A),
            },
            3,
            13,
        ),
        0x3A => instruction(
            Op::Ld8 {
                dst: O8::Reg(R8::A),
                src: O8::Mem(d16(bus, pc)),
            },
            3,
            13,
        ),
        0xD9 => instruction(Op::Exx, 1, 4),
        0xE0 => instruction(Op::Ret { cond: Some(Cond::Po) }, 1, 8),
        0xE2 => instruction(
            Op::Jp {
                cond: Some(Cond::Po),
                addr: d16(bus, pc),
            },
            3,
            12,
        ),
        0xE3 => instruction(Op::ExSpHl, 1, 19),
        0xE4 => instruction(
            Op::Call {
                cond: Some(Cond::Po),
                addr: d16(bus, pc),
            },
            3,
            12,
        ),
        0xE8 => instruction(Op::Ret { cond: Some(Cond::Pe) }, 1, 8),
        0xEA => instruction(
            Op::Jp {
                cond: Some(Cond::Pe),
                addr: d16(bus, pc),
            },
            3,
            12,
        ),
        0xEB => instruction(Op::ExDeHl, 1, 4),
        0xEC => instruction(
            Op::Call {
                cond: Some(Cond::Pe),
                addr: d16(bus, pc),
            },
            3,
            12,
        ),
        0xED => {
            let extended = d8(bus, pc);
            let op = match extended {
                0xA0 => Op::BlockMove {
                    dec: false,
                    repeat: false,
                },
                0xA8 => Op::BlockMove {
                    dec: true,
                    repeat: false,
                },
                0xB0 => Op::BlockMove {
                    dec: false,
                    repeat: true,
                },
                0xB8 => Op::BlockMove {
                    dec: true,
                    repeat: true,
                },
                _ => {
                    return Err(format!(
                        "unrecognized opcode 0xED {:#04X} at PC={:#06X}",
                        extended, pc
                    ));
                }
            };
            instruction(op, 2, 16)
        }
        0xF0 => instruction(Op::Ret { cond: Some(Cond::P) }, 1, 8),
        0xF2 => instruction(
            Op::Jp {
                cond: Some(Cond::P),
                addr: d16(bus, pc),
            },
            3,
            12,
        ),
        0xF4 => instruction(
            Op::Call {
                cond: Some(Cond::P),
                addr: d16(bus, pc),
            },
            3,
            12,
        ),
        0xF8 => instruction(Op::Ret { cond: Some(Cond::M) }, 1, 8),
        0xFA => instruction(
            Op::Jp {
                cond: Some(Cond::M),
                addr: d16(bus, pc),
            },
            3,
            12,
        ),
        0xFC => instruction(
            Op::Call {
                cond: Some(Cond::M),
                addr: d16(bus, pc),
            },
            3,
            12,
        ),
        0xD3 | 0xDB | 0xDD | 0xFD => {
            return Err(format!(
                "unrecognized opcode {:#04X} at PC={:#06X} (I/O and indexed pages are not implemented)",
                opcode, pc
            ));
        }
        _ => return Ok(None),
    };
    Ok(Some(found))
}

/// The shared page: opcodes present on both variants with the same
/// encoding. Flag differences are handled at execution time.
fn decode_common(opcode: u8, bus: &Bus, pc: u16) -> Result<Instruction, String> {
    use Operand8 as O8;
    use Operand16 as O16;

    // The LD and ALU grids cover half the opcode space; handle them
    // before the explicit rows.
    let found = match opcode {
        0x76 => instruction(Op::Halt, 1, 4),
        0x40..=0x7F => {
            let dst = grid_operand(opcode >> 3);
            let src = grid_operand(opcode);
            let cycles = if matches!(dst, O8::Ind(_)) || matches!(src, O8::Ind(_)) {
                8
            } else {
                4
            };
            instruction(Op::Ld8 { dst, src }, 1, cycles)
        }
        0x80..=0xBF => {
            let src = grid_operand(opcode);
            let cycles = if matches!(src, O8::Ind(_)) { 8 } else { 4 };
            let op = match (opcode >> 3) & 7 {
                0 => Op::Add { src, carry: false },
                1 => Op::Add { src, carry: true },
                2 => Op::Sub { src, carry: false },
                3 => Op::Sub { src, carry: true },
                4 => Op::And(src),
                5 => Op::Xor(src),
                6 => Op::Or(src),
                _ => Op::Cp(src),
            };
            instruction(op, 1, cycles)
        }

        0x00 => instruction(Op::Nop, 1, 4),
        0x01 => instruction(
            Op::Ld16 {
                dst: O16::Reg(R16::BC),
                src: O16::Imm(d16(bus, pc)),
            },
            3,
            12,
        ),
        0x02 => instruction(
            Op::Ld8 {
                dst: O8::Ind(R16::BC),
                src: O8::Reg(R8::A),
            },
            1,
            8,
        ),
        0x03 => instruction(Op::Inc16(R16::BC), 1, 8),
        0x04 => instruction(Op::Inc8(O8::Reg(R8::B)), 1, 4),
        0x05 => instruction(Op::Dec8(O8::Reg(R8::B)), 1, 4),
        0x06 => instruction(
            Op::Ld8 {
                dst: O8::Reg(R8::B),
                src: O8::Imm(d8(bus, pc)),
            },
            2,
            8,
        ),
        0x07 => instruction(Op::Rlca, 1, 4),
        0x09 => instruction(Op::AddHl(R16::BC), 1, 8),
        0x0A => instruction(
            Op::Ld8 {
                dst: O8::Reg(R8::A),
                src: O8::Ind(R16::BC),
            },
            1,
            8,
        ),
        0x0B => instruction(Op::Dec16(R16::BC), 1, 8),
        0x0C => instruction(Op::Inc8(O8::Reg(R8::C)), 1, 4),
        0x0D => instruction(Op::Dec8(O8::Reg(R8::C)), 1, 4),
        0x0E => instruction(
            Op::Ld8 {
                dst: O8::Reg(R8::C),
                src: O8::Imm(d8(bus, pc)),
            },
            2,
            8,
        ),
        0x0F => instruction(Op::Rrca, 1, 4),

        0x11 => instruction(
            Op::Ld16 {
                dst: O16::Reg(R16::DE),
                src: O16::Imm(d16(bus, pc)),
            },
            3,
            12,
        ),
        0x12 => instruction(
            Op::Ld8 {
                dst: O8::Ind(R16::DE),
                src: O8::Reg(R8::A),
            },
            1,
            8,
        ),
        0x13 => instruction(Op::Inc16(R16::DE), 1, 8),
        0x14 => instruction(Op::Inc8(O8::Reg(R8::D)), 1, 4),
        0x15 => instruction(Op::Dec8(O8::Reg(R8::D)), 1, 4),
        0x16 => instruction(
            Op::Ld8 {
                dst: O8::Reg(R8::D),
                src: O8::Imm(d8(bus, pc)),
            },
            2,
            8,
        ),
        0x17 => instruction(Op::Rla, 1, 4),
        0x18 => instruction(
            Op::Jr {
                cond: None,
                offset: r8(bus, pc),
            },
            2,
            12,
        ),
        0x19 => instruction(Op::AddHl(R16::DE), 1, 8),
        0x1A => instruction(
            Op::Ld8 {
                dst: O8::Reg(R8::A),
                src: O8::Ind(R16::DE),
            },
            1,
            8,
        ),
        0x1B => instruction(Op::Dec16(R16::DE), 1, 8),
        0x1C => instruction(Op::Inc8(O8::Reg(R8::E)), 1, 4),
        0x1D => instruction(Op::Dec8(O8::Reg(R8::E)), 1, 4),
        0x1E => instruction(
            Op::Ld8 {
                dst: O8::Reg(R8::E),
                src: O8::Imm(d8(bus, pc)),
            },
            2,
            8,
        ),
        0x1F => instruction(Op::Rra, 1, 4),

        0x20 => instruction(
            Op::Jr {
                cond: Some(Cond::Nz),
                offset: r8(bus, pc),
            },
            2,
            8,
        ),
        0x21 => instruction(
            Op::Ld16 {
                dst: O16::Reg(R16::HL),
                src: O16::Imm(d16(bus, pc)),
            },
            3,
            12,
        ),
        0x23 => instruction(Op::Inc16(R16::HL), 1, 8),
        0x24 => instruction(Op::Inc8(O8::Reg(R8::H)), 1, 4),
        0x25 => instruction(Op::Dec8(O8::Reg(R8::H)), 1, 4),
        0x26 => instruction(
            Op::Ld8 {
                dst: O8::Reg(R8::H),
                src: O8::Imm(d8(bus, pc)),
            },
            2,
            8,
        ),
        0x27 => instruction(Op::Daa, 1, 4),
        0x28 => instruction(
            Op::Jr {
                cond: Some(Cond::Z),
                offset: r8(bus, pc),
            },
            2,
            8,
        ),
        0x29 => instruction(Op::AddHl(R16::HL), 1, 8),
        0x2B => instruction(Op::Dec16(R16::HL), 1, 8),
        0x2C => instruction(Op::Inc8(O8::Reg(R8::L)), 1, 4),
        0x2D => instruction(Op::Dec8(O8::Reg(R8::L)), 1, 4),
        0x2E => instruction(
            Op::Ld8 {
                dst: O8::Reg(R8::L),
                src: O8::Imm(d8(bus, pc)),
            },
            2,
            8,
        ),
        0x2F => instruction(Op::Cpl, 1, 4),

        0x30 => instruction(
            Op::Jr {
                cond: Some(Cond::Nc),
                offset: r8(bus, pc),
            },
            2,
            8,
        ),
        0x31 => instruction(
            Op::Ld16 {
                dst: O16::Reg(R16::SP),
                src: O16::Imm(d16(bus, pc)),
            },
            3,
            12,
        ),
        0x33 => instruction(Op::Inc16(R16::SP), 1, 8),
        0x34 => instruction(Op::Inc8(O8::Ind(R16::HL)), 1, 12),
        0x35 => instruction(Op::Dec8(O8::Ind(R16::HL)), 1, 12),
        0x36 => instruction(
            Op::Ld8 {
                dst: O8::Ind(R16::HL),
                src: O8::Imm(d8(bus, pc)),
            },
            2,
            12,
        ),
        0x37 => instruction(Op::Scf, 1, 4),
        0x38 => instruction(
            Op::Jr {
                cond: Some(Cond::C),
                offset: r8(bus, pc),
            },
            2,
            8,
        ),
        0x39 => instruction(Op::AddHl(R16::SP), 1, 8),
        0x3B => instruction(Op::Dec16(R16::SP), 1, 8),
        0x3C => instruction(Op::Inc8(O8::Reg(R8::A)), 1, 4),
        0x3D => instruction(Op::Dec8(O8::Reg(R8::A)), 1, 4),
        0x3E => instruction(
            Op::Ld8 {
                dst: O8::Reg(R8::A),
                src: O8::Imm(d8(bus, pc)),
            },
            2,
            8,
        ),
        0x3F => instruction(Op::Ccf, 1, 4),

        0xC0 => instruction(Op::Ret { cond: Some(Cond::Nz) }, 1, 8),
        0xC1 => instruction(Op::Pop(R16::BC), 1, 12),
        0xC2 => instruction(
            Op::Jp {
                cond: Some(Cond::Nz),
                addr: d16(bus, pc),
            },
            3,
            12,
        ),
        0xC3 => instruction(
            Op::Jp {
                cond: None,
                addr: d16(bus, pc),
            },
            3,
            16,
        ),
        0xC4 => instruction(
            Op::Call {
                cond: Some(Cond::Nz),
                addr: d16(bus, pc),
            },
            3,
            12,
        ),
        0xC5 => instruction(Op::Push(R16::BC), 1, 16),
        0xC6 => instruction(
            Op::Add {
                src: O8::Imm(d8(bus, pc)),
                carry: false,
            },
            2,
            8,
        ),
        0xC7 => instruction(Op::Rst(0x0000), 1, 16),
        0xC8 => instruction(Op::Ret { cond: Some(Cond::Z) }, 1, 8),
        0xC9 => instruction(Op::Ret { cond: None }, 1, 16),
        0xCA => instruction(
            Op::Jp {
                cond: Some(Cond::Z),
                addr: d16(bus, pc),
            },
            3,
            12,
        ),
        0xCC => instruction(
            Op::Call {
                cond: Some(Cond::Z),
                addr: d16(bus, pc),
            },
            3,
            12,
        ),
        0xCD => instruction(
            Op::Call {
                cond: None,
                addr: d16(bus, pc),
            },
            3,
            24,
        ),
        0xCE => instruction(
            Op::Add {
                src: O8::Imm(d8(bus, pc)),
                carry: true,
            },
            2,
            8,
        ),
        0xCF => instruction(Op::Rst(0x0008), 1, 16),

        0xD0 => instruction(Op::Ret { cond: Some(Cond::Nc) }, 1, 8),
        0xD1 => instruction(Op::Pop(R16::DE), 1, 12),
        0xD2 => instruction(
            Op::Jp {
                cond: Some(Cond::Nc),
                addr: d16(bus, pc),
            },
            3,
            12,
        ),
        0xD4 => instruction(
            Op::Call {
                cond: Some(Cond::Nc),
                addr: d16(bus, pc),
            },
            3,
            12,
        ),
        0xD5 => instruction(Op::Push(R16::DE), 1, 16),
        0xD6 => instruction(
            Op::Sub {
                src: O8::Imm(d8(bus, pc)),
                carry: false,
            },
            2,
            8,
        ),
        0xD7 => instruction(Op::Rst(0x0010), 1, 16),
        0xD8 => instruction(Op::Ret { cond: Some(Cond::C) }, 1, 8),
        0xDA => instruction(
            Op::Jp {
                cond: Some(Cond::C),
                addr: d16(bus, pc),
            },
            3,
            12,
        ),
        0xDC => instruction(
            Op::Call {
                cond: Some(Cond::C),
                addr: d16(bus, pc),
            },
            3,
            12,
        ),
        0xDE => instruction(
            Op::Sub {
                src: O8::Imm(d8(bus, pc)),
                carry: true,
            },
            2,
            8,
        ),
        0xDF => instruction(Op::Rst(0x0018), 1, 16),

        0xE1 => instruction(Op::Pop(R16::HL), 1, 12),
        0xE5 => instruction(Op::Push(R16::HL), 1, 16),
        0xE6 => instruction(Op::And(O8::Imm(d8(bus, pc))), 2, 8),
        0xE7 => instruction(Op::Rst(0x0020), 1, 16),
        0xE9 => instruction(Op::JpHl, 1, 4),
        0xEE => instruction(Op::Xor(O8::Imm(d8(bus, pc))), 2, 8),
        0xEF => instruction(Op::Rst(0x0028), 1, 16),

        0xF1 => instruction(Op::Pop(R16::AF), 1, 12),
        0xF3 => instruction(Op::Di, 1, 4),
        0xF5 => instruction(Op::Push(R16::AF), 1, 16),
        0xF6 => instruction(Op::Or(O8::Imm(d8(bus, pc))), 2, 8),
        0xF7 => instruction(Op::Rst(0x0030), 1, 16),
        0xF9 => instruction(
            Op::Ld16 {
                dst: O16::Reg(R16::SP),
                src: O16::Reg(R16::HL),
            },
            1,
            8,
        ),
        0xFB => instruction(Op::Ei, 1, 4),
        0xFE => instruction(Op::Cp(O8::Imm(d8(bus, pc))), 2, 8),
        0xFF => instruction(Op::Rst(0x0038), 1, 16),

        _ => {
            return Err(format!(
                "unrecognized opcode {:#04X} at PC={:#06X}",
                opcode, pc
            ));
        }
    };
    Ok(found)
}

/// The 0xCB bit-operation page. The SWAP slot (0x30..=0x37) exists only
/// on the LR35902; the Z80's undocumented SLL lives there and is
/// rejected.
fn decode_cb(variant: Variant, bus: &Bus, pc: u16) -> Result<Instruction, String> {
    let extended = d8(bus, pc);
    let operand = grid_operand(extended);
    let indirect = matches!(operand, Operand8::Ind(_));

    let op = match extended >> 6 {
        0 => match (extended >> 3) & 7 {
            0 => CbOp::Rlc,
            1 => CbOp::Rrc,
            2 => CbOp::Rl,
            3 => CbOp::Rr,
            4 => CbOp::Sla,
            5 => CbOp::Sra,
            6 => {
                if variant == Variant::Lr35902 {
                    CbOp::Swap
                } else {
                    return Err(format!(
                        "unrecognized opcode 0xCB {:#04X} at PC={:#06X}",
                        extended, pc
                    ));
                }
            }
            _ => CbOp::Srl,
        },
        1 => CbOp::Bit((extended >> 3) & 7),
        2 => CbOp::Res((extended >> 3) & 7),
        _ => CbOp::Set((extended >> 3) & 7),
    };

    let cycles = match op {
        CbOp::Bit(_) if indirect => 12,
        _ if indirect => 16,
        _ => 8,
    };
    Ok(instruction(Op::Cb { op, operand }, 2, cycles))
}
