//! The instruction-driven CPU core, shared by the Zilog Z80 and the
//! Sharp LR35902. The two variants share a register model and most of
//! the opcode space; they differ in flag layout and semantics, a
//! handful of opcodes, the shadow register set, and the interrupt
//! model. See [`registers::Variant`].

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::bus::Bus;

mod constants;
pub mod decode;
mod exec;
pub mod operand;
mod ops_alu;
mod ops_rot_shift;
pub mod registers;

pub use constants::*;
pub use decode::{CbOp, Cond, Instruction, Op};
pub use operand::{Operand8, Operand16};
pub use registers::{Flag, R8, R16, Registers, ShadowRegisters, Variant};

// Type alias for CPU operation results.
pub type CpuResult<T> = Result<T, String>;

/// Cost of an idle step while halted or stopped.
const IDLE_CYCLES: u16 = 4;

/// Cost of accepting a maskable interrupt.
const INTERRUPT_CYCLES: u16 = 20;

///The EI instruction takes effect one instruction late: the following
///instruction still runs with interrupts disabled, and IFF1/IFF2 are set
///immediately after it completes. DI takes effect at once and cancels a
///pending enable.
pub struct Cpu {
    regs: Registers,
    shadow: Option<ShadowRegisters>,
    iff1: bool,
    iff2: bool,
    ei_pending: bool,
    halted: bool,
    stop_requested: bool,
    total_cycles: u64,
}

impl Cpu {
    /// Creates a CPU with hardware-like scrambled register contents.
    pub fn new(variant: Variant) -> Self {
        Self::from_rng(variant, &mut rand::rng())
    }

    /// Creates a CPU whose power-on scramble is reproducible.
    pub fn with_seed(variant: Variant, seed: u64) -> Self {
        Self::from_rng(variant, &mut StdRng::seed_from_u64(seed))
    }

    fn from_rng(variant: Variant, rng: &mut impl rand::Rng) -> Self {
        Cpu {
            regs: Registers::power_on(variant, rng),
            shadow: match variant {
                Variant::Z80 => Some(ShadowRegisters::power_on(rng)),
                Variant::Lr35902 => None,
            },
            iff1: false,
            iff2: false,
            ei_pending: false,
            halted: false,
            stop_requested: false,
            total_cycles: 0,
        }
    }

    /// Fetches, decodes and executes one instruction.
    /// Returns the number of T-cycles consumed.
    ///
    /// Decode errors are fatal: the PC and offending bytes are logged
    /// and returned; the CPU is left at the failing instruction.
    pub fn step(&mut self, bus: &mut Bus) -> CpuResult<u16> {
        if self.halted || self.stop_requested {
            self.total_cycles += IDLE_CYCLES as u64;
            return Ok(IDLE_CYCLES);
        }

        // A pending enable from EI commits after this instruction, on
        // every exit path.
        let enable_after = self.ei_pending;

        let pc = self.regs.pc;
        self.regs.refresh_r();

        let found = match decode::decode(self.regs.variant, bus, pc) {
            Ok(found) => found,
            Err(message) => {
                self.commit_ei(enable_after);
                log::error!("decode failed: {}", message);
                return Err(message);
            }
        };

        self.regs.pc = pc.wrapping_add(found.length as u16);
        let extra = self.execute(bus, &found);
        self.commit_ei(enable_after);

        let cycles = found.cycles as u16 + extra;
        self.total_cycles += cycles as u64;
        Ok(cycles)
    }

    #[inline(always)]
    fn commit_ei(&mut self, enable_after: bool) {
        // Still pending means the instruction was not DI (which cancels)
        // and interrupts come up now.
        if enable_after && self.ei_pending {
            self.iff1 = true;
            self.iff2 = true;
            self.ei_pending = false;
        }
    }

    /// Runs a subroutine to completion: a synthesized `CALL addr`, then
    /// stepping until PC returns to its pre-call value. Control returns
    /// to the host with the rest of the CPU state as the routine left it.
    pub fn call(&mut self, bus: &mut Bus, addr: u16) -> CpuResult<()> {
        let resume = self.regs.pc;
        self.push16(bus, resume);
        self.regs.pc = addr;
        while self.regs.pc != resume {
            self.step(bus)?;
        }
        Ok(())
    }

    /// Presents a maskable interrupt at an instruction boundary.
    ///
    /// Always wakes a halted or stopped CPU. If IFF1 is set the
    /// interrupt is accepted: IFF1/IFF2 clear, PC is pushed and control
    /// transfers to `vector` (an LR35902 service vector, or
    /// [`IM1_VECTOR`] for Z80 mode-1). Returns whether it was accepted.
    pub fn interrupt(&mut self, bus: &mut Bus, vector: u16) -> bool {
        self.halted = false;
        self.stop_requested = false;
        if !self.iff1 {
            return false;
        }
        self.iff1 = false;
        self.iff2 = false;
        self.ei_pending = false;
        let pc = self.regs.pc;
        self.push16(bus, pc);
        self.regs.pc = vector;
        self.total_cycles += INTERRUPT_CYCLES as u64;
        true
    }

    // --- Stack Operations ---
    #[inline(always)]
    pub(crate) fn push16(&mut self, bus: &mut Bus, value: u16) {
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, (value >> 8) as u8);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, (value & 0xFF) as u8);
    }

    #[inline(always)]
    pub(crate) fn pop16(&mut self, bus: &mut Bus) -> u16 {
        let low = bus.read8(self.regs.sp) as u16;
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let high = bus.read8(self.regs.sp) as u16;
        self.regs.sp = self.regs.sp.wrapping_add(1);
        (high << 8) | low
    }

    // --- Public Accessors ---
    #[inline(always)]
    pub fn variant(&self) -> Variant {
        self.regs.variant
    }
    #[inline(always)]
    pub fn a(&self) -> u8 {
        self.regs.a
    }
    #[inline(always)]
    pub fn f(&self) -> u8 {
        self.regs.f
    }
    #[inline(always)]
    pub fn b(&self) -> u8 {
        self.regs.b
    }
    #[inline(always)]
    pub fn c(&self) -> u8 {
        self.regs.c
    }
    #[inline(always)]
    pub fn d(&self) -> u8 {
        self.regs.d
    }
    #[inline(always)]
    pub fn e(&self) -> u8 {
        self.regs.e
    }
    #[inline(always)]
    pub fn h(&self) -> u8 {
        self.regs.h
    }
    #[inline(always)]
    pub fn l(&self) -> u8 {
        self.regs.l
    }
    #[inline(always)]
    pub fn i(&self) -> u8 {
        self.regs.i
    }
    #[inline(always)]
    pub fn r(&self) -> u8 {
        self.regs.r
    }
    #[inline(always)]
    pub fn sp(&self) -> u16 {
        self.regs.sp
    }
    #[inline(always)]
    pub fn pc(&self) -> u16 {
        self.regs.pc
    }
    #[inline(always)]
    pub fn pair(&self, pair: R16) -> u16 {
        self.regs.get_pair(pair)
    }
    #[inline(always)]
    pub fn flag(&self, flag: Flag) -> bool {
        self.regs.flag(flag)
    }
    #[inline(always)]
    pub fn iff1(&self) -> bool {
        self.iff1
    }
    #[inline(always)]
    pub fn iff2(&self) -> bool {
        self.iff2
    }
    #[inline(always)]
    pub fn halted(&self) -> bool {
        self.halted
    }
    #[inline(always)]
    pub fn stopped(&self) -> bool {
        self.stop_requested
    }
    #[inline(always)]
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    // --- Public Mutators ---
    #[inline(always)]
    pub fn set_pc(&mut self, value: u16) {
        self.regs.pc = value;
    }
    #[inline(always)]
    pub fn set_sp(&mut self, value: u16) {
        self.regs.sp = value;
    }
    #[inline(always)]
    pub fn set_a(&mut self, value: u8) {
        self.regs.a = value;
    }
}
