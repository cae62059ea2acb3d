//! Instruction-driven emulation cores for two sibling 8-bit CPUs, the
//! Zilog Z80 and the Sharp LR35902, coupled through an
//! address-dispatching data bus to address-mapped RAM and a Game Boy
//! pulse-channel APU that feeds an external audio sink.
//!
//! The host owns pacing: it steps the CPU instruction by instruction
//! (each step reports its cycle cost) and drives the APU's 256 Hz frame
//! clock. Nothing here touches a wall clock.

pub mod apu;
pub mod bus;
pub mod cpu;
pub mod memory_map;
pub mod ram;

pub use apu::Apu;
pub use apu::sink::{AudioSink, NullSink};
pub use bus::{Bus, Peripheral};
pub use cpu::{Cpu, CpuResult, Variant};
pub use ram::Ram;
