use std::cell::RefCell;
use std::rc::Rc;

use duet::cpu::{Flag, IM1_VECTOR, R16, VBLANK_VECTOR};
use duet::{Bus, Cpu, Ram, Variant};

const SEED: u64 = 0x0DD5_EED5;

/// A flat 64 KiB RAM machine: programs load at 0x0000, where PC starts.
fn machine(variant: Variant) -> (Cpu, Bus) {
    let mut bus = Bus::new();
    let ram = Rc::new(RefCell::new(Ram::new(0x0000, 0x1_0000)));
    bus.register(ram, 0x0000, 0xFFFF);
    (Cpu::with_seed(variant, SEED), bus)
}

fn load(bus: &mut Bus, address: u16, program: &[u8]) {
    for (index, byte) in program.iter().enumerate() {
        bus.write8(address + index as u16, *byte);
    }
}

fn run(cpu: &mut Cpu, bus: &mut Bus, steps: usize) {
    for _ in 0..steps {
        cpu.step(bus).expect("program must decode");
    }
}

// --- Loads and register file ---

#[test]
fn test_ld_immediate_then_register_copy() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    // LD B, 0x42; LD A, B
    load(&mut bus, 0x0000, &[0x06, 0x42, 0x78]);
    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.a(), 0x42);
    assert_eq!(cpu.b(), 0x42);
    assert_eq!(cpu.pc(), 0x0003);
}

#[test]
fn test_register_pair_coherence() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    // LD HL, 0xABCD
    load(&mut bus, 0x0000, &[0x21, 0xCD, 0xAB]);
    run(&mut cpu, &mut bus, 1);

    assert_eq!(cpu.pair(R16::HL), 0xABCD);
    assert_eq!(cpu.h(), 0xAB);
    assert_eq!(cpu.l(), 0xCD);
}

#[test]
fn test_pop_af_keeps_low_nibble_zero_on_lr35902() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    // LD SP, 0xD000; LD BC, 0x12FF; PUSH BC; POP AF
    load(
        &mut bus,
        0x0000,
        &[0x31, 0x00, 0xD0, 0x01, 0xFF, 0x12, 0xC5, 0xF1],
    );
    run(&mut cpu, &mut bus, 4);

    assert_eq!(cpu.a(), 0x12);
    assert_eq!(cpu.f(), 0xF0);
    assert_eq!(cpu.f() & 0x0F, 0);
}

#[test]
fn test_ld_hl_post_increment() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    // LD HL, 0xC000; LD A, 0x77; LD (HL+), A
    load(&mut bus, 0x0000, &[0x21, 0x00, 0xC0, 0x3E, 0x77, 0x22]);
    run(&mut cpu, &mut bus, 3);

    assert_eq!(bus.read8(0xC000), 0x77);
    assert_eq!(cpu.pair(R16::HL), 0xC001);
}

#[test]
fn test_ld_hl_post_decrement() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    // LD HL, 0xC000; LD A, 0x55; LD (HL-), A; LD A, (HL+)
    load(&mut bus, 0x0000, &[0x21, 0x00, 0xC0, 0x3E, 0x55, 0x32, 0x2A]);
    run(&mut cpu, &mut bus, 3);

    assert_eq!(bus.read8(0xC000), 0x55);
    assert_eq!(cpu.pair(R16::HL), 0xBFFF);
}

#[test]
fn test_ldh_reaches_the_high_page() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    // LD A, 0x5A; LDH (0x80), A; LDH A, (0x80) -> round trip via 0xFF80
    load(&mut bus, 0x0000, &[0x3E, 0x5A, 0xE0, 0x80, 0xF0, 0x80]);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(bus.read8(0xFF80), 0x5A);

    bus.write8(0xFF80, 0xA5);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.a(), 0xA5);
}

#[test]
fn test_ld_at_c_uses_the_high_page() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    // LD C, 0x90; LD A, 0x33; LD (C), A
    load(&mut bus, 0x0000, &[0x0E, 0x90, 0x3E, 0x33, 0xE2]);
    run(&mut cpu, &mut bus, 3);

    assert_eq!(bus.read8(0xFF90), 0x33);
}

#[test]
fn test_ld_direct_word_stores_sp() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    // LD SP, 0xBEEF; LD (0xC080), SP
    load(&mut bus, 0x0000, &[0x31, 0xEF, 0xBE, 0x08, 0x80, 0xC0]);
    run(&mut cpu, &mut bus, 2);

    assert_eq!(bus.read16(0xC080), 0xBEEF);
}

// --- Flags ---

#[test]
fn test_dec_without_half_borrow() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    // LD B, 0x01; DEC B
    load(&mut bus, 0x0000, &[0x06, 0x01, 0x05]);
    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.b(), 0x00);
    assert!(cpu.flag(Flag::Z));
    assert!(cpu.flag(Flag::N));
    assert!(!cpu.flag(Flag::H));
}

#[test]
fn test_dec_with_half_borrow() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    // LD B, 0x10; DEC B
    load(&mut bus, 0x0000, &[0x06, 0x10, 0x05]);
    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.b(), 0x0F);
    assert!(!cpu.flag(Flag::Z));
    assert!(cpu.flag(Flag::N));
    assert!(cpu.flag(Flag::H));
}

#[test]
fn test_inc_half_carry() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    // LD B, 0x0F; INC B
    load(&mut bus, 0x0000, &[0x06, 0x0F, 0x04]);
    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.b(), 0x10);
    assert!(!cpu.flag(Flag::Z));
    assert!(!cpu.flag(Flag::N));
    assert!(cpu.flag(Flag::H));
}

#[test]
fn test_flags_project_onto_f_bits() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    // LD B, 0x01; DEC B -> Z and N set, H clear
    load(&mut bus, 0x0000, &[0x06, 0x01, 0x05]);
    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.flag(Flag::Z), cpu.f() & 0x80 != 0);
    assert_eq!(cpu.flag(Flag::N), cpu.f() & 0x40 != 0);
    assert_eq!(cpu.flag(Flag::H), cpu.f() & 0x20 != 0);
    assert_eq!(cpu.flag(Flag::C), cpu.f() & 0x10 != 0);
}

#[test]
fn test_add_sp_carry_chain_is_low_byte_only() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    // LD SP, 0xFFF8; ADD SP, 8
    load(&mut bus, 0x0000, &[0x31, 0xF8, 0xFF, 0xE8, 0x08]);
    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.sp(), 0x0000);
    assert!(!cpu.flag(Flag::Z));
    assert!(!cpu.flag(Flag::N));
    assert!(cpu.flag(Flag::H));
    assert!(cpu.flag(Flag::C));
}

#[test]
fn test_add_sp_negative_offset_flags() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    // LD SP, 0xD000; ADD SP, -2. The carry chain sees 0x00 + 0xFE, so
    // neither H nor C sets even though SP numerically decreases.
    load(&mut bus, 0x0000, &[0x31, 0x00, 0xD0, 0xE8, 0xFE]);
    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.sp(), 0xCFFE);
    assert!(!cpu.flag(Flag::H));
    assert!(!cpu.flag(Flag::C));
}

#[test]
fn test_ld_hl_sp_plus_offset() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    // LD SP, 0xFFF8; LD HL, SP+8
    load(&mut bus, 0x0000, &[0x31, 0xF8, 0xFF, 0xF8, 0x08]);
    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.pair(R16::HL), 0x0000);
    assert_eq!(cpu.sp(), 0xFFF8);
    assert!(cpu.flag(Flag::H));
    assert!(cpu.flag(Flag::C));
}

// --- Control flow and cycles ---

#[test]
fn test_conditional_branch_cycle_costs() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    // LD A, 0x00; CP 0x01; JR Z, +2 (not taken); JR +0 (taken)
    load(
        &mut bus,
        0x0000,
        &[0x3E, 0x00, 0xFE, 0x01, 0x28, 0x02, 0x18, 0x00],
    );

    assert_eq!(cpu.step(&mut bus).unwrap(), 8);
    assert_eq!(cpu.step(&mut bus).unwrap(), 8);
    assert_eq!(cpu.step(&mut bus).unwrap(), 8); // JR Z falls through
    assert_eq!(cpu.step(&mut bus).unwrap(), 12); // unconditional JR jumps
    assert_eq!(cpu.pc(), 0x0008);
}

#[test]
fn test_call_and_ret() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    // LD SP, 0xD000; CALL 0x0200 / at 0x0200: LD B, 0x77; RET
    load(&mut bus, 0x0000, &[0x31, 0x00, 0xD0, 0xCD, 0x00, 0x02]);
    load(&mut bus, 0x0200, &[0x06, 0x77, 0xC9]);

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.step(&mut bus).unwrap(), 24); // CALL
    assert_eq!(cpu.pc(), 0x0200);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.step(&mut bus).unwrap(), 16); // RET
    assert_eq!(cpu.pc(), 0x0006);
    assert_eq!(cpu.b(), 0x77);
    assert_eq!(cpu.sp(), 0xD000);
}

#[test]
fn test_call_helper_runs_routine_to_completion() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    cpu.set_sp(0xD000);
    cpu.set_pc(0x0100);
    // 0x0300: LD A, 0x99; RET
    load(&mut bus, 0x0300, &[0x3E, 0x99, 0xC9]);

    cpu.call(&mut bus, 0x0300).unwrap();

    assert_eq!(cpu.a(), 0x99);
    assert_eq!(cpu.pc(), 0x0100);
    assert_eq!(cpu.sp(), 0xD000);
}

#[test]
fn test_rst_jumps_to_vector() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    // LD SP, 0xD000; RST 28H
    load(&mut bus, 0x0000, &[0x31, 0x00, 0xD0, 0xEF]);
    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.pc(), 0x0028);
    assert_eq!(bus.read16(0xCFFE), 0x0004);
}

// --- Interrupt enable deferral and interrupts ---

#[test]
fn test_ei_takes_effect_one_instruction_late() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    // EI; NOP
    load(&mut bus, 0x0000, &[0xFB, 0x00]);

    run(&mut cpu, &mut bus, 1);
    assert!(!cpu.iff1());
    run(&mut cpu, &mut bus, 1);
    assert!(cpu.iff1());
    assert!(cpu.iff2());
}

#[test]
fn test_di_cancels_pending_ei() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    // EI; DI; NOP
    load(&mut bus, 0x0000, &[0xFB, 0xF3, 0x00]);
    run(&mut cpu, &mut bus, 3);

    assert!(!cpu.iff1());
    assert!(!cpu.iff2());
}

#[test]
fn test_reti_returns_and_enables_interrupts() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    // LD SP, 0xD000; LD HL, 0x0200; PUSH HL; RETI
    load(
        &mut bus,
        0x0000,
        &[0x31, 0x00, 0xD0, 0x21, 0x00, 0x02, 0xE5, 0xD9],
    );
    run(&mut cpu, &mut bus, 4);

    assert_eq!(cpu.pc(), 0x0200);
    assert!(cpu.iff1());
    assert!(cpu.iff2());
}

#[test]
fn test_interrupt_accepted_when_enabled() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    // LD SP, 0xD000; EI; NOP
    load(&mut bus, 0x0000, &[0x31, 0x00, 0xD0, 0xFB, 0x00]);
    run(&mut cpu, &mut bus, 3);
    assert!(cpu.iff1());

    assert!(cpu.interrupt(&mut bus, VBLANK_VECTOR));
    assert_eq!(cpu.pc(), VBLANK_VECTOR);
    assert_eq!(bus.read16(0xCFFE), 0x0005);
    assert!(!cpu.iff1());
}

#[test]
fn test_interrupt_refused_when_disabled_but_wakes_halt() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    // HALT
    load(&mut bus, 0x0000, &[0x76]);
    run(&mut cpu, &mut bus, 1);
    assert!(cpu.halted());
    assert_eq!(cpu.step(&mut bus).unwrap(), 4);
    assert_eq!(cpu.pc(), 0x0001);

    assert!(!cpu.interrupt(&mut bus, VBLANK_VECTOR));
    assert!(!cpu.halted());
}

#[test]
fn test_stop_idles_the_core() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    // STOP
    load(&mut bus, 0x0000, &[0x10, 0x00]);
    run(&mut cpu, &mut bus, 1);

    assert!(cpu.stopped());
    assert_eq!(cpu.step(&mut bus).unwrap(), 4);
    assert_eq!(cpu.pc(), 0x0002);
}

// --- CB page ---

#[test]
fn test_swap_nibbles() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    // LD B, 0xAB; SWAP B
    load(&mut bus, 0x0000, &[0x06, 0xAB, 0xCB, 0x30]);
    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.b(), 0xBA);
    assert!(!cpu.flag(Flag::Z));
    assert!(!cpu.flag(Flag::C));
}

#[test]
fn test_bit_test_sets_zero_from_bit() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    // LD B, 0x80; BIT 7, B; BIT 0, B
    load(&mut bus, 0x0000, &[0x06, 0x80, 0xCB, 0x78, 0xCB, 0x40]);
    run(&mut cpu, &mut bus, 2);
    assert!(!cpu.flag(Flag::Z));
    assert!(cpu.flag(Flag::H));
    assert!(!cpu.flag(Flag::N));

    run(&mut cpu, &mut bus, 1);
    assert!(cpu.flag(Flag::Z));
}

#[test]
fn test_set_through_hl_pointer() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    // LD HL, 0xC000; LD (HL), 0x00; SET 0, (HL)
    load(
        &mut bus,
        0x0000,
        &[0x21, 0x00, 0xC0, 0x36, 0x00, 0xCB, 0xC6],
    );
    run(&mut cpu, &mut bus, 3);

    assert_eq!(bus.read8(0xC000), 0x01);
}

// --- Construction and errors ---

#[test]
fn test_power_on_state() {
    let cpu = Cpu::with_seed(Variant::Lr35902, SEED);
    assert_eq!(cpu.a(), 0xFF);
    assert_eq!(cpu.f(), 0xF0); // low nibble hard-wired zero
    assert_eq!(cpu.sp(), 0xFFFF);
    assert_eq!(cpu.pc(), 0x0000);
    assert!(!cpu.iff1());

    let z80 = Cpu::with_seed(Variant::Z80, SEED);
    assert_eq!(z80.f(), 0xFF);

    // Same seed, same scramble.
    let twin = Cpu::with_seed(Variant::Lr35902, SEED);
    assert_eq!(cpu.b(), twin.b());
    assert_eq!(cpu.c(), twin.c());
    assert_eq!(cpu.h(), twin.h());
}

#[test]
fn test_unrecognized_opcode_is_a_fatal_decode_error() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    // 0xD3 has no meaning on the LR35902.
    load(&mut bus, 0x0000, &[0xD3]);

    let error = cpu.step(&mut bus).unwrap_err();
    assert!(error.contains("0xD3"), "missing opcode in: {}", error);
    assert!(error.contains("0x0000"), "missing PC in: {}", error);
    assert_eq!(cpu.pc(), 0x0000);
}

#[test]
fn test_refresh_register_counts_fetches() {
    let (mut cpu, mut bus) = machine(Variant::Lr35902);
    load(&mut bus, 0x0000, &[0x00, 0x00, 0x00]);
    run(&mut cpu, &mut bus, 3);

    assert_eq!(cpu.r(), 3);
}

// --- Z80 variant ---

#[test]
fn test_z80_swap_slot_is_a_decode_error() {
    let (mut cpu, mut bus) = machine(Variant::Z80);
    load(&mut bus, 0x0000, &[0xCB, 0x30]);

    let error = cpu.step(&mut bus).unwrap_err();
    assert!(error.contains("0xCB"), "missing prefix in: {}", error);
}

#[test]
fn test_z80_dec_reports_overflow_and_sign() {
    let (mut cpu, mut bus) = machine(Variant::Z80);
    // LD B, 0x80; DEC B
    load(&mut bus, 0x0000, &[0x06, 0x80, 0x05]);
    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.b(), 0x7F);
    assert!(cpu.flag(Flag::PV)); // 0x80 -> 0x7F overflows
    assert!(!cpu.flag(Flag::S));
    assert!(cpu.flag(Flag::N));
    assert!(cpu.flag(Flag::H));
}

#[test]
fn test_z80_logic_sets_parity() {
    let (mut cpu, mut bus) = machine(Variant::Z80);
    // LD A, 0x03; AND 0x03 (two bits, even); LD A, 0x07; AND 0x07 (odd)
    load(&mut bus, 0x0000, &[0x3E, 0x03, 0xE6, 0x03, 0x3E, 0x07, 0xE6, 0x07]);
    run(&mut cpu, &mut bus, 2);
    assert!(cpu.flag(Flag::PV));

    run(&mut cpu, &mut bus, 2);
    assert!(!cpu.flag(Flag::PV));
}

#[test]
fn test_z80_parity_flag_projects_onto_bit_2() {
    let (mut cpu, mut bus) = machine(Variant::Z80);
    load(&mut bus, 0x0000, &[0x3E, 0x03, 0xE6, 0x03]);
    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.flag(Flag::PV), cpu.f() & 0x04 != 0);
    assert_eq!(cpu.flag(Flag::Z), cpu.f() & 0x40 != 0);
    assert_eq!(cpu.flag(Flag::C), cpu.f() & 0x01 != 0);
}

#[test]
fn test_z80_exx_swaps_the_shadow_set() {
    let (mut cpu, mut bus) = machine(Variant::Z80);
    // LD BC, 0x1111; EXX; LD BC, 0x2222; EXX
    load(
        &mut bus,
        0x0000,
        &[0x01, 0x11, 0x11, 0xD9, 0x01, 0x22, 0x22, 0xD9],
    );
    run(&mut cpu, &mut bus, 4);

    assert_eq!(cpu.pair(R16::BC), 0x1111);
}

#[test]
fn test_z80_ex_af_swaps_accumulator_and_flags() {
    let (mut cpu, mut bus) = machine(Variant::Z80);
    // LD A, 0x12; EX AF, AF'; LD A, 0x34; EX AF, AF'
    load(&mut bus, 0x0000, &[0x3E, 0x12, 0x08, 0x3E, 0x34, 0x08]);
    run(&mut cpu, &mut bus, 4);

    assert_eq!(cpu.a(), 0x12);
}

#[test]
fn test_z80_ex_de_hl() {
    let (mut cpu, mut bus) = machine(Variant::Z80);
    // LD HL, 0x1234; LD DE, 0x5678; EX DE, HL
    load(
        &mut bus,
        0x0000,
        &[0x21, 0x34, 0x12, 0x11, 0x78, 0x56, 0xEB],
    );
    run(&mut cpu, &mut bus, 3);

    assert_eq!(cpu.pair(R16::HL), 0x5678);
    assert_eq!(cpu.pair(R16::DE), 0x1234);
}

#[test]
fn test_z80_ex_sp_hl() {
    let (mut cpu, mut bus) = machine(Variant::Z80);
    // LD SP, 0xD000; LD HL, 0x1234; EX (SP), HL
    load(&mut bus, 0x0000, &[0x31, 0x00, 0xD0, 0x21, 0x34, 0x12, 0xE3]);
    bus.write16(0xD000, 0x9ABC);
    run(&mut cpu, &mut bus, 3);

    assert_eq!(cpu.pair(R16::HL), 0x9ABC);
    assert_eq!(bus.read16(0xD000), 0x1234);
}

#[test]
fn test_z80_block_move_ldi() {
    let (mut cpu, mut bus) = machine(Variant::Z80);
    // LD HL, 0xC000; LD DE, 0xC100; LD BC, 0x0002; LDI; LDI
    load(
        &mut bus,
        0x0000,
        &[
            0x21, 0x00, 0xC0, 0x11, 0x00, 0xC1, 0x01, 0x02, 0x00, 0xED, 0xA0, 0xED, 0xA0,
        ],
    );
    bus.write8(0xC000, 0xAA);
    bus.write8(0xC001, 0xBB);

    run(&mut cpu, &mut bus, 4);
    assert_eq!(bus.read8(0xC100), 0xAA);
    assert_eq!(cpu.pair(R16::HL), 0xC001);
    assert_eq!(cpu.pair(R16::DE), 0xC101);
    assert_eq!(cpu.pair(R16::BC), 0x0001);
    assert!(cpu.flag(Flag::PV)); // BC still nonzero
    assert!(!cpu.flag(Flag::N));
    assert!(!cpu.flag(Flag::H));

    run(&mut cpu, &mut bus, 1);
    assert_eq!(bus.read8(0xC101), 0xBB);
    assert_eq!(cpu.pair(R16::BC), 0x0000);
    assert!(!cpu.flag(Flag::PV));
}

#[test]
fn test_z80_ldir_repeats_until_bc_zero() {
    let (mut cpu, mut bus) = machine(Variant::Z80);
    // LD HL, 0xC000; LD DE, 0xC100; LD BC, 0x0003; LDIR
    load(
        &mut bus,
        0x0000,
        &[0x21, 0x00, 0xC0, 0x11, 0x00, 0xC1, 0x01, 0x03, 0x00, 0xED, 0xB0],
    );
    bus.write8(0xC000, 0x01);
    bus.write8(0xC001, 0x02);
    bus.write8(0xC002, 0x03);

    // Each step performs one move; the instruction rewinds PC while BC
    // is nonzero.
    run(&mut cpu, &mut bus, 3 + 3);
    assert_eq!(bus.read8(0xC100), 0x01);
    assert_eq!(bus.read8(0xC101), 0x02);
    assert_eq!(bus.read8(0xC102), 0x03);
    assert_eq!(cpu.pair(R16::BC), 0x0000);
    assert_eq!(cpu.pc(), 0x000B);
}

#[test]
fn test_z80_djnz_loops_on_b() {
    let (mut cpu, mut bus) = machine(Variant::Z80);
    // LD B, 0x03; DJNZ -2 (to itself)
    load(&mut bus, 0x0000, &[0x06, 0x03, 0x10, 0xFE]);

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.step(&mut bus).unwrap(), 13); // taken
    assert_eq!(cpu.pc(), 0x0002);
    assert_eq!(cpu.step(&mut bus).unwrap(), 13); // taken
    assert_eq!(cpu.step(&mut bus).unwrap(), 8); // falls through
    assert_eq!(cpu.b(), 0x00);
    assert_eq!(cpu.pc(), 0x0004);
}

#[test]
fn test_z80_parity_conditional_jump() {
    let (mut cpu, mut bus) = machine(Variant::Z80);
    // LD A, 0x03; AND 0x03 (even parity); JP PE, 0x0200
    load(&mut bus, 0x0000, &[0x3E, 0x03, 0xE6, 0x03, 0xEA, 0x00, 0x02]);
    run(&mut cpu, &mut bus, 3);

    assert_eq!(cpu.pc(), 0x0200);
}

#[test]
fn test_z80_rlca_preserves_zero_flag() {
    let (mut cpu, mut bus) = machine(Variant::Z80);
    // XOR A (sets Z); RLCA
    load(&mut bus, 0x0000, &[0xAF, 0x07]);
    run(&mut cpu, &mut bus, 2);
    assert!(cpu.flag(Flag::Z));

    // The LR35902 clears Z on RLCA.
    let (mut gb, mut gb_bus) = machine(Variant::Lr35902);
    load(&mut gb_bus, 0x0000, &[0xAF, 0x07]);
    run(&mut gb, &mut gb_bus, 2);
    assert!(!gb.flag(Flag::Z));
}

#[test]
fn test_z80_io_opcodes_are_decode_errors() {
    let (mut cpu, mut bus) = machine(Variant::Z80);
    load(&mut bus, 0x0000, &[0xDB, 0x10]);

    assert!(cpu.step(&mut bus).is_err());
}

#[test]
fn test_z80_im1_interrupt_vector() {
    let (mut cpu, mut bus) = machine(Variant::Z80);
    // LD SP, 0xD000; EI; NOP
    load(&mut bus, 0x0000, &[0x31, 0x00, 0xD0, 0xFB, 0x00]);
    run(&mut cpu, &mut bus, 3);

    assert!(cpu.interrupt(&mut bus, IM1_VECTOR));
    assert_eq!(cpu.pc(), 0x0038);
}
