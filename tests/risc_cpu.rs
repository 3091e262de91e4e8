//! End-to-end scenarios for the primary RISC core, driven only through
//! `RiscCpu`'s public API plus a bus it owns nothing about.

use intuition_engine::memory::Bus;
use intuition_engine::risc::{Fault, RiscCpu, StatusFlags, FAULT_VECTOR};

fn encode(opcode: u8, rd: u8, rs1: u8, rs2_or_imm: u8, imm: i32) -> [u8; 8] {
    let mut word = [0u8; 8];
    word[0] = opcode;
    word[1] = rd;
    word[2] = rs1;
    word[3] = rs2_or_imm;
    word[4..8].copy_from_slice(&imm.to_le_bytes());
    word
}

fn load(bus: &mut Bus, words: &[[u8; 8]]) {
    for (i, word) in words.iter().enumerate() {
        bus.load_bytes((i as u32) * 8, word);
    }
}

#[test]
fn add_with_carry_end_to_end_scenario() {
    let mut bus = Bus::new(1 << 16, 0xf000);
    let mut cpu = RiscCpu::new();
    load(
        &mut bus,
        &[
            encode(0x02, 1, 0, 0, -1),
            encode(0x02, 2, 0, 0, 1),
            encode(0x05, 3, 1, 2, 0),
        ],
    );
    for _ in 0..3 {
        cpu.step(&mut bus);
    }
    assert_eq!(cpu.register(3), 0);
    assert!(cpu.status.contains(StatusFlags::CARRY));
    assert!(cpu.status.contains(StatusFlags::ZERO));
}

#[test]
fn r0_is_hardwired_zero_across_writes_and_arithmetic() {
    let mut bus = Bus::new(1 << 16, 0xf000);
    let mut cpu = RiscCpu::new();
    load(&mut bus, &[encode(0x02, 0, 0, 0, 1234), encode(0x05, 0, 0, 0, 0)]);
    cpu.step(&mut bus);
    assert_eq!(cpu.register(0), 0);
    cpu.step(&mut bus);
    assert_eq!(cpu.register(0), 0);
}

#[test]
fn divide_by_zero_faults_without_corrupting_further_execution() {
    let mut bus = Bus::new(1 << 16, 0xf000);
    let mut cpu = RiscCpu::new();
    load(
        &mut bus,
        &[encode(0x02, 1, 0, 0, 5), encode(0x02, 2, 0, 0, 0), encode(0x10, 3, 1, 2, 0)],
    );
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    assert_eq!(cpu.last_fault, Some(Fault::DivideByZero));
    assert_eq!(cpu.pc, FAULT_VECTOR);
}

#[test]
fn byte_store_then_sign_extended_byte_load_round_trips_a_negative_value() {
    let mut bus = Bus::new(1 << 16, 0xf000);
    let mut cpu = RiscCpu::new();
    load(
        &mut bus,
        &[
            encode(0x02, 1, 0, 0, 0x2000), // LOADI R1, 0x2000 (base address)
            encode(0x02, 2, 0, 0, 0xff),   // LOADI R2, 0xff
            encode(0x23, 2, 1, 0, 0),      // STOREB [R1], R2
            encode(0x1e, 3, 1, 0, 0),      // LOADBS R3, [R1]
        ],
    );
    for _ in 0..4 {
        cpu.step(&mut bus);
    }
    assert_eq!(cpu.register(3) as i64, -1);
}

#[test]
fn signed_division_truncates_toward_zero() {
    let mut bus = Bus::new(1 << 16, 0xf000);
    let mut cpu = RiscCpu::new();
    load(
        &mut bus,
        &[
            encode(0x02, 1, 0, 0, -10), // LOADI R1, -10
            encode(0x02, 2, 0, 0, 3),   // LOADI R2, 3
            encode(0x29, 3, 1, 2, 0),   // DIVS R3, R1, R2
        ],
    );
    for _ in 0..3 {
        cpu.step(&mut bus);
    }
    assert_eq!(cpu.register(3) as i64, -3);
}

#[test]
fn compound_branch_predicates_match_signed_and_unsigned_relational_outcome() {
    let mut bus = Bus::new(1 << 16, 0xf000);
    let mut cpu = RiscCpu::new();
    load(
        &mut bus,
        &[
            encode(0x02, 1, 0, 0, 5),   // addr 0:  LOADI R1, 5
            encode(0x02, 2, 0, 0, 10),  // addr 8:  LOADI R2, 10
            encode(0x11, 1, 2, 0, 0),   // addr 16: CMP R1, R2  (5 - 10: N=1, V=0, C=1)
            encode(0x2d, 0, 0, 0, 200), // addr 24: JSLT 200    (5 < 10 signed -> taken)
        ],
    );
    for _ in 0..4 {
        cpu.step(&mut bus);
    }
    assert_eq!(cpu.pc, 200); // signed-less-than branch was taken

    let mut bus = Bus::new(1 << 16, 0xf000);
    let mut cpu = RiscCpu::new();
    load(
        &mut bus,
        &[
            encode(0x02, 1, 0, 0, 5),
            encode(0x02, 2, 0, 0, 10),
            encode(0x11, 1, 2, 0, 0),
            encode(0x34, 0, 0, 0, 200), // JUGT 200 (5 > 10 unsigned -> not taken)
        ],
    );
    for _ in 0..4 {
        cpu.step(&mut bus);
    }
    assert_eq!(cpu.pc, 32); // fell through to the next instruction instead
}

#[test]
fn trap_then_rti_restores_pc_and_status() {
    let mut bus = Bus::new(1 << 16, 0xf000);
    let mut cpu = RiscCpu::new();
    cpu.reset(0);
    cpu.status.insert(StatusFlags::IRQ_ENABLE);
    load(
        &mut bus,
        &[
            encode(0x02, 31, 0, 0, 0x1000), // addr 0:  LOADI SP, 0x1000
            encode(0x1c, 0, 0, 0, 0),       // addr 8:  TRAP; return address = 16
        ],
    );
    bus.load_bytes(intuition_engine::risc::TRAP_VECTOR, &encode(0x36, 0, 0, 0, 0)); // RTI
    cpu.step(&mut bus); // LOADI SP
    cpu.step(&mut bus); // TRAP -> pc = TRAP_VECTOR, IRQ_ENABLE cleared
    assert_eq!(cpu.pc, intuition_engine::risc::TRAP_VECTOR);
    assert!(!cpu.status.contains(StatusFlags::IRQ_ENABLE));
    cpu.step(&mut bus); // RTI -> pc = 16, IRQ_ENABLE restored
    assert_eq!(cpu.pc, 16);
    assert!(cpu.status.contains(StatusFlags::IRQ_ENABLE));
}

#[test]
fn call_and_ret_round_trip_the_return_address() {
    let mut bus = Bus::new(1 << 16, 0xf000);
    let mut cpu = RiscCpu::new();
    cpu.reset(0);
    // R31 is the stack pointer; seed it well above the tiny program.
    load(
        &mut bus,
        &[
            encode(0x02, 31, 0, 0, 0x1000), // addr 0: LOADI SP, 0x1000
            encode(0x17, 0, 0, 0, 100),     // addr 8: CALL 100; return address = 16
        ],
    );
    bus.load_bytes(100, &encode(0x18, 0, 0, 0, 0)); // addr 100: RET
    cpu.step(&mut bus); // LOADI SP
    cpu.step(&mut bus); // CALL -> pc = 100
    assert_eq!(cpu.pc, 100);
    cpu.step(&mut bus); // RET -> pc = return address (16)
    assert_eq!(cpu.pc, 16);
}
