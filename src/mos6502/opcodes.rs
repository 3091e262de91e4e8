//! Opcode-indexed decode table, adapted from RustyNES's `OPCODE_TABLE`:
//! same idea (one static array keyed by the raw opcode byte, yielding
//! addressing mode and baseline cycle count), restricted to the official
//! opcode set — undefined opcodes decode as [`Mnemonic::Jam`], which halts
//! the CPU the way RustyNES's illegal JAM/KIL opcodes do.

use super::addressing::AddressingMode as Mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
    Lda, Ldx, Ldy, Sta, Stx, Sty,
    Tax, Tay, Txa, Tya, Tsx, Txs,
    Pha, Php, Pla, Plp,
    Adc, Sbc,
    Inc, Dec, Inx, Iny, Dex, Dey,
    And, Ora, Eor, Bit,
    Asl, Lsr, Rol, Ror,
    Cmp, Cpx, Cpy,
    Bpl, Bmi, Bvc, Bvs, Bcc, Bcs, Bne, Beq,
    Jmp, Jsr, Rts, Rti, Brk,
    Clc, Sec, Cli, Sei, Clv, Cld, Sed,
    Nop,
    Jam,
}

#[derive(Debug, Clone, Copy)]
pub struct OpcodeInfo {
    pub mnemonic: Mnemonic,
    pub mode: Mode,
    pub cycles: u8,
}

const JAM: OpcodeInfo = OpcodeInfo { mnemonic: Mnemonic::Jam, mode: Mode::Implied, cycles: 2 };

const fn op(mnemonic: Mnemonic, mode: Mode, cycles: u8) -> OpcodeInfo {
    OpcodeInfo { mnemonic, mode, cycles }
}

const fn build_table() -> [OpcodeInfo; 256] {
    use Mnemonic::*;
    use Mode::*;
    let mut t = [JAM; 256];
    t[0x00] = op(Brk, Implied, 7);
    t[0x01] = op(Ora, IndirectX, 6);
    t[0x05] = op(Ora, ZeroPage, 3);
    t[0x06] = op(Asl, ZeroPage, 5);
    t[0x08] = op(Php, Implied, 3);
    t[0x09] = op(Ora, Immediate, 2);
    t[0x0a] = op(Asl, Accumulator, 2);
    t[0x0d] = op(Ora, Absolute, 4);
    t[0x0e] = op(Asl, Absolute, 6);
    t[0x10] = op(Bpl, Relative, 2);
    t[0x11] = op(Ora, IndirectY, 5);
    t[0x15] = op(Ora, ZeroPageX, 4);
    t[0x16] = op(Asl, ZeroPageX, 6);
    t[0x18] = op(Clc, Implied, 2);
    t[0x19] = op(Ora, AbsoluteY, 4);
    t[0x1d] = op(Ora, AbsoluteX, 4);
    t[0x1e] = op(Asl, AbsoluteX, 7);
    t[0x20] = op(Jsr, Absolute, 6);
    t[0x21] = op(And, IndirectX, 6);
    t[0x24] = op(Bit, ZeroPage, 3);
    t[0x25] = op(And, ZeroPage, 3);
    t[0x26] = op(Rol, ZeroPage, 5);
    t[0x28] = op(Plp, Implied, 4);
    t[0x29] = op(And, Immediate, 2);
    t[0x2a] = op(Rol, Accumulator, 2);
    t[0x2c] = op(Bit, Absolute, 4);
    t[0x2d] = op(And, Absolute, 4);
    t[0x2e] = op(Rol, Absolute, 6);
    t[0x30] = op(Bmi, Relative, 2);
    t[0x31] = op(And, IndirectY, 5);
    t[0x35] = op(And, ZeroPageX, 4);
    t[0x36] = op(Rol, ZeroPageX, 6);
    t[0x38] = op(Sec, Implied, 2);
    t[0x39] = op(And, AbsoluteY, 4);
    t[0x3d] = op(And, AbsoluteX, 4);
    t[0x3e] = op(Rol, AbsoluteX, 7);
    t[0x40] = op(Rti, Implied, 6);
    t[0x41] = op(Eor, IndirectX, 6);
    t[0x45] = op(Eor, ZeroPage, 3);
    t[0x46] = op(Lsr, ZeroPage, 5);
    t[0x48] = op(Pha, Implied, 3);
    t[0x49] = op(Eor, Immediate, 2);
    t[0x4a] = op(Lsr, Accumulator, 2);
    t[0x4c] = op(Jmp, Absolute, 3);
    t[0x4d] = op(Eor, Absolute, 4);
    t[0x4e] = op(Lsr, Absolute, 6);
    t[0x50] = op(Bvc, Relative, 2);
    t[0x51] = op(Eor, IndirectY, 5);
    t[0x55] = op(Eor, ZeroPageX, 4);
    t[0x56] = op(Lsr, ZeroPageX, 6);
    t[0x58] = op(Cli, Implied, 2);
    t[0x59] = op(Eor, AbsoluteY, 4);
    t[0x5d] = op(Eor, AbsoluteX, 4);
    t[0x5e] = op(Lsr, AbsoluteX, 7);
    t[0x60] = op(Rts, Implied, 6);
    t[0x61] = op(Adc, IndirectX, 6);
    t[0x65] = op(Adc, ZeroPage, 3);
    t[0x66] = op(Ror, ZeroPage, 5);
    t[0x68] = op(Pla, Implied, 4);
    t[0x69] = op(Adc, Immediate, 2);
    t[0x6a] = op(Ror, Accumulator, 2);
    t[0x6c] = op(Jmp, Indirect, 5);
    t[0x6d] = op(Adc, Absolute, 4);
    t[0x6e] = op(Ror, Absolute, 6);
    t[0x70] = op(Bvs, Relative, 2);
    t[0x71] = op(Adc, IndirectY, 5);
    t[0x75] = op(Adc, ZeroPageX, 4);
    t[0x76] = op(Ror, ZeroPageX, 6);
    t[0x78] = op(Sei, Implied, 2);
    t[0x79] = op(Adc, AbsoluteY, 4);
    t[0x7d] = op(Adc, AbsoluteX, 4);
    t[0x7e] = op(Ror, AbsoluteX, 7);
    t[0x81] = op(Sta, IndirectX, 6);
    t[0x84] = op(Sty, ZeroPage, 3);
    t[0x85] = op(Sta, ZeroPage, 3);
    t[0x86] = op(Stx, ZeroPage, 3);
    t[0x88] = op(Dey, Implied, 2);
    t[0x8a] = op(Txa, Implied, 2);
    t[0x8c] = op(Sty, Absolute, 4);
    t[0x8d] = op(Sta, Absolute, 4);
    t[0x8e] = op(Stx, Absolute, 4);
    t[0x90] = op(Bcc, Relative, 2);
    t[0x91] = op(Sta, IndirectY, 6);
    t[0x94] = op(Sty, ZeroPageX, 4);
    t[0x95] = op(Sta, ZeroPageX, 4);
    t[0x96] = op(Stx, ZeroPageY, 4);
    t[0x98] = op(Tya, Implied, 2);
    t[0x99] = op(Sta, AbsoluteY, 5);
    t[0x9a] = op(Txs, Implied, 2);
    t[0x9d] = op(Sta, AbsoluteX, 5);
    t[0xa0] = op(Ldy, Immediate, 2);
    t[0xa1] = op(Lda, IndirectX, 6);
    t[0xa2] = op(Ldx, Immediate, 2);
    t[0xa4] = op(Ldy, ZeroPage, 3);
    t[0xa5] = op(Lda, ZeroPage, 3);
    t[0xa6] = op(Ldx, ZeroPage, 3);
    t[0xa8] = op(Tay, Implied, 2);
    t[0xa9] = op(Lda, Immediate, 2);
    t[0xaa] = op(Tax, Implied, 2);
    t[0xac] = op(Ldy, Absolute, 4);
    t[0xad] = op(Lda, Absolute, 4);
    t[0xae] = op(Ldx, Absolute, 4);
    t[0xb0] = op(Bcs, Relative, 2);
    t[0xb1] = op(Lda, IndirectY, 5);
    t[0xb4] = op(Ldy, ZeroPageX, 4);
    t[0xb5] = op(Lda, ZeroPageX, 4);
    t[0xb6] = op(Ldx, ZeroPageY, 4);
    t[0xb8] = op(Clv, Implied, 2);
    t[0xb9] = op(Lda, AbsoluteY, 4);
    t[0xba] = op(Tsx, Implied, 2);
    t[0xbc] = op(Ldy, AbsoluteX, 4);
    t[0xbd] = op(Lda, AbsoluteX, 4);
    t[0xbe] = op(Ldx, AbsoluteY, 4);
    t[0xc0] = op(Cpy, Immediate, 2);
    t[0xc1] = op(Cmp, IndirectX, 6);
    t[0xc4] = op(Cpy, ZeroPage, 3);
    t[0xc5] = op(Cmp, ZeroPage, 3);
    t[0xc6] = op(Dec, ZeroPage, 5);
    t[0xc8] = op(Iny, Implied, 2);
    t[0xc9] = op(Cmp, Immediate, 2);
    t[0xca] = op(Dex, Implied, 2);
    t[0xcc] = op(Cpy, Absolute, 4);
    t[0xcd] = op(Cmp, Absolute, 4);
    t[0xce] = op(Dec, Absolute, 6);
    t[0xd0] = op(Bne, Relative, 2);
    t[0xd1] = op(Cmp, IndirectY, 5);
    t[0xd5] = op(Cmp, ZeroPageX, 4);
    t[0xd6] = op(Dec, ZeroPageX, 6);
    t[0xd8] = op(Cld, Implied, 2);
    t[0xd9] = op(Cmp, AbsoluteY, 4);
    t[0xdd] = op(Cmp, AbsoluteX, 4);
    t[0xde] = op(Dec, AbsoluteX, 7);
    t[0xe0] = op(Cpx, Immediate, 2);
    t[0xe1] = op(Sbc, IndirectX, 6);
    t[0xe4] = op(Cpx, ZeroPage, 3);
    t[0xe5] = op(Sbc, ZeroPage, 3);
    t[0xe6] = op(Inc, ZeroPage, 5);
    t[0xe8] = op(Inx, Implied, 2);
    t[0xe9] = op(Sbc, Immediate, 2);
    t[0xea] = op(Nop, Implied, 2);
    t[0xec] = op(Cpx, Absolute, 4);
    t[0xed] = op(Sbc, Absolute, 4);
    t[0xee] = op(Inc, Absolute, 6);
    t[0xf0] = op(Beq, Relative, 2);
    t[0xf1] = op(Sbc, IndirectY, 5);
    t[0xf5] = op(Sbc, ZeroPageX, 4);
    t[0xf6] = op(Inc, ZeroPageX, 6);
    t[0xf8] = op(Sed, Implied, 2);
    t[0xf9] = op(Sbc, AbsoluteY, 4);
    t[0xfd] = op(Sbc, AbsoluteX, 4);
    t[0xfe] = op(Inc, AbsoluteX, 7);
    t
}

pub static OPCODE_TABLE: [OpcodeInfo; 256] = build_table();
