//! Static opcode-indexed decode table for the primary RISC core.
//!
//! Grounded on `christiankuhl-em68k`'s `parser.rs`, which built its 68k
//! decode tables as const data rather than a chain of `if`s on the raw bits.
//! The fixed 8-byte encoding here needs nothing that elaborate: one byte is
//! the whole opcode, so the table is a flat `[Opcode; 256]` built once at
//! compile time and indexed directly.

/// The decoded mnemonic. Operand positions are fixed by the encoding
/// (destination in byte 1, first source in byte 2, second source/immediate
/// field in byte 3, a 32-bit sign-extended immediate in bytes 4..8) and are
/// pulled out of the raw instruction word by `RiscCpu::step`, not stored here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Nop,
    Mov,
    LoadI,
    Load,
    Store,
    Add,
    AddI,
    Sub,
    SubI,
    And,
    Or,
    Xor,
    Not,
    Shl,
    Shr,
    Mul,
    Div,
    Cmp,
    Jmp,
    Jz,
    Jnz,
    Jc,
    Jn,
    Call,
    Ret,
    Ei,
    Di,
    Wfi,
    Trap,
    /// Byte/half/word loads, zero- or sign-extended to the full register
    /// width — `Load` itself stays the plain 8-byte load.
    LoadB,
    LoadBs,
    LoadH,
    LoadHs,
    LoadW,
    LoadWs,
    /// Byte/half/word stores, truncating the register value down —
    /// `Store` itself stays the plain 8-byte store.
    StoreB,
    StoreH,
    StoreW,
    Rol,
    Ror,
    Sar,
    DivS,
    Jo,
    Jno,
    Jnc,
    Jslt,
    Jsge,
    Jsle,
    Jsgt,
    Jult,
    Juge,
    Jule,
    Jugt,
    Reset,
    Rti,
    Illegal,
}

const fn build_table() -> [Opcode; 256] {
    let mut table = [Opcode::Illegal; 256];
    table[0x00] = Opcode::Nop;
    table[0x01] = Opcode::Mov;
    table[0x02] = Opcode::LoadI;
    table[0x03] = Opcode::Load;
    table[0x04] = Opcode::Store;
    table[0x05] = Opcode::Add;
    table[0x06] = Opcode::AddI;
    table[0x07] = Opcode::Sub;
    table[0x08] = Opcode::SubI;
    table[0x09] = Opcode::And;
    table[0x0a] = Opcode::Or;
    table[0x0b] = Opcode::Xor;
    table[0x0c] = Opcode::Not;
    table[0x0d] = Opcode::Shl;
    table[0x0e] = Opcode::Shr;
    table[0x0f] = Opcode::Mul;
    table[0x10] = Opcode::Div;
    table[0x11] = Opcode::Cmp;
    table[0x12] = Opcode::Jmp;
    table[0x13] = Opcode::Jz;
    table[0x14] = Opcode::Jnz;
    table[0x15] = Opcode::Jc;
    table[0x16] = Opcode::Jn;
    table[0x17] = Opcode::Call;
    table[0x18] = Opcode::Ret;
    table[0x19] = Opcode::Ei;
    table[0x1a] = Opcode::Di;
    table[0x1b] = Opcode::Wfi;
    table[0x1c] = Opcode::Trap;
    table[0x1d] = Opcode::LoadB;
    table[0x1e] = Opcode::LoadBs;
    table[0x1f] = Opcode::LoadH;
    table[0x20] = Opcode::LoadHs;
    table[0x21] = Opcode::LoadW;
    table[0x22] = Opcode::LoadWs;
    table[0x23] = Opcode::StoreB;
    table[0x24] = Opcode::StoreH;
    table[0x25] = Opcode::StoreW;
    table[0x26] = Opcode::Rol;
    table[0x27] = Opcode::Ror;
    table[0x28] = Opcode::Sar;
    table[0x29] = Opcode::DivS;
    table[0x2a] = Opcode::Jo;
    table[0x2b] = Opcode::Jno;
    table[0x2c] = Opcode::Jnc;
    table[0x2d] = Opcode::Jslt;
    table[0x2e] = Opcode::Jsge;
    table[0x2f] = Opcode::Jsle;
    table[0x30] = Opcode::Jsgt;
    table[0x31] = Opcode::Jult;
    table[0x32] = Opcode::Juge;
    table[0x33] = Opcode::Jule;
    table[0x34] = Opcode::Jugt;
    table[0x35] = Opcode::Reset;
    table[0x36] = Opcode::Rti;
    table
}

pub static OPCODE_TABLE: [Opcode; 256] = build_table();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmapped_opcodes_decode_as_illegal() {
        assert_eq!(OPCODE_TABLE[0xff], Opcode::Illegal);
        assert_eq!(OPCODE_TABLE[0x20], Opcode::Illegal);
    }

    #[test]
    fn mapped_opcode_round_trips_through_the_table() {
        assert_eq!(OPCODE_TABLE[0x05], Opcode::Add);
        assert_eq!(OPCODE_TABLE[0x18], Opcode::Ret);
    }
}
