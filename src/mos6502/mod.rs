//! The 6502 coprocessor core, taken as the representative secondary CPU.
//!
//! Structure and register set are adapted directly from RustyNES's `Cpu`:
//! the same `a`/`x`/`y`/`pc`/`sp`/`status`/`cycles` fields, the same
//! edge-triggered NMI / level-triggered-and-masked IRQ split, the same
//! `step()` contract of "poll interrupts, else fetch-decode-execute,
//! return cycles taken". Two differences: this core shares the 32-bit bus
//! with the primary RISC CPU instead of owning a private 16-bit one (so it
//! carries a `base` address its 64 KiB window is mapped at), and only the
//! official opcode set is implemented, per the secondary-CPU scope.

mod addressing;
mod opcodes;
mod status;

use addressing::{read_at, write_at, AddressingMode};
use opcodes::{Mnemonic, OPCODE_TABLE};
pub use status::StatusFlags;

use crate::memory::Bus;

const RESET_VECTOR: u16 = 0xfffc;
const NMI_VECTOR: u16 = 0xfffa;
const IRQ_VECTOR: u16 = 0xfffe;

pub struct Mos6502Cpu {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub pc: u16,
    pub sp: u8,
    pub status: StatusFlags,
    pub cycles: u64,
    /// Base address this CPU's 16-bit address space is mapped to on the
    /// shared bus.
    base: u32,
    /// Latched by `trigger_nmi`; edge-triggered, consumed on the next step.
    nmi_pending: bool,
    /// Sampled every step; level-triggered, masked by the I flag.
    irq_line: bool,
    /// Set by an undefined opcode; the CPU stops fetching until reset.
    pub jammed: bool,
}

impl Mos6502Cpu {
    pub fn new(base: u32) -> Self {
        Mos6502Cpu {
            a: 0,
            x: 0,
            y: 0,
            pc: 0,
            sp: 0xfd,
            status: StatusFlags::from_bits_truncate(0x34),
            cycles: 0,
            base,
            nmi_pending: false,
            irq_line: false,
            jammed: false,
        }
    }

    pub fn reset(&mut self, bus: &mut Bus) {
        self.sp = self.sp.wrapping_sub(3);
        self.status.insert(StatusFlags::INTERRUPT_DISABLE);
        self.pc = self.read_u16(bus, RESET_VECTOR);
        self.cycles += 7;
        self.nmi_pending = false;
        self.irq_line = false;
        self.jammed = false;
    }

    pub fn trigger_nmi(&mut self) {
        self.nmi_pending = true;
    }

    pub fn set_irq_line(&mut self, active: bool) {
        self.irq_line = active;
    }

    fn read_byte(&self, bus: &mut Bus, addr: u16) -> u8 {
        read_at(bus, self.base, addr)
    }

    fn write_byte(&self, bus: &mut Bus, addr: u16, value: u8) {
        write_at(bus, self.base, addr, value)
    }

    fn read_u16(&self, bus: &mut Bus, addr: u16) -> u16 {
        let lo = self.read_byte(bus, addr);
        let hi = self.read_byte(bus, addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    fn push(&mut self, bus: &mut Bus, value: u8) {
        self.write_byte(bus, 0x0100 | self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pop(&mut self, bus: &mut Bus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        self.read_byte(bus, 0x0100 | self.sp as u16)
    }

    fn push_u16(&mut self, bus: &mut Bus, value: u16) {
        self.push(bus, (value >> 8) as u8);
        self.push(bus, (value & 0xff) as u8);
    }

    fn pop_u16(&mut self, bus: &mut Bus) -> u16 {
        let lo = self.pop(bus);
        let hi = self.pop(bus);
        u16::from_le_bytes([lo, hi])
    }

    pub fn step(&mut self, bus: &mut Bus) -> u32 {
        if self.jammed {
            self.cycles += 1;
            return 1;
        }
        if self.nmi_pending {
            self.nmi_pending = false;
            return self.handle_interrupt(bus, NMI_VECTOR, false) as u32;
        }
        if self.irq_line && !self.status.contains(StatusFlags::INTERRUPT_DISABLE) {
            return self.handle_interrupt(bus, IRQ_VECTOR, false) as u32;
        }

        let opcode = self.read_byte(bus, self.pc);
        self.pc = self.pc.wrapping_add(1);
        let info = OPCODE_TABLE[opcode as usize];
        let extra = self.execute(info.mnemonic, info.mode, bus);
        let total = info.cycles as u32 + extra as u32;
        self.cycles += total as u64;
        total
    }

    fn handle_interrupt(&mut self, bus: &mut Bus, vector: u16, break_flag: bool) -> u8 {
        self.push_u16(bus, self.pc);
        self.push(bus, self.status.to_stack_byte(break_flag));
        self.status.insert(StatusFlags::INTERRUPT_DISABLE);
        self.pc = self.read_u16(bus, vector);
        7
    }

    fn operand_addr(&mut self, bus: &mut Bus, mode: AddressingMode) -> (u16, bool) {
        let resolved = mode.resolve(self.base, self.pc, self.x, self.y, bus);
        self.pc = self.pc.wrapping_add(mode.operand_bytes() as u16);
        (resolved.addr, resolved.page_crossed)
    }

    fn read_operand(&mut self, bus: &mut Bus, mode: AddressingMode) -> (u8, bool) {
        if mode == AddressingMode::Accumulator {
            return (self.a, false);
        }
        let (addr, crossed) = self.operand_addr(bus, mode);
        (self.read_byte(bus, addr), crossed)
    }

    fn write_operand(&mut self, bus: &mut Bus, mode: AddressingMode, value: u8) {
        if mode == AddressingMode::Accumulator {
            self.a = value;
            return;
        }
        let (addr, _) = self.operand_addr(bus, mode);
        self.write_byte(bus, addr, value);
    }

    fn branch(&mut self, bus: &mut Bus, taken: bool) -> u8 {
        let offset = self.read_byte(bus, self.pc) as i8;
        self.pc = self.pc.wrapping_add(1);
        if !taken {
            return 0;
        }
        let target = self.pc.wrapping_add(offset as u16);
        let page_crossed = (self.pc & 0xff00) != (target & 0xff00);
        self.pc = target;
        if page_crossed {
            2
        } else {
            1
        }
    }

    fn adc(&mut self, value: u8) {
        if self.status.contains(StatusFlags::DECIMAL) {
            self.adc_decimal(value);
            return;
        }
        let carry_in = self.status.contains(StatusFlags::CARRY) as u16;
        let sum = self.a as u16 + value as u16 + carry_in;
        let overflow = (!(self.a ^ value) & (self.a ^ sum as u8)) & 0x80 != 0;
        self.status.set(StatusFlags::CARRY, sum > 0xff);
        self.status.set(StatusFlags::OVERFLOW, overflow);
        self.a = sum as u8;
        self.status.set_zn(self.a);
    }

    fn adc_decimal(&mut self, value: u8) {
        let carry_in = self.status.contains(StatusFlags::CARRY) as u8;
        let mut lo = (self.a & 0x0f) + (value & 0x0f) + carry_in;
        let mut hi = (self.a >> 4) + (value >> 4);
        if lo > 9 {
            lo += 6;
            hi += 1;
        }
        let overflow = (!(self.a ^ value) & (self.a ^ (hi << 4))) & 0x80 != 0;
        if hi > 9 {
            hi += 6;
        }
        self.status.set(StatusFlags::CARRY, hi > 15);
        self.status.set(StatusFlags::OVERFLOW, overflow);
        self.a = ((hi << 4) | (lo & 0x0f)) & 0xff;
        self.status.set_zn(self.a);
    }

    fn sbc(&mut self, value: u8) {
        if self.status.contains(StatusFlags::DECIMAL) {
            self.sbc_decimal(value);
            return;
        }
        self.adc(!value);
    }

    fn sbc_decimal(&mut self, value: u8) {
        let borrow_in = 1 - self.status.contains(StatusFlags::CARRY) as i16;
        let mut lo = (self.a & 0x0f) as i16 - (value & 0x0f) as i16 - borrow_in;
        let mut hi = (self.a >> 4) as i16 - (value >> 4) as i16;
        if lo < 0 {
            lo += 10;
            hi -= 1;
        }
        if hi < 0 {
            hi += 10;
        }
        let binary = self.a as i16 - value as i16 - borrow_in;
        self.status.set(StatusFlags::CARRY, binary >= 0);
        let overflow = ((self.a ^ value) & (self.a ^ (binary as u8))) & 0x80 != 0;
        self.status.set(StatusFlags::OVERFLOW, overflow);
        self.a = (((hi << 4) | (lo & 0x0f)) & 0xff) as u8;
        self.status.set_zn(self.a);
    }

    fn compare(&mut self, register: u8, value: u8) {
        let result = register.wrapping_sub(value);
        self.status.set(StatusFlags::CARRY, register >= value);
        self.status.set_zn(result);
    }

    fn execute(&mut self, mnemonic: Mnemonic, mode: AddressingMode, bus: &mut Bus) -> u8 {
        use Mnemonic::*;
        match mnemonic {
            Lda => {
                let (v, crossed) = self.read_operand(bus, mode);
                self.a = v;
                self.status.set_zn(self.a);
                crossed as u8
            }
            Ldx => {
                let (v, crossed) = self.read_operand(bus, mode);
                self.x = v;
                self.status.set_zn(self.x);
                crossed as u8
            }
            Ldy => {
                let (v, crossed) = self.read_operand(bus, mode);
                self.y = v;
                self.status.set_zn(self.y);
                crossed as u8
            }
            Sta => {
                self.write_operand(bus, mode, self.a);
                0
            }
            Stx => {
                self.write_operand(bus, mode, self.x);
                0
            }
            Sty => {
                self.write_operand(bus, mode, self.y);
                0
            }
            Tax => {
                self.x = self.a;
                self.status.set_zn(self.x);
                0
            }
            Tay => {
                self.y = self.a;
                self.status.set_zn(self.y);
                0
            }
            Txa => {
                self.a = self.x;
                self.status.set_zn(self.a);
                0
            }
            Tya => {
                self.a = self.y;
                self.status.set_zn(self.a);
                0
            }
            Tsx => {
                self.x = self.sp;
                self.status.set_zn(self.x);
                0
            }
            Txs => {
                self.sp = self.x;
                0
            }
            Pha => {
                self.push(bus, self.a);
                0
            }
            Php => {
                let byte = self.status.to_stack_byte(true);
                self.push(bus, byte);
                0
            }
            Pla => {
                self.a = self.pop(bus);
                self.status.set_zn(self.a);
                0
            }
            Plp => {
                let byte = self.pop(bus);
                self.status = StatusFlags::from_bits_truncate(byte);
                self.status.insert(StatusFlags::UNUSED);
                0
            }
            Adc => {
                let (v, crossed) = self.read_operand(bus, mode);
                self.adc(v);
                crossed as u8
            }
            Sbc => {
                let (v, crossed) = self.read_operand(bus, mode);
                self.sbc(v);
                crossed as u8
            }
            Inc => {
                let (v, _) = self.read_operand(bus, mode);
                let result = v.wrapping_add(1);
                self.write_operand(bus, mode, result);
                self.status.set_zn(result);
                0
            }
            Dec => {
                let (v, _) = self.read_operand(bus, mode);
                let result = v.wrapping_sub(1);
                self.write_operand(bus, mode, result);
                self.status.set_zn(result);
                0
            }
            Inx => {
                self.x = self.x.wrapping_add(1);
                self.status.set_zn(self.x);
                0
            }
            Iny => {
                self.y = self.y.wrapping_add(1);
                self.status.set_zn(self.y);
                0
            }
            Dex => {
                self.x = self.x.wrapping_sub(1);
                self.status.set_zn(self.x);
                0
            }
            Dey => {
                self.y = self.y.wrapping_sub(1);
                self.status.set_zn(self.y);
                0
            }
            And => {
                let (v, crossed) = self.read_operand(bus, mode);
                self.a &= v;
                self.status.set_zn(self.a);
                crossed as u8
            }
            Ora => {
                let (v, crossed) = self.read_operand(bus, mode);
                self.a |= v;
                self.status.set_zn(self.a);
                crossed as u8
            }
            Eor => {
                let (v, crossed) = self.read_operand(bus, mode);
                self.a ^= v;
                self.status.set_zn(self.a);
                crossed as u8
            }
            Bit => {
                let (v, _) = self.read_operand(bus, mode);
                self.status.set(StatusFlags::ZERO, (self.a & v) == 0);
                self.status.set(StatusFlags::NEGATIVE, v & 0x80 != 0);
                self.status.set(StatusFlags::OVERFLOW, v & 0x40 != 0);
                0
            }
            Asl => {
                let (v, _) = self.read_operand(bus, mode);
                self.status.set(StatusFlags::CARRY, v & 0x80 != 0);
                let result = v << 1;
                self.write_operand(bus, mode, result);
                self.status.set_zn(result);
                0
            }
            Lsr => {
                let (v, _) = self.read_operand(bus, mode);
                self.status.set(StatusFlags::CARRY, v & 0x01 != 0);
                let result = v >> 1;
                self.write_operand(bus, mode, result);
                self.status.set_zn(result);
                0
            }
            Rol => {
                let (v, _) = self.read_operand(bus, mode);
                let carry_in = self.status.contains(StatusFlags::CARRY) as u8;
                self.status.set(StatusFlags::CARRY, v & 0x80 != 0);
                let result = (v << 1) | carry_in;
                self.write_operand(bus, mode, result);
                self.status.set_zn(result);
                0
            }
            Ror => {
                let (v, _) = self.read_operand(bus, mode);
                let carry_in = self.status.contains(StatusFlags::CARRY) as u8;
                self.status.set(StatusFlags::CARRY, v & 0x01 != 0);
                let result = (v >> 1) | (carry_in << 7);
                self.write_operand(bus, mode, result);
                self.status.set_zn(result);
                0
            }
            Cmp => {
                let (v, crossed) = self.read_operand(bus, mode);
                self.compare(self.a, v);
                crossed as u8
            }
            Cpx => {
                let (v, _) = self.read_operand(bus, mode);
                self.compare(self.x, v);
                0
            }
            Cpy => {
                let (v, _) = self.read_operand(bus, mode);
                self.compare(self.y, v);
                0
            }
            Bpl => self.branch(bus, !self.status.contains(StatusFlags::NEGATIVE)),
            Bmi => self.branch(bus, self.status.contains(StatusFlags::NEGATIVE)),
            Bvc => self.branch(bus, !self.status.contains(StatusFlags::OVERFLOW)),
            Bvs => self.branch(bus, self.status.contains(StatusFlags::OVERFLOW)),
            Bcc => self.branch(bus, !self.status.contains(StatusFlags::CARRY)),
            Bcs => self.branch(bus, self.status.contains(StatusFlags::CARRY)),
            Bne => self.branch(bus, !self.status.contains(StatusFlags::ZERO)),
            Beq => self.branch(bus, self.status.contains(StatusFlags::ZERO)),
            Jmp => {
                let (addr, _) = self.operand_addr(bus, mode);
                self.pc = addr;
                0
            }
            Jsr => {
                let (addr, _) = self.operand_addr(bus, mode);
                let return_addr = self.pc.wrapping_sub(1);
                self.push_u16(bus, return_addr);
                self.pc = addr;
                0
            }
            Rts => {
                let addr = self.pop_u16(bus);
                self.pc = addr.wrapping_add(1);
                0
            }
            Rti => {
                let byte = self.pop(bus);
                self.status = StatusFlags::from_bits_truncate(byte);
                self.status.insert(StatusFlags::UNUSED);
                self.pc = self.pop_u16(bus);
                0
            }
            Brk => {
                self.pc = self.pc.wrapping_add(1);
                self.handle_interrupt(bus, IRQ_VECTOR, true);
                0
            }
            Clc => {
                self.status.remove(StatusFlags::CARRY);
                0
            }
            Sec => {
                self.status.insert(StatusFlags::CARRY);
                0
            }
            Cli => {
                self.status.remove(StatusFlags::INTERRUPT_DISABLE);
                0
            }
            Sei => {
                self.status.insert(StatusFlags::INTERRUPT_DISABLE);
                0
            }
            Clv => {
                self.status.remove(StatusFlags::OVERFLOW);
                0
            }
            Cld => {
                self.status.remove(StatusFlags::DECIMAL);
                0
            }
            Sed => {
                self.status.insert(StatusFlags::DECIMAL);
                0
            }
            Nop => 0,
            Jam => {
                self.jammed = true;
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Bus;

    fn new_bus() -> Bus {
        Bus::new(1 << 16, 0xf000)
    }

    #[test]
    fn reset_reads_vector_and_costs_seven_cycles() {
        let mut bus = new_bus();
        bus.write(0xfffc, crate::memory::Width::Byte, 0x00);
        bus.write(0xfffd, crate::memory::Width::Byte, 0x80);
        let mut cpu = Mos6502Cpu::new(0);
        cpu.reset(&mut bus);
        assert_eq!(cpu.pc, 0x8000);
        assert_eq!(cpu.cycles, 7);
    }

    #[test]
    fn lda_immediate_sets_zero_and_negative_flags() {
        let mut bus = new_bus();
        bus.write(0x0000, crate::memory::Width::Byte, 0xa9); // LDA #$00
        bus.write(0x0001, crate::memory::Width::Byte, 0x00);
        let mut cpu = Mos6502Cpu::new(0);
        cpu.pc = 0;
        cpu.step(&mut bus);
        assert_eq!(cpu.a, 0);
        assert!(cpu.status.contains(StatusFlags::ZERO));
    }

    #[test]
    fn cmp_bne_loop_costs_fifty_one_cycles() {
        // 0: LDX #$0A  2: loop: DEX  3: BNE loop (-3)
        let mut bus = new_bus();
        let program: [u8; 5] = [0xa2, 0x0a, 0xca, 0xd0, 0xfd];
        bus.load_bytes(0, &program);
        let mut cpu = Mos6502Cpu::new(0);
        cpu.pc = 0;
        let mut total = 0u32;
        total += cpu.step(&mut bus); // LDX #$0A (2)
        for _ in 0..10 {
            total += cpu.step(&mut bus); // DEX (2)
            total += cpu.step(&mut bus); // BNE (2 or 3)
        }
        assert_eq!(cpu.x, 0);
        assert_eq!(total, 51);
        assert_eq!(cpu.pc, 5);
    }

    #[test]
    fn stack_push_pop_round_trips() {
        let mut bus = new_bus();
        let mut cpu = Mos6502Cpu::new(0);
        cpu.sp = 0xff;
        cpu.push(&mut bus, 0x42);
        assert_eq!(cpu.sp, 0xfe);
        let v = cpu.pop(&mut bus);
        assert_eq!(v, 0x42);
        assert_eq!(cpu.sp, 0xff);
    }

    #[test]
    fn undefined_opcode_jams_the_cpu() {
        let mut bus = new_bus();
        bus.write(0x0000, crate::memory::Width::Byte, 0x02); // undefined
        let mut cpu = Mos6502Cpu::new(0);
        cpu.pc = 0;
        cpu.step(&mut bus);
        assert!(cpu.jammed);
        let cycles_before = cpu.cycles;
        cpu.step(&mut bus);
        assert_eq!(cpu.cycles, cycles_before + 1);
    }
}
