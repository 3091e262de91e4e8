//! Status register bits, adapted from RustyNES's `StatusFlags`: the same
//! N V _ B D I Z C layout, with `B` synthesised only when the flags are
//! serialised onto the stack, never stored as a persistent bit.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusFlags: u8 {
        const CARRY             = 0b0000_0001;
        const ZERO              = 0b0000_0010;
        const INTERRUPT_DISABLE = 0b0000_0100;
        const DECIMAL           = 0b0000_1000;
        const UNUSED            = 0b0010_0000;
        const OVERFLOW          = 0b0100_0000;
        const NEGATIVE          = 0b1000_0000;
    }
}

impl StatusFlags {
    pub fn set_zn(&mut self, value: u8) {
        self.set(StatusFlags::ZERO, value == 0);
        self.set(StatusFlags::NEGATIVE, value & 0x80 != 0);
    }

    /// Render the flags as the byte pushed on the stack by PHP/BRK/IRQ/NMI.
    /// `break_flag` is true for PHP and BRK, false for a hardware interrupt.
    pub fn to_stack_byte(self, break_flag: bool) -> u8 {
        let base = (self | StatusFlags::UNUSED).bits();
        if break_flag {
            base | 0b0001_0000
        } else {
            base & !0b0001_0000
        }
    }
}
