//! Concrete MMIO peripherals. The [`crate::memory::Device`] trait itself now
//! lives in `memory.rs`, shared by the bus, the CPUs and the audio engine's
//! register adapter; this module holds devices that are neither.
//!
//! `Timer` is adapted from `christiankuhl-em68k`'s `Timer`/`ControlMode`:
//! same four-mode shape (stopped, delay, event-count, pulse-extension), same
//! "control register picks a divider, data register is the reload value"
//! contract. The teacher's version measured elapsed wall-clock time with
//! `Instant::now()`; every tick here is instead driven by `tick(cycles)`,
//! since engine time is counted in CPU cycles, not wall time.

use crate::memory::{Device, Width};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControlMode {
    Stopped,
    Delay(u32),
    EventCount,
    PulseExtension(u32),
}

impl ControlMode {
    fn from_u8(ctrl: u8) -> Self {
        match ctrl {
            0 => ControlMode::Stopped,
            1 => ControlMode::Delay(4),
            2 => ControlMode::Delay(10),
            3 => ControlMode::Delay(16),
            4 => ControlMode::Delay(50),
            5 => ControlMode::Delay(64),
            6 => ControlMode::Delay(100),
            7 => ControlMode::Delay(200),
            8 => ControlMode::EventCount,
            9 => ControlMode::PulseExtension(4),
            10 => ControlMode::PulseExtension(10),
            11 => ControlMode::PulseExtension(16),
            12 => ControlMode::PulseExtension(50),
            13 => ControlMode::PulseExtension(64),
            14 => ControlMode::PulseExtension(100),
            _ => ControlMode::PulseExtension(200),
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            ControlMode::Stopped => 0,
            ControlMode::Delay(4) => 1,
            ControlMode::Delay(10) => 2,
            ControlMode::Delay(16) => 3,
            ControlMode::Delay(50) => 4,
            ControlMode::Delay(64) => 5,
            ControlMode::Delay(100) => 6,
            ControlMode::Delay(_) => 7,
            ControlMode::EventCount => 8,
            ControlMode::PulseExtension(4) => 9,
            ControlMode::PulseExtension(10) => 10,
            ControlMode::PulseExtension(16) => 11,
            ControlMode::PulseExtension(50) => 12,
            ControlMode::PulseExtension(64) => 13,
            ControlMode::PulseExtension(100) => 14,
            ControlMode::PulseExtension(_) => 15,
        }
    }
}

/// A cycle-driven countdown timer, register layout `[data: u8, ctrl: u8]`.
/// Counts down by one for every `divider` cycles elapsed; on reaching zero
/// it asserts its IRQ line and reloads from `data`, except in
/// [`ControlMode::PulseExtension`] mode, which latches low until the
/// control register is rewritten.
pub struct Timer {
    data: u8,
    counter: u8,
    accumulated: u32,
    mode: ControlMode,
    irq: bool,
}

impl Timer {
    pub fn new() -> Self {
        Timer { data: 0, counter: 0, accumulated: 0, mode: ControlMode::Stopped, irq: false }
    }

    fn divider(&self) -> Option<u32> {
        match self.mode {
            ControlMode::Stopped => None,
            ControlMode::EventCount => Some(1),
            ControlMode::Delay(d) | ControlMode::PulseExtension(d) => Some(d),
        }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for Timer {
    fn read(&mut self, offset: u32, _width: Width) -> u64 {
        match offset {
            0 => self.counter as u64,
            1 => self.mode.as_u8() as u64,
            _ => 0,
        }
    }

    fn write(&mut self, offset: u32, _width: Width, value: u64) {
        match offset {
            0 => {
                self.data = value as u8;
                self.counter = self.data;
            }
            1 => {
                self.mode = ControlMode::from_u8(value as u8);
                self.accumulated = 0;
                self.irq = false;
            }
            _ => {}
        }
    }

    fn tick(&mut self, cycles: u32) {
        let Some(divider) = self.divider() else { return };
        self.accumulated += cycles;
        while self.accumulated >= divider {
            self.accumulated -= divider;
            self.counter = self.counter.wrapping_sub(1);
            if self.counter == 0 {
                self.irq = true;
                if !matches!(self.mode, ControlMode::PulseExtension(_)) {
                    self.counter = self.data;
                }
            }
        }
    }

    fn irq_pending(&self) -> bool {
        self.irq
    }

    fn name(&self) -> &str {
        "timer"
    }
}

/// A single 16-bit register exposing host input as a bitfield the running
/// program can poll; the host writes it, the guest only ever reads it.
pub struct InputPort {
    state: u16,
}

impl InputPort {
    pub fn new() -> Self {
        InputPort { state: 0 }
    }

    pub fn set_state(&mut self, state: u16) {
        self.state = state;
    }
}

impl Default for InputPort {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for InputPort {
    fn read(&mut self, _offset: u32, _width: Width) -> u64 {
        self.state as u64
    }

    fn write(&mut self, _offset: u32, _width: Width, _value: u64) {}

    fn name(&self) -> &str {
        "input"
    }
}
