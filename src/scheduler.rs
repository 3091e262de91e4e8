//! The cooperative single-thread scheduler tying the primary RISC core,
//! the 6502 coprocessors, the bus's devices and the audio engine together
//! into one outer tick.
//!
//! Grounded on `christiankuhl-em68k`'s main run loop, which stepped its CPU,
//! credited the result to every device's clock, and polled for pending
//! interrupts once per iteration. This scheduler generalises that shape to
//! more than one clock domain: the primary CPU's cycle count is scaled by
//! [`EngineConfig::coproc_cycles_per_primary_cycle`] to decide how many
//! times (fractionally accumulated) each coprocessor should step, and by
//! [`EngineConfig::samples_per_cpu_cycle`] to decide when the audio engine
//! owes the ring buffer another sample.

use crate::audio::ring::AudioRing;
use crate::audio::AudioEngine;
use crate::config::EngineConfig;
use crate::memory::Bus;
use crate::mos6502::Mos6502Cpu;
use crate::risc::RiscCpu;
use std::cell::RefCell;
use std::rc::Rc;

pub struct Scheduler {
    pub bus: Bus,
    pub primary: RiscCpu,
    pub coprocessors: Vec<Mos6502Cpu>,
    audio: Rc<RefCell<AudioEngine>>,
    ring: Rc<AudioRing>,
    config: EngineConfig,
    coproc_debt: f64,
    sample_debt: f64,
}

impl Scheduler {
    pub fn new(
        bus: Bus,
        primary: RiscCpu,
        coprocessors: Vec<Mos6502Cpu>,
        audio: Rc<RefCell<AudioEngine>>,
        ring: Rc<AudioRing>,
        config: EngineConfig,
    ) -> Self {
        Scheduler {
            bus,
            primary,
            coprocessors,
            audio,
            ring,
            config,
            coproc_debt: 0.0,
            sample_debt: 0.0,
        }
    }

    /// Reset every CPU's register file, clear pending IRQ lines, and empty
    /// the audio ring — the cancellation-equivalent for this single-threaded
    /// cooperative core.
    pub fn reset(&mut self, primary_entry: u32) {
        self.primary.reset(primary_entry);
        for coproc in &mut self.coprocessors {
            coproc.reset(&mut self.bus);
        }
        self.bus.tick_devices(0, self.coprocessors.len() + 1);
        self.audio.borrow_mut().reset();
        while self.ring.pop().is_some() {}
        self.coproc_debt = 0.0;
        self.sample_debt = 0.0;
    }

    /// Run exactly one primary-CPU instruction (or, while halted awaiting
    /// an interrupt, one idle cycle) and propagate its effects through every
    /// other clock domain. Returns the number of primary cycles consumed.
    pub fn tick(&mut self) -> u32 {
        let cpu_count = self.coprocessors.len() + 1;

        let primary_pending = self.bus.has_pending_irq(0);
        self.primary.maybe_deliver_interrupt(&mut self.bus, primary_pending);
        let cycles = self.primary.step(&mut self.bus);

        self.coproc_debt += cycles as f64 * self.config.coproc_cycles_per_primary_cycle();
        while self.coproc_debt >= 1.0 {
            self.coproc_debt -= 1.0;
            for (i, coproc) in self.coprocessors.iter_mut().enumerate() {
                let pending = self.bus.has_pending_irq(i + 1);
                coproc.set_irq_line(pending);
                coproc.step(&mut self.bus);
            }
        }

        self.bus.tick_devices(cycles, cpu_count);

        self.sample_debt += cycles as f64 * self.config.samples_per_cpu_cycle();
        while self.sample_debt >= 1.0 {
            self.sample_debt -= 1.0;
            let sample = self.audio.borrow_mut().generate_sample();
            self.ring.push(sample);
        }

        cycles
    }

    /// Run `tick` until at least `cycles` primary cycles have elapsed.
    pub fn run_for_cycles(&mut self, cycles: u64) {
        let mut elapsed = 0u64;
        while elapsed < cycles {
            elapsed += self.tick() as u64;
        }
    }
}
