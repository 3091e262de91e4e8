//! The Intuition Engine core: cycle-accounted primary RISC and 6502
//! coprocessor execution, a shared MMIO bus, and a sample-accurate
//! four-voice synthesiser, wired together by a cooperative scheduler.
//!
//! Everything outside the minimal container-header parse (the CLI, the GUI,
//! the video rasteriser, the built-in debugger, music-tracker formats) is
//! an external collaborator this crate never touches — its only contract
//! with a host is: provide program bytes, call [`Engine::reset`] and
//! [`Engine::step`], and read audio samples back out of the ring.

pub mod audio;
pub mod config;
pub mod container;
pub mod conversions;
pub mod devices;
pub mod error;
pub mod memory;
pub mod mos6502;
pub mod risc;
pub mod scheduler;

use audio::ring::AudioRing;
use audio::registers::AudioRegisterDevice;
use audio::AudioEngine;
use config::EngineConfig;
use container::{Container, CpuTag};
use devices::{InputPort, Timer};
use error::EngineError;
use memory::{Bus, Device};
use mos6502::Mos6502Cpu;
use risc::RiscCpu;
use scheduler::Scheduler;
use std::cell::RefCell;
use std::rc::Rc;

const AUDIO_BASE: u32 = 0x00;
const AUDIO_SIZE: u32 = 0x100;
const TIMER_BASE: u32 = 0x100;
const TIMER_SIZE: u32 = 0x10;
const INPUT_BASE: u32 = 0x110;
const INPUT_SIZE: u32 = 0x10;

/// A capacity generous enough to absorb ordinary host audio-callback
/// jitter without the scheduler's sample loop ever needing to spin long.
const AUDIO_RING_CAPACITY: usize = 8192;

/// The assembled virtual machine: bus, devices, both CPU cores and the
/// scheduler that drives them, built from an [`EngineConfig`].
pub struct Engine {
    scheduler: Scheduler,
    audio: Rc<RefCell<AudioEngine>>,
    ring: Rc<AudioRing>,
    input: Rc<RefCell<InputPortHandle>>,
}

/// A small wrapper letting a host push input state in after construction,
/// since `InputPort` itself lives inside the bus's device table by then.
struct InputPortHandle {
    state: u16,
}

struct InputPortProxy {
    handle: Rc<RefCell<InputPortHandle>>,
    inner: InputPort,
}

impl memory::Device for InputPortProxy {
    fn read(&mut self, offset: u32, width: memory::Width) -> u64 {
        self.inner.set_state(self.handle.borrow().state);
        self.inner.read(offset, width)
    }

    fn write(&mut self, offset: u32, width: memory::Width, value: u64) {
        self.inner.write(offset, width, value)
    }

    fn name(&self) -> &str {
        "input"
    }
}

impl Engine {
    /// Build a fresh engine: a bus sized per `config`, the audio register
    /// block, a timer and an input port attached at fixed offsets within
    /// the MMIO window, the primary RISC core, and one 6502 coprocessor
    /// mapped immediately above the primary's address space.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let mut bus = Bus::new(config.ram_size, config.mmio_base);
        let audio = Rc::new(RefCell::new(AudioEngine::new(config.sample_rate)));
        let ring = Rc::new(AudioRing::new(AUDIO_RING_CAPACITY));
        let input_handle = Rc::new(RefCell::new(InputPortHandle { state: 0 }));

        bus.attach(
            config.mmio_base + AUDIO_BASE,
            AUDIO_SIZE,
            Box::new(AudioRegisterDevice::new(Rc::clone(&audio))),
        )?;
        bus.attach(config.mmio_base + TIMER_BASE, TIMER_SIZE, Box::new(Timer::new()))?;
        bus.attach(
            config.mmio_base + INPUT_BASE,
            INPUT_SIZE,
            Box::new(InputPortProxy { handle: Rc::clone(&input_handle), inner: InputPort::new() }),
        )?;

        let primary = RiscCpu::new();
        let coprocessors = vec![Mos6502Cpu::new(config.ram_size)];

        let scheduler = Scheduler::new(bus, primary, coprocessors, Rc::clone(&audio), Rc::clone(&ring), config);
        Ok(Engine { scheduler, audio, ring, input: input_handle })
    }

    /// Parse and load a container, placing its program bytes at
    /// `load_address` and resetting the appropriate CPU core to its
    /// `entry_point`. Only the primary RISC and the one attached 6502
    /// coprocessor are backed by running cores; other `CpuTag`s parse but
    /// have nowhere to execute in this build.
    pub fn load_container(&mut self, bytes: &[u8]) -> Result<(), EngineError> {
        let container = container::parse(bytes)?;
        self.load_parsed(&container)
    }

    fn load_parsed(&mut self, container: &Container) -> Result<(), EngineError> {
        self.scheduler.bus.load_bytes(container.load_address, &container.program);
        match container.cpu {
            CpuTag::Risc => self.scheduler.primary.reset(container.entry_point),
            CpuTag::Mos6502 => {
                if let Some(coproc) = self.scheduler.coprocessors.first_mut() {
                    coproc.reset(&mut self.scheduler.bus);
                    coproc.pc = container.entry_point as u16;
                } else {
                    return Err(EngineError::DeviceConfig("no 6502 coprocessor attached".into()));
                }
            }
            other => {
                return Err(EngineError::DeviceConfig(format!("{other:?} has no backing core in this build")));
            }
        }
        Ok(())
    }

    pub fn reset(&mut self, primary_entry: u32) {
        self.scheduler.reset(primary_entry);
    }

    /// Advance the engine by one primary-CPU instruction. Returns the
    /// number of primary cycles it cost.
    pub fn step(&mut self) -> u32 {
        self.scheduler.tick()
    }

    pub fn run_for_cycles(&mut self, cycles: u64) {
        self.scheduler.run_for_cycles(cycles);
    }

    /// Pop the next audio sample the scheduler's sample-debt loop produced,
    /// or `None` if the ring is momentarily drained.
    pub fn next_sample(&self) -> Option<f32> {
        self.ring.pop()
    }

    pub fn set_input_state(&self, state: u16) {
        self.input.borrow_mut().state = state;
    }

    pub fn audio(&self) -> Rc<RefCell<AudioEngine>> {
        Rc::clone(&self.audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_loads_a_risc_container_and_steps() {
        let mut engine = Engine::new(EngineConfig { ram_size: 1 << 16, mmio_base: 0xf000, ..Default::default() }).unwrap();
        let mut bytes = vec![b'I', b'E', b'R', 0];
        bytes.extend_from_slice(&0u32.to_le_bytes()); // load_address
        bytes.extend_from_slice(&0u32.to_le_bytes()); // entry_point
        bytes.extend_from_slice(&8u32.to_le_bytes()); // length
        bytes.extend_from_slice(&[0x00, 0, 0, 0, 0, 0, 0, 0]); // NOP
        engine.load_container(&bytes).unwrap();
        let cycles = engine.step();
        assert_eq!(cycles, 1);
    }

    #[test]
    fn unattached_cpu_tag_is_a_device_config_error() {
        let mut engine = Engine::new(EngineConfig { ram_size: 1 << 16, mmio_base: 0xf000, ..Default::default() }).unwrap();
        let mut bytes = vec![b'I', b'E', b'Z', 0];
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        assert!(matches!(engine.load_container(&bytes), Err(EngineError::DeviceConfig(_))));
    }

    #[test]
    fn host_input_state_reaches_the_bus() {
        let mut engine = Engine::new(EngineConfig { ram_size: 1 << 16, mmio_base: 0xf000, ..Default::default() }).unwrap();
        engine.set_input_state(0b1010);
        let value = engine.scheduler.bus.read(0xf000 + INPUT_BASE, memory::Width::Word);
        assert_eq!(value, 0b1010);
    }
}
