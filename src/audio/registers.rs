//! MMIO register layout for the audio engine and the [`Device`] adapter
//! that turns bus writes into [`AudioEngine`] field mutations.
//!
//! Canonicalised constants: the repository this engine is drawn from
//! carried two names for the same tolerance (`FREQ_TOLERANCE` /
//! `FREQUENCY_TOLERANCE`) and the same sustain-ceiling level (`HIGH_SUSTAIN`
//! / `SUSTAIN_HIGH`). There is exactly one constant for each here.

use super::voice::NoiseMode;
use super::{AudioEngine, Waveform, VOICE_COUNT};
use crate::memory::{Device, Width};
use std::cell::RefCell;
use std::rc::Rc;

/// Tolerance used when comparing a measured oscillator frequency against
/// its nominal value (2% of 440 Hz, per the A4 end-to-end scenario).
pub const FREQUENCY_TOLERANCE_HZ: f32 = 8.8;

/// ADSR level at the Attack→Decay boundary.
pub const SUSTAIN_HIGH_LEVEL: f32 = 1.0;

const MASTER_CONTROL: u32 = 0x00;
const VOICE_BASES: [u32; VOICE_COUNT] = [0x10, 0x40, 0x60, 0x80];
const FILTER_TYPE: u32 = 0xa0;
const FILTER_CUTOFF: u32 = 0xa4;
const FILTER_RESONANCE: u32 = 0xa8;
const FILTER_MOD_SOURCE: u32 = 0xac;
const FILTER_MOD_AMOUNT: u32 = 0xb0;
const OVERDRIVE: u32 = 0xb4;
const REVERB_MIX: u32 = 0xb8;
const REVERB_DECAY: u32 = 0xbc;
const SYNC_SOURCE_BASE: u32 = 0xc0;
const RING_SOURCE_BASE: u32 = 0xd0;

/// Relative offsets within the square voice's block (it alone carries
/// `duty`/`pwm_ctrl`, so its layout is wider than the other three voices').
mod square_offset {
    pub const FREQ: u32 = 0x00;
    pub const VOL: u32 = 0x04;
    pub const DUTY: u32 = 0x08;
    pub const CTRL: u32 = 0x0c;
    pub const PWM_CTRL: u32 = 0x10;
    pub const SWEEP: u32 = 0x14;
    pub const ATTACK: u32 = 0x18;
    pub const DECAY: u32 = 0x1c;
    pub const SUSTAIN: u32 = 0x20;
    pub const RELEASE: u32 = 0x24;
}

/// Relative offsets shared by triangle, sine and noise — no duty/PWM.
/// Noise packs its White/Periodic/Metallic mode into bits 2:3 of `CTRL`,
/// since its declared register range has no room for a tenth register.
mod common_offset {
    pub const FREQ: u32 = 0x00;
    pub const VOL: u32 = 0x04;
    pub const CTRL: u32 = 0x08;
    pub const SWEEP: u32 = 0x0c;
    pub const ATTACK: u32 = 0x10;
    pub const DECAY: u32 = 0x14;
    pub const SUSTAIN: u32 = 0x18;
    pub const RELEASE: u32 = 0x1c;
}

/// Registers carry their value as a plain integer (Hz, ms, or a 0..=255-ish
/// level) in the low 32 bits, never an IEEE-754 bit pattern — a host writes
/// the literal number the register table documents.
fn reg_to_f32(value: u64) -> f32 {
    value as u32 as f32
}

fn f32_to_reg(value: f32) -> u64 {
    value as u32 as u64
}

/// The `Device` adapter the bus dispatches audio MMIO traffic to. Holds a
/// shared handle to the engine so the scheduler can also call
/// `generate_sample` directly every sample-debt tick, mirroring
/// `christiankuhl-em68k`'s shared `Rc<RefCell<_>>` register cells scaled
/// up to a whole engine's worth of state.
pub struct AudioRegisterDevice {
    engine: Rc<RefCell<AudioEngine>>,
}

impl AudioRegisterDevice {
    pub fn new(engine: Rc<RefCell<AudioEngine>>) -> Self {
        AudioRegisterDevice { engine }
    }

    fn write_voice(&self, voice: usize, relative: u32, value: u64) {
        let mut engine = self.engine.borrow_mut();
        let is_square = voice == 0;
        if is_square {
            use square_offset::*;
            match relative {
                FREQ => engine.voices[voice].frequency = reg_to_f32(value),
                VOL => engine.voices[voice].volume = value as u8,
                DUTY => engine.voices[voice].duty = value as u8,
                CTRL => {
                    engine.voices[voice].enabled = value & 0x1 != 0;
                    let gate = value & 0x2 != 0;
                    engine.voices[voice].set_gate(gate);
                }
                PWM_CTRL => {
                    engine.voices[voice].pwm_enabled = value & 0x80 != 0;
                    engine.voices[voice].pwm_rate = (value & 0x7f) as u8;
                }
                SWEEP => write_sweep(&mut engine.voices[voice].sweep, value as u8),
                ATTACK => engine.voices[voice].envelope.attack_ms = reg_to_f32(value),
                DECAY => engine.voices[voice].envelope.decay_ms = reg_to_f32(value),
                SUSTAIN => engine.voices[voice].envelope.sustain_level = reg_to_f32(value),
                RELEASE => engine.voices[voice].envelope.release_ms = reg_to_f32(value),
                _ => log::trace!("audio: write to unmapped square register +{relative:#x}"),
            }
        } else {
            use common_offset::*;
            match relative {
                FREQ => engine.voices[voice].frequency = reg_to_f32(value),
                VOL => engine.voices[voice].volume = value as u8,
                CTRL => {
                    engine.voices[voice].enabled = value & 0x1 != 0;
                    let gate = value & 0x2 != 0;
                    if engine.voices[voice].kind == Waveform::Noise {
                        engine.voices[voice].noise_mode = match (value >> 2) & 0x3 {
                            0 => NoiseMode::White,
                            1 => NoiseMode::Periodic,
                            _ => NoiseMode::Metallic,
                        };
                    }
                    engine.voices[voice].set_gate(gate);
                }
                SWEEP => write_sweep(&mut engine.voices[voice].sweep, value as u8),
                ATTACK => engine.voices[voice].envelope.attack_ms = reg_to_f32(value),
                DECAY => engine.voices[voice].envelope.decay_ms = reg_to_f32(value),
                SUSTAIN => engine.voices[voice].envelope.sustain_level = reg_to_f32(value),
                RELEASE => engine.voices[voice].envelope.release_ms = reg_to_f32(value),
                _ => log::trace!("audio: write to unmapped voice register +{relative:#x}"),
            }
        }
    }

    fn read_voice(&self, voice: usize, relative: u32) -> u64 {
        let engine = self.engine.borrow();
        let v = &engine.voices[voice];
        let is_square = voice == 0;
        if is_square {
            use square_offset::*;
            match relative {
                FREQ => f32_to_reg(v.frequency),
                VOL => v.volume as u64,
                DUTY => v.duty as u64,
                CTRL => (v.enabled as u64) | ((v.envelope.gate_is_set() as u64) << 1),
                ATTACK => f32_to_reg(v.envelope.attack_ms),
                DECAY => f32_to_reg(v.envelope.decay_ms),
                SUSTAIN => f32_to_reg(v.envelope.sustain_level),
                RELEASE => f32_to_reg(v.envelope.release_ms),
                _ => 0,
            }
        } else {
            use common_offset::*;
            match relative {
                FREQ => f32_to_reg(v.frequency),
                VOL => v.volume as u64,
                CTRL => (v.enabled as u64) | ((v.envelope.gate_is_set() as u64) << 1),
                ATTACK => f32_to_reg(v.envelope.attack_ms),
                DECAY => f32_to_reg(v.envelope.decay_ms),
                SUSTAIN => f32_to_reg(v.envelope.sustain_level),
                RELEASE => f32_to_reg(v.envelope.release_ms),
                _ => 0,
            }
        }
    }
}

/// Sweep control byte: bit7 enable, bits 6:4 period, bit3 direction (1 =
/// up, 0 = down), bits 2:0 shift.
fn write_sweep(sweep: &mut super::voice::Sweep, byte: u8) {
    sweep.enabled = byte & 0x80 != 0;
    sweep.direction_up = byte & 0x08 != 0;
    sweep.period = (byte >> 4) & 0x7;
    sweep.shift = byte & 0x7;
}

fn voice_index_for(offset: u32) -> Option<(usize, u32)> {
    for (i, &base) in VOICE_BASES.iter().enumerate() {
        let end = if i == 0 { 0x40 } else { base + 0x20 };
        if offset >= base && offset < end {
            return Some((i, offset - base));
        }
    }
    None
}

impl Device for AudioRegisterDevice {
    fn read(&mut self, offset: u32, _width: Width) -> u64 {
        if offset == MASTER_CONTROL {
            return self.engine.borrow().master_enable as u64;
        }
        if let Some((voice, relative)) = voice_index_for(offset) {
            return self.read_voice(voice, relative);
        }
        let engine = self.engine.borrow();
        match offset {
            FILTER_TYPE => engine.filter.kind as u64,
            FILTER_CUTOFF => engine.filter.cutoff as u64,
            FILTER_RESONANCE => engine.filter.resonance as u64,
            FILTER_MOD_SOURCE => engine.filter.mod_source.map(|s| s as u64).unwrap_or(0xff),
            FILTER_MOD_AMOUNT => engine.filter.mod_amount as u64,
            OVERDRIVE => engine.overdrive_level as u64,
            _ if (SYNC_SOURCE_BASE..SYNC_SOURCE_BASE + 0x10).contains(&offset) => {
                let voice = ((offset - SYNC_SOURCE_BASE) / 4) as usize;
                engine.voices[voice].sync_source.map(|s| s as u64).unwrap_or(0xff)
            }
            _ if (RING_SOURCE_BASE..RING_SOURCE_BASE + 0x10).contains(&offset) => {
                let voice = ((offset - RING_SOURCE_BASE) / 4) as usize;
                engine.voices[voice].ring_source.map(|s| s as u64).unwrap_or(0xff)
            }
            _ => 0,
        }
    }

    fn write(&mut self, offset: u32, _width: Width, value: u64) {
        if offset == MASTER_CONTROL {
            self.engine.borrow_mut().master_enable = value & 0x1 != 0;
            return;
        }
        if let Some((voice, relative)) = voice_index_for(offset) {
            self.write_voice(voice, relative, value);
            return;
        }
        match offset {
            FILTER_TYPE => {
                use super::filter::FilterKind;
                self.engine.borrow_mut().filter.kind = match value & 0x3 {
                    1 => FilterKind::LowPass,
                    2 => FilterKind::HighPass,
                    3 => FilterKind::BandPass,
                    _ => FilterKind::Off,
                };
            }
            FILTER_CUTOFF => self.engine.borrow_mut().filter.cutoff = value as u8,
            FILTER_RESONANCE => self.engine.borrow_mut().filter.resonance = value as u8,
            FILTER_MOD_SOURCE => {
                let source = if value < VOICE_COUNT as u64 { Some(value as usize) } else { None };
                self.engine.borrow_mut().filter.mod_source = source;
            }
            FILTER_MOD_AMOUNT => self.engine.borrow_mut().filter.mod_amount = value as u8,
            OVERDRIVE => self.engine.borrow_mut().overdrive_level = value as u8,
            REVERB_MIX => self.engine.borrow_mut().reverb_mut().mix = (value as f32 / 255.0).clamp(0.0, 1.0),
            REVERB_DECAY => self.engine.borrow_mut().reverb_mut().decay = (value as f32 / 255.0).clamp(0.0, 1.0),
            _ if (SYNC_SOURCE_BASE..SYNC_SOURCE_BASE + 0x10).contains(&offset) => {
                let voice = ((offset - SYNC_SOURCE_BASE) / 4) as usize;
                let source = if value < VOICE_COUNT as u64 { Some(value as usize) } else { None };
                self.engine.borrow_mut().set_sync_source(voice, source);
            }
            _ if (RING_SOURCE_BASE..RING_SOURCE_BASE + 0x10).contains(&offset) => {
                let voice = ((offset - RING_SOURCE_BASE) / 4) as usize;
                let source = if value < VOICE_COUNT as u64 { Some(value as usize) } else { None };
                self.engine.borrow_mut().set_ring_source(voice, source);
            }
            _ => log::trace!("audio: write to unmapped register {offset:#x}"),
        }
    }

    fn name(&self) -> &str {
        "audio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Width;

    #[test]
    fn register_write_then_read_round_trips() {
        let engine = Rc::new(RefCell::new(AudioEngine::new(44_100.0)));
        let mut device = AudioRegisterDevice::new(Rc::clone(&engine));
        device.write(0x10, Width::Long, 440);
        assert_eq!(device.read(0x10, Width::Long), 440);
    }

    #[test]
    fn master_control_bit0_gates_the_engine() {
        let engine = Rc::new(RefCell::new(AudioEngine::new(44_100.0)));
        let mut device = AudioRegisterDevice::new(Rc::clone(&engine));
        device.write(0x00, Width::Long, 1);
        assert!(engine.borrow().master_enable);
        device.write(0x00, Width::Long, 0);
        assert!(!engine.borrow().master_enable);
    }

    #[test]
    fn sync_source_register_rejects_self_reference() {
        let engine = Rc::new(RefCell::new(AudioEngine::new(44_100.0)));
        let mut device = AudioRegisterDevice::new(Rc::clone(&engine));
        device.write(0xc0, Width::Long, 0);
        assert_eq!(engine.borrow().voices[0].sync_source, None);
    }
}
