//! The three audio end-to-end scenarios, driven entirely through MMIO
//! register writes on `AudioRegisterDevice`, exactly as a CPU would.

use intuition_engine::audio::registers::AudioRegisterDevice;
use intuition_engine::audio::AudioEngine;
use intuition_engine::memory::{Device, Width};
use std::cell::RefCell;
use std::rc::Rc;

const SAMPLE_RATE: f64 = 44_100.0;

fn write_f32(device: &mut AudioRegisterDevice, offset: u32, value: f32) {
    device.write(offset, Width::Long, value as u32 as u64);
}

fn measure_rising_crossings(samples: &[f32]) -> usize {
    samples.windows(2).filter(|w| w[0] <= 0.0 && w[1] > 0.0).count()
}

#[test]
fn square_a4_measures_near_440_hz() {
    let engine = Rc::new(RefCell::new(AudioEngine::new(SAMPLE_RATE)));
    let mut device = AudioRegisterDevice::new(Rc::clone(&engine));

    device.write(0x00, Width::Long, 1); // master_control enable
    write_f32(&mut device, 0x10, 440.0); // square_freq
    device.write(0x14, Width::Long, 255); // square_vol
    device.write(0x18, Width::Long, 128); // square_duty
    write_f32(&mut device, 0x30, 1.0); // square_sustain
    device.write(0x1c, Width::Long, 3); // square_ctrl: enable + gate

    let samples = engine.borrow_mut().capture(4410);
    let crossings = measure_rising_crossings(&samples);
    let measured_hz = crossings as f64 * (SAMPLE_RATE / 4410.0);
    assert!((measured_hz - 440.0).abs() < 10.0);
}

#[test]
fn triangle_sweep_up_slow_raises_frequency_over_half_a_second() {
    let engine = Rc::new(RefCell::new(AudioEngine::new(SAMPLE_RATE)));
    let mut device = AudioRegisterDevice::new(Rc::clone(&engine));

    device.write(0x00, Width::Long, 1);
    write_f32(&mut device, 0x40, 440.0); // triangle_freq
    device.write(0x44, Width::Long, 255); // triangle_vol
    write_f32(&mut device, 0x58, 1.0); // triangle_sustain
    device.write(0x4c, Width::Long, 0xba); // triangle_sweep: enable, period=3, up, shift=2
    device.write(0x48, Width::Long, 3); // triangle_ctrl: enable + gate

    let total_samples = (SAMPLE_RATE * 0.5) as usize;
    let window = (SAMPLE_RATE * 0.1) as usize;
    let samples = engine.borrow_mut().capture(total_samples);

    let first_window = &samples[..window];
    let last_window = &samples[total_samples - window..];
    let first_hz = measure_rising_crossings(first_window) as f64 * (SAMPLE_RATE / window as f64);
    let last_hz = measure_rising_crossings(last_window) as f64 * (SAMPLE_RATE / window as f64);
    assert!(last_hz - first_hz > 50.0);
}

#[test]
fn sine_hard_sync_octave_halves_the_measured_period() {
    let engine = Rc::new(RefCell::new(AudioEngine::new(SAMPLE_RATE)));
    let mut device = AudioRegisterDevice::new(Rc::clone(&engine));

    device.write(0x00, Width::Long, 1);
    // Master: triangle (voice 1) at 440 Hz.
    write_f32(&mut device, 0x40, 440.0);
    device.write(0x44, Width::Long, 255);
    write_f32(&mut device, 0x58, 1.0);
    device.write(0x48, Width::Long, 3);
    // Slave: sine (voice 2) at 880 Hz, synced to voice 1.
    write_f32(&mut device, 0x60, 880.0);
    device.write(0x64, Width::Long, 255);
    write_f32(&mut device, 0x78, 1.0);
    device.write(0x68, Width::Long, 3);
    device.write(0xc8, Width::Long, 1); // sync_source_ch2 = voice 1

    let n = (SAMPLE_RATE * 0.1) as usize;
    let samples = engine.borrow_mut().capture(n);
    let crossings = measure_rising_crossings(&samples);
    let avg_interval = n as f64 / crossings.max(1) as f64;
    let ratio = avg_interval / (SAMPLE_RATE / 440.0);
    assert!((ratio - 0.5).abs() < 0.1);
}
