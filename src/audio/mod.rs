//! The four-voice synthesiser: phase-accumulator oscillators, ADSR
//! envelopes, frequency sweep, hard-sync, ring-modulation, a shared
//! state-variable filter, overdrive and reverb.
//!
//! All state is mutated only through [`registers::AudioRegisterDevice`],
//! the MMIO-facing adapter — there is no other API surface a CPU can
//! reach, matching the register-only contract the distilled spec sets out
//! for this subsystem.

mod effects;
mod envelope;
mod filter;
pub mod registers;
pub mod ring;
mod voice;

use effects::{overdrive, Reverb};
use filter::StateVariableFilter;
pub use voice::{NoiseMode, Voice, Waveform};

pub const VOICE_COUNT: usize = 4;

pub struct AudioEngine {
    pub voices: [Voice; VOICE_COUNT],
    pub filter: StateVariableFilter,
    reverb: Reverb,
    pub overdrive_level: u8,
    pub master_enable: bool,
    pub sample_rate: f64,
}

impl AudioEngine {
    pub fn new(sample_rate: f64) -> Self {
        let mut voices: [Voice; VOICE_COUNT] = std::array::from_fn(|_| Voice::new());
        voices[1].kind = Waveform::Triangle;
        voices[2].kind = Waveform::Sine;
        voices[3].kind = Waveform::Noise;
        AudioEngine {
            voices,
            filter: StateVariableFilter::new(),
            reverb: Reverb::new(sample_rate),
            overdrive_level: 0,
            master_enable: false,
            sample_rate,
        }
    }

    pub fn reset(&mut self) {
        for v in &mut self.voices {
            v.reset();
        }
        self.filter.reset();
        self.reverb.reset();
        self.overdrive_level = 0;
        self.master_enable = false;
    }

    pub fn reverb_mut(&mut self) -> &mut Reverb {
        &mut self.reverb
    }

    fn sync_edges(&self) -> [Option<usize>; VOICE_COUNT] {
        std::array::from_fn(|i| self.voices[i].sync_source)
    }

    fn ring_edges(&self) -> [Option<usize>; VOICE_COUNT] {
        std::array::from_fn(|i| self.voices[i].ring_source)
    }

    fn creates_cycle(edges: &[Option<usize>; VOICE_COUNT], start: usize) -> bool {
        let mut cur = edges[start];
        for _ in 0..VOICE_COUNT {
            match cur {
                Some(n) if n == start => return true,
                Some(n) => cur = edges[n],
                None => return false,
            }
        }
        false
    }

    /// Depth-bounded-DFS-guarded write to a voice's sync source. Self-
    /// reference and cyclic dependency graphs are rejected and logged,
    /// leaving the previous source in place.
    pub fn set_sync_source(&mut self, voice: usize, source: Option<usize>) {
        if let Some(s) = source {
            if s == voice {
                log::warn!("audio: rejected self-sync write on voice {voice}");
                return;
            }
            let mut edges = self.sync_edges();
            edges[voice] = Some(s);
            if Self::creates_cycle(&edges, voice) {
                log::warn!("audio: rejected cyclic sync graph (voice {voice} -> {s})");
                return;
            }
        }
        self.voices[voice].sync_source = source;
    }

    pub fn set_ring_source(&mut self, voice: usize, source: Option<usize>) {
        if let Some(s) = source {
            if s == voice {
                log::warn!("audio: rejected self-ring-mod write on voice {voice}");
                return;
            }
            let mut edges = self.ring_edges();
            edges[voice] = Some(s);
            if Self::creates_cycle(&edges, voice) {
                log::warn!("audio: rejected cyclic ring-mod graph (voice {voice} -> {s})");
                return;
            }
        }
        self.voices[voice].ring_source = source;
    }

    /// Produce exactly one sample in `[-1, 1]`. Used both to drive the
    /// scheduler's sample-debt loop and by [`Self::capture`] for tests.
    pub fn generate_sample(&mut self) -> f32 {
        if !self.master_enable {
            return 0.0;
        }
        let prev_wrapped: [bool; VOICE_COUNT] =
            std::array::from_fn(|i| self.voices[i].phase_wrapped);
        let sync_sources: [Option<usize>; VOICE_COUNT] = self.sync_edges();

        for i in 0..VOICE_COUNT {
            let sync_wrapped = sync_sources[i].map(|s| prev_wrapped[s]).unwrap_or(false);
            self.voices[i].advance_and_generate(self.sample_rate, sync_wrapped);
        }

        let raw_samples: [f32; VOICE_COUNT] = std::array::from_fn(|i| self.voices[i].raw_sample);
        let ring_sources: [Option<usize>; VOICE_COUNT] = self.ring_edges();
        let nyquist = self.sample_rate as f32 / 2.0;

        let mut sum = 0.0;
        for i in 0..VOICE_COUNT {
            let mut sample = self.voices[i].envelope_and_volume(self.sample_rate, nyquist);
            if let Some(src) = ring_sources[i] {
                sample *= raw_samples[src];
            }
            sum += sample;
        }
        let mix = sum / VOICE_COUNT as f32;

        let mod_sample = self.filter.mod_source.map(|s| raw_samples[s]).unwrap_or(0.0);
        let filtered = self.filter.process(mix, self.sample_rate, mod_sample);
        let driven = overdrive(filtered, self.overdrive_level);
        let reverbed = self.reverb.process(driven);
        reverbed.clamp(-1.0, 1.0)
    }

    /// Generate `n_samples` in one call — the single capture helper used
    /// by both short, single-scenario tests and longer sweep/hard-sync
    /// scenarios, parameterised by sample count rather than duplicated.
    pub fn capture(&mut self, n_samples: usize) -> Vec<f32> {
        (0..n_samples).map(|_| self.generate_sample()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_sync_write_is_rejected() {
        let mut engine = AudioEngine::new(44_100.0);
        engine.set_sync_source(0, Some(0));
        assert_eq!(engine.voices[0].sync_source, None);
    }

    #[test]
    fn cyclic_sync_graph_is_rejected() {
        let mut engine = AudioEngine::new(44_100.0);
        engine.set_sync_source(0, Some(1));
        engine.set_sync_source(1, Some(2));
        engine.set_sync_source(2, Some(0));
        assert_eq!(engine.voices[2].sync_source, None);
        assert_eq!(engine.voices[0].sync_source, Some(1));
    }

    #[test]
    fn disabled_master_produces_silence() {
        let mut engine = AudioEngine::new(44_100.0);
        engine.voices[0].kind = Waveform::Sine;
        engine.voices[0].frequency = 440.0;
        engine.voices[0].volume = 255;
        engine.voices[0].envelope.sustain_level = 1.0;
        assert_eq!(engine.generate_sample(), 0.0);
    }

    #[test]
    fn output_never_leaves_unit_bound() {
        let mut engine = AudioEngine::new(44_100.0);
        engine.master_enable = true;
        engine.overdrive_level = 255;
        engine.filter.kind = filter::FilterKind::BandPass;
        engine.filter.resonance = 255;
        for v in &mut engine.voices {
            v.kind = Waveform::Square;
            v.frequency = 440.0;
            v.volume = 255;
            v.enabled = true;
            v.set_gate(true);
            v.envelope.attack_ms = 0.0;
        }
        for sample in engine.capture(2000) {
            assert!((-1.0..=1.0).contains(&sample));
        }
    }

    #[test]
    fn square_a4_measures_near_440_hz() {
        let sample_rate = 44_100.0;
        let mut engine = AudioEngine::new(sample_rate);
        engine.master_enable = true;
        engine.voices[0].kind = Waveform::Square;
        engine.voices[0].frequency = 440.0;
        engine.voices[0].volume = 255;
        engine.voices[0].duty = 128;
        engine.voices[0].enabled = true;
        engine.voices[0].set_gate(true);
        engine.voices[0].envelope.attack_ms = 0.0;
        engine.voices[0].envelope.sustain_level = 1.0;

        let samples = engine.capture(4410);
        let mut crossings = 0;
        for w in samples.windows(2) {
            if w[0] <= 0.0 && w[1] > 0.0 {
                crossings += 1;
            }
        }
        let measured_hz = crossings as f64 * (sample_rate / 4410.0);
        assert!((measured_hz - 440.0).abs() < registers::FREQUENCY_TOLERANCE_HZ as f64);
    }
}
