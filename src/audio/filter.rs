//! A two-pole state-variable filter with independently available low-pass,
//! high-pass and band-pass outputs, the classic Chamberlin topology.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Off,
    LowPass,
    HighPass,
    BandPass,
}

pub struct StateVariableFilter {
    pub kind: FilterKind,
    pub cutoff: u8,
    pub resonance: u8,
    pub mod_source: Option<usize>,
    pub mod_amount: u8,
    low: f32,
    band: f32,
}

impl StateVariableFilter {
    pub fn new() -> Self {
        StateVariableFilter {
            kind: FilterKind::Off,
            cutoff: 128,
            resonance: 0,
            mod_source: None,
            mod_amount: 0,
            low: 0.0,
            band: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.low = 0.0;
        self.band = 0.0;
    }

    fn q(&self) -> f32 {
        0.5 + (self.resonance as f32 / 255.0) * 9.5
    }

    /// Process one sample. `mod_sample` is the current sample of this
    /// filter's modulation source voice, if any, already selected by the
    /// caller (the engine resolves `mod_source` into a sample value).
    pub fn process(&mut self, input: f32, sample_rate: f64, mod_sample: f32) -> f32 {
        if self.kind == FilterKind::Off {
            return input;
        }
        let nyquist = sample_rate as f32 / 2.0;
        let base_cutoff = (self.cutoff as f32 / 255.0) * nyquist;
        let modulated = (base_cutoff + (self.mod_amount as f32 / 255.0) * mod_sample * nyquist)
            .clamp(1.0, nyquist - 1.0);
        let f = 2.0 * (std::f32::consts::PI * modulated / sample_rate as f32).sin();
        let q_inv = 1.0 / self.q();

        let high = input - self.low - q_inv * self.band;
        self.band += f * high;
        self.low += f * self.band;

        match self.kind {
            FilterKind::LowPass => self.low,
            FilterKind::HighPass => high,
            FilterKind::BandPass => self.band,
            FilterKind::Off => input,
        }
    }
}

impl Default for StateVariableFilter {
    fn default() -> Self {
        Self::new()
    }
}
