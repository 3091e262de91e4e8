//! Master-bus effects: the overdrive saturator and the Schroeder reverb.

/// `x ↦ tanh(x · (1 + k))`, `k = overdrive_level / 255`.
pub fn overdrive(input: f32, level: u8) -> f32 {
    let k = level as f32 / 255.0;
    (input * (1.0 + k)).tanh()
}

struct Comb {
    buffer: Vec<f32>,
    pos: usize,
    feedback: f32,
}

impl Comb {
    fn new(delay_samples: usize) -> Self {
        Comb { buffer: vec![0.0; delay_samples.max(1)], pos: 0, feedback: 0.0 }
    }

    fn process(&mut self, input: f32) -> f32 {
        let out = self.buffer[self.pos];
        self.buffer[self.pos] = input + out * self.feedback;
        self.pos = (self.pos + 1) % self.buffer.len();
        out
    }

    fn reset(&mut self) {
        self.buffer.iter_mut().for_each(|s| *s = 0.0);
        self.pos = 0;
    }
}

struct AllPass {
    buffer: Vec<f32>,
    pos: usize,
    gain: f32,
}

impl AllPass {
    fn new(delay_samples: usize, gain: f32) -> Self {
        AllPass { buffer: vec![0.0; delay_samples.max(1)], pos: 0, gain }
    }

    fn process(&mut self, input: f32) -> f32 {
        let buffered = self.buffer[self.pos];
        let out = -input * self.gain + buffered;
        self.buffer[self.pos] = input + buffered * self.gain;
        self.pos = (self.pos + 1) % self.buffer.len();
        out
    }

    fn reset(&mut self) {
        self.buffer.iter_mut().for_each(|s| *s = 0.0);
        self.pos = 0;
    }
}

/// Four parallel comb filters feeding two series all-pass filters, in the
/// classic Schroeder arrangement.
pub struct Reverb {
    combs: [Comb; 4],
    allpasses: [AllPass; 2],
    pub mix: f32,
    pub decay: f32,
}

const COMB_DELAYS_MS: [f32; 4] = [29.7, 37.1, 41.1, 43.7];
const ALLPASS_DELAYS_MS: [f32; 2] = [5.0, 1.7];

impl Reverb {
    pub fn new(sample_rate: f64) -> Self {
        let samples = |ms: f32| ((ms / 1000.0) * sample_rate as f32) as usize;
        Reverb {
            combs: COMB_DELAYS_MS.map(|ms| Comb::new(samples(ms))),
            allpasses: ALLPASS_DELAYS_MS.map(|ms| AllPass::new(samples(ms), 0.7)),
            mix: 0.0,
            decay: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.combs.iter_mut().for_each(Comb::reset);
        self.allpasses.iter_mut().for_each(AllPass::reset);
    }

    pub fn process(&mut self, input: f32) -> f32 {
        for comb in &mut self.combs {
            comb.feedback = self.decay;
        }
        let wet: f32 = self.combs.iter_mut().map(|c| c.process(input)).sum::<f32>() / 4.0;
        let wet = self.allpasses.iter_mut().fold(wet, |acc, ap| ap.process(acc));
        input * (1.0 - self.mix) + wet * self.mix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overdrive_stays_within_unit_bound() {
        for level in [0u8, 128, 255] {
            for i in -20..=20 {
                let x = i as f32 / 4.0;
                let out = overdrive(x, level);
                assert!((-1.0..=1.0).contains(&out));
            }
        }
    }

    #[test]
    fn reverb_mix_zero_is_dry_passthrough() {
        let mut r = Reverb::new(44_100.0);
        r.mix = 0.0;
        assert_eq!(r.process(0.5), 0.5);
    }

    #[test]
    fn reverb_output_stays_bounded_over_time() {
        let mut r = Reverb::new(44_100.0);
        r.mix = 0.5;
        r.decay = 0.5;
        for i in 0..5000 {
            let input = (i as f32 * 0.01).sin();
            let out = r.process(input);
            assert!(out.is_finite());
        }
    }
}
