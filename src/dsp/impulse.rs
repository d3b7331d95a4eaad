use rand::Rng;

use crate::dsp::noise::buffer_len;

/*
Generated Impulse Responses
===========================

A real room's impulse response is what a microphone hears after a single
click: a dense cloud of reflections that dies away. Noise shaped by a
decaying envelope is a good stand-in:

    ir[n] = noise[n] × (1 - n / len) ^ decay

  seconds   Length of the tail. 2 s is a hall, 10 s is a cathedral that
            never ends.
  decay     Curve exponent. 1 fades linearly; 4-7 drop quickly and leave a
            long quiet tail.

Reversing the envelope (`(n / len) ^ decay`) makes the tail swell towards
the end instead of fading. Convolved with a drone, that gives the sucking
"swoosh" used by the black hole and quasar sounds.

Each channel gets its own noise, so a stereo IR decorrelates the two sides
and widens a mono source.
*/

/// Stereo impulse response.
#[derive(Debug, Clone)]
pub struct ImpulseResponse {
    pub left: Vec<f32>,
    pub right: Vec<f32>,
}

const GAIN_CALIBRATION: f32 = 0.001_25;
const GAIN_CALIBRATION_SAMPLE_RATE: f32 = 44_100.0;
const MIN_POWER: f32 = 0.000_125;

impl ImpulseResponse {
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    pub fn channels(&self) -> [&[f32]; 2] {
        [&self.left, &self.right]
    }

    /// Drop everything past `len` samples.
    pub fn truncate(&mut self, len: usize) {
        self.left.truncate(len);
        self.right.truncate(len);
    }

    /// Scale that brings the response to a standard loudness, so reverbs of
    /// different lengths sit at a comparable level.
    ///
    /// The scale is inversely proportional to the RMS power of the whole
    /// response, with a floor on the power so near-silent responses don't
    /// explode.
    pub fn normalization_scale(&self, sample_rate: f32) -> f32 {
        let total = (self.left.len() + self.right.len()) as f32;
        if total == 0.0 {
            return 1.0;
        }
        let energy: f32 = self
            .left
            .iter()
            .chain(self.right.iter())
            .map(|s| s * s)
            .sum();
        let mut power = (energy / total).sqrt();
        if !power.is_finite() || power < MIN_POWER {
            power = MIN_POWER;
        }
        (1.0 / power) * GAIN_CALIBRATION * (GAIN_CALIBRATION_SAMPLE_RATE / sample_rate)
    }

    /// Apply `normalization_scale` in place.
    pub fn normalize(&mut self, sample_rate: f32) {
        let scale = self.normalization_scale(sample_rate);
        for sample in self.left.iter_mut().chain(self.right.iter_mut()) {
            *sample *= scale;
        }
    }
}

/// Build a stereo noise tail of `seconds` shaped by `(1 - n/len)^decay`.
pub fn generate_impulse_response<R: Rng + ?Sized>(
    rng: &mut R,
    sample_rate: u32,
    seconds: f64,
    decay: f32,
    reverse: bool,
) -> ImpulseResponse {
    let len = buffer_len(sample_rate, seconds);
    let mut left = Vec::with_capacity(len);
    let mut right = Vec::with_capacity(len);

    for i in 0..len {
        let n = if reverse { len - i } else { i };
        let envelope = (1.0 - n as f32 / len as f32).powf(decay);
        left.push(rng.gen_range(-1.0f32..=1.0) * envelope);
        right.push(rng.gen_range(-1.0f32..=1.0) * envelope);
    }

    ImpulseResponse { left, right }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn energy(samples: &[f32]) -> f32 {
        samples.iter().map(|s| s * s).sum()
    }

    #[test]
    fn forward_response_decays() {
        let mut rng = StdRng::seed_from_u64(7);
        let ir = generate_impulse_response(&mut rng, 8_000, 1.0, 3.0, false);
        assert_eq!(ir.len(), 8_000);
        let quarter = ir.len() / 4;
        assert!(energy(&ir.left[..quarter]) > energy(&ir.left[3 * quarter..]) * 10.0);
    }

    #[test]
    fn reversed_response_swells() {
        let mut rng = StdRng::seed_from_u64(7);
        let ir = generate_impulse_response(&mut rng, 8_000, 1.0, 3.0, true);
        let quarter = ir.len() / 4;
        assert!(energy(&ir.right[3 * quarter..]) > energy(&ir.right[..quarter]) * 10.0);
        // The reversed envelope is exactly zero at the first sample.
        assert_eq!(ir.left[0], 0.0);
    }

    #[test]
    fn samples_stay_in_unit_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let ir = generate_impulse_response(&mut rng, 4_000, 0.5, 1.0, false);
        assert!(ir.left.iter().chain(&ir.right).all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn normalization_floors_silent_power() {
        let silent = ImpulseResponse {
            left: vec![0.0; 16],
            right: vec![0.0; 16],
        };
        let scale = silent.normalization_scale(44_100.0);
        assert!((scale - GAIN_CALIBRATION / MIN_POWER).abs() < 1e-3);
    }

    #[test]
    fn normalization_is_inverse_to_power() {
        let loud = ImpulseResponse {
            left: vec![0.5; 16],
            right: vec![0.5; 16],
        };
        let quiet = ImpulseResponse {
            left: vec![0.25; 16],
            right: vec![0.25; 16],
        };
        let ratio = quiet.normalization_scale(44_100.0) / loud.normalization_scale(44_100.0);
        assert!((ratio - 2.0).abs() < 1e-4);
    }
}
