//! Noise generators.
//!
//! All three colors start from uniform white noise and differ only in how
//! much of the high end survives:
//!
//! | color | spectrum        | built from                          |
//! | ----- | --------------- | ----------------------------------- |
//! | white | flat            | uniform samples in [-1, 1]          |
//! | pink  | -3 dB / octave  | Paul Kellet's 7-term filter         |
//! | brown | -6 dB / octave  | leaky integrator                    |
//!
//! The output gains (0.11 for pink, 3.5 for brown) bring the filtered signals
//! back to roughly the same loudness as white noise.

use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseColor {
    White,
    Pink,
    Brown,
}

const PINK_GAIN: f32 = 0.11;
const BROWN_GAIN: f32 = 3.5;

/// Kellet's economy pink filter: six one-pole sections plus a one-sample
/// delayed white term.
#[derive(Debug, Default, Clone)]
pub struct PinkFilter {
    b: [f32; 7],
}

impl PinkFilter {
    #[inline]
    pub fn next_sample(&mut self, white: f32) -> f32 {
        let b = &mut self.b;
        b[0] = 0.99886 * b[0] + white * 0.055_517_9;
        b[1] = 0.99332 * b[1] + white * 0.075_075_9;
        b[2] = 0.96900 * b[2] + white * 0.153_852;
        b[3] = 0.86650 * b[3] + white * 0.310_485_6;
        b[4] = 0.55000 * b[4] + white * 0.532_952_2;
        b[5] = -0.7616 * b[5] - white * 0.016_898;
        let out = b[0] + b[1] + b[2] + b[3] + b[4] + b[5] + b[6] + white * 0.5362;
        b[6] = white * 0.115_926;
        out * PINK_GAIN
    }
}

/// Leaky integrator turning white noise into brown (red) noise.
#[derive(Debug, Default, Clone)]
pub struct BrownFilter {
    last: f32,
}

impl BrownFilter {
    #[inline]
    pub fn next_sample(&mut self, white: f32) -> f32 {
        self.last = (self.last + 0.02 * white) / 1.02;
        self.last * BROWN_GAIN
    }
}

/// Number of samples covering `duration` seconds at `sample_rate`.
pub fn buffer_len(sample_rate: u32, duration: f64) -> usize {
    if !(duration > 0.0) || !duration.is_finite() {
        return 0;
    }
    (sample_rate as f64 * duration).round() as usize
}

#[inline]
fn white_sample<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen_range(-1.0f32..=1.0)
}

pub fn generate_white_noise<R: Rng + ?Sized>(
    rng: &mut R,
    sample_rate: u32,
    duration: f64,
) -> Vec<f32> {
    let len = buffer_len(sample_rate, duration);
    (0..len).map(|_| white_sample(rng)).collect()
}

pub fn generate_pink_noise<R: Rng + ?Sized>(
    rng: &mut R,
    sample_rate: u32,
    duration: f64,
) -> Vec<f32> {
    let len = buffer_len(sample_rate, duration);
    let mut filter = PinkFilter::default();
    (0..len).map(|_| filter.next_sample(white_sample(rng))).collect()
}

pub fn generate_brown_noise<R: Rng + ?Sized>(
    rng: &mut R,
    sample_rate: u32,
    duration: f64,
) -> Vec<f32> {
    let len = buffer_len(sample_rate, duration);
    let mut filter = BrownFilter::default();
    (0..len).map(|_| filter.next_sample(white_sample(rng))).collect()
}

pub fn generate_noise<R: Rng + ?Sized>(
    color: NoiseColor,
    rng: &mut R,
    sample_rate: u32,
    duration: f64,
) -> Vec<f32> {
    match color {
        NoiseColor::White => generate_white_noise(rng, sample_rate, duration),
        NoiseColor::Pink => generate_pink_noise(rng, sample_rate, duration),
        NoiseColor::Brown => generate_brown_noise(rng, sample_rate, duration),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn rms(samples: &[f32]) -> f32 {
        (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
    }

    /// Mean absolute difference between neighbours; small for dark noise.
    fn roughness(samples: &[f32]) -> f32 {
        samples.windows(2).map(|w| (w[1] - w[0]).abs()).sum::<f32>() / (samples.len() - 1) as f32
    }

    #[test]
    fn length_is_rounded_duration() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(generate_white_noise(&mut rng, 44_100, 1.0).len(), 44_100);
        assert_eq!(generate_pink_noise(&mut rng, 1000, 0.0125).len(), 13);
        assert_eq!(generate_brown_noise(&mut rng, 1000, 0.0).len(), 0);
        assert_eq!(buffer_len(48_000, f64::NAN), 0);
    }

    #[test]
    fn white_noise_is_bounded_and_centered() {
        let mut rng = StdRng::seed_from_u64(7);
        let noise = generate_white_noise(&mut rng, 44_100, 1.0);
        assert!(noise.iter().all(|s| (-1.0..=1.0).contains(s)));
        let mean = noise.iter().sum::<f32>() / noise.len() as f32;
        assert!(mean.abs() < 0.02, "mean {mean}");
    }

    #[test]
    fn pink_and_brown_stay_bounded() {
        let mut rng = StdRng::seed_from_u64(11);
        let pink = generate_pink_noise(&mut rng, 44_100, 2.0);
        let brown = generate_brown_noise(&mut rng, 44_100, 2.0);
        assert!(pink.iter().all(|s| s.is_finite() && s.abs() < 1.5));
        assert!(brown.iter().all(|s| s.is_finite() && s.abs() < 3.5));
        assert!(rms(&pink) > 0.01);
        assert!(rms(&brown) > 0.01);
    }

    #[test]
    fn darker_colors_are_smoother() {
        let mut rng = StdRng::seed_from_u64(3);
        let white = generate_white_noise(&mut rng, 44_100, 1.0);
        let pink = generate_pink_noise(&mut rng, 44_100, 1.0);
        let brown = generate_brown_noise(&mut rng, 44_100, 1.0);

        let white_r = roughness(&white) / rms(&white);
        let pink_r = roughness(&pink) / rms(&pink);
        let brown_r = roughness(&brown) / rms(&brown);
        assert!(white_r > pink_r, "white {white_r} pink {pink_r}");
        assert!(pink_r > brown_r, "pink {pink_r} brown {brown_r}");
    }

    #[test]
    fn same_seed_same_noise() {
        let a = generate_pink_noise(&mut StdRng::seed_from_u64(42), 8000, 0.5);
        let b = generate_pink_noise(&mut StdRng::seed_from_u64(42), 8000, 0.5);
        assert_eq!(a, b);
    }
}
