use std::{ops::Deref, sync::Arc};

use rustfft::{num_complex::Complex, Fft, FftPlanner};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::AnalyserConfig;

/*
Spectrum Analyser
=================

Turns the most recent `fft_size` samples into one byte per frequency bin,
the same encoding a browser analyser node hands out:

  samples ──→ Blackman window ──→ FFT ──→ |X[k]| / N ──→ smoothing ──→ dB ──→ byte
                                                           │
                                   previous frame ─────────┘

  smoothing   X̂[k] = τ·X̂_prev[k] + (1 - τ)·|X[k]|, with τ the configured
              smoothing constant. τ = 0 disables it.

  dB → byte   min_db maps to 0 and max_db to 255, linearly. Anything outside
              the range is clamped, so a silent bin reads 0 and a clipping
              one 255.

Only the first half of the spectrum is kept (fft_size / 2 bins); the rest
mirrors it for real input.

Bin k covers the frequency k × sample_rate / fft_size.
*/

/// One frame of byte-encoded magnitudes, one per bin.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpectralFrame(Vec<u8>);

impl SpectralFrame {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn bin_count(&self) -> usize {
        self.0.len()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for SpectralFrame {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for SpectralFrame {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// What the analyser produced for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyserFrame {
    pub spectrum: SpectralFrame,
    /// The samples the spectrum was taken from.
    pub time_domain: Vec<f32>,
}

/// Windowed FFT magnitude analyser with temporal smoothing.
pub struct Analyser {
    config: AnalyserConfig,
    /// Blackman window coefficients
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// Smoothed linear magnitudes from the previous frame
    smoothed: Vec<f32>,
}

impl std::fmt::Debug for Analyser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyser")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Analyser {
    /// `config` should already be validated; an FFT size below 2 is raised
    /// to 2.
    pub fn new(config: AnalyserConfig) -> Self {
        let size = config.fft_size.max(2);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);

        let window = (0..size)
            .map(|i| {
                let phase = 2.0 * std::f32::consts::PI * i as f32 / size as f32;
                0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos()
            })
            .collect();

        Self {
            config: AnalyserConfig {
                fft_size: size,
                ..config
            },
            window,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); size],
            smoothed: vec![0.0; size / 2],
        }
    }

    pub fn config(&self) -> &AnalyserConfig {
        &self.config
    }

    pub fn fft_size(&self) -> usize {
        self.window.len()
    }

    pub fn bin_count(&self) -> usize {
        self.smoothed.len()
    }

    /// Analyse the last `fft_size` samples of `samples`. Shorter input is
    /// zero-padded at the front.
    pub fn analyse(&mut self, samples: &[f32]) -> AnalyserFrame {
        let size = self.fft_size();
        let mut time_domain = vec![0.0; size];
        let take = samples.len().min(size);
        time_domain[size - take..].copy_from_slice(&samples[samples.len() - take..]);

        for ((bin, &sample), &w) in self.scratch.iter_mut().zip(&time_domain).zip(&self.window) {
            *bin = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        let tau = self.config.smoothing.clamp(0.0, 1.0);
        let scale = 1.0 / size as f32;
        let (min_db, max_db) = (self.config.min_db, self.config.max_db);
        let range = (max_db - min_db).max(f32::EPSILON);

        let bytes = self
            .smoothed
            .iter_mut()
            .zip(&self.scratch)
            .map(|(smoothed, bin)| {
                let magnitude = bin.norm() * scale;
                *smoothed = tau * *smoothed + (1.0 - tau) * magnitude;
                if !smoothed.is_finite() {
                    *smoothed = 0.0;
                }
                let db = 20.0 * smoothed.log10();
                (255.0 / range * (db - min_db)).clamp(0.0, 255.0) as u8
            })
            .collect();

        AnalyserFrame {
            spectrum: SpectralFrame(bytes),
            time_domain,
        }
    }

    /// Forget the smoothing history.
    pub fn reset(&mut self) {
        self.smoothed.fill(0.0);
    }
}
