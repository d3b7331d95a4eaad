use std::f64::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Phase Accumulator
=================

Every periodic waveform here is a function of phase, a number in [0, 1) that
advances by `frequency / sample_rate` each sample and wraps around:

    phase:  0.0 ──────────────→ 1.0 (wraps to 0.0)
    sine:   0 → +1 → 0 → -1 → 0
    saw:    0 → +1 | -1 → 0      (resets halfway through the cycle)
    square: +1 ...... | -1 ......
    tri:    0 → +1 → 0 → -1 → 0  (straight lines)

All four start at the same point of the cycle as their browser
counterparts, so a sine started at t0 is sin(2π f (t - t0)).

The phase is kept in f64. Over a 15 second render at 44.1 kHz a f32 phase
picks up audible drift on slow LFOs.

The waveforms are not band-limited. The textures rendered here stay well
below Nyquist for the harmonic-rich shapes, so the aliasing is inaudible.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    /// Waveform value at `phase` (in cycles, [0, 1)).
    #[inline]
    pub fn sample(self, phase: f64) -> f32 {
        match self {
            Waveform::Sine => (TAU * phase).sin() as f32,
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => {
                let shifted = phase + 0.5;
                (2.0 * (shifted - shifted.floor()) - 1.0) as f32
            }
            Waveform::Triangle => {
                let value = if phase < 0.25 {
                    4.0 * phase
                } else if phase < 0.75 {
                    2.0 - 4.0 * phase
                } else {
                    4.0 * phase - 4.0
                };
                value as f32
            }
        }
    }
}

pub struct OscillatorBlock {
    waveform: Waveform,
    phase: f64,
}

impl OscillatorBlock {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
        }
    }

    pub fn sine() -> Self {
        Self::new(Waveform::Sine)
    }

    pub fn sawtooth() -> Self {
        Self::new(Waveform::Sawtooth)
    }

    pub fn square() -> Self {
        Self::new(Waveform::Square)
    }

    pub fn triangle() -> Self {
        Self::new(Waveform::Triangle)
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let value = self.waveform.sample(self.phase);
        self.phase += frequency as f64 / sample_rate as f64;
        self.phase -= self.phase.floor();
        value
    }

    /// Fill `out` at a fixed frequency.
    pub fn render(&mut self, out: &mut [f32], frequency: f32, sample_rate: f32) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(frequency, sample_rate);
        }
    }

    /// Fill `out` following a per-sample frequency track. `out` and
    /// `frequencies` must be the same length.
    pub fn render_tracking(&mut self, out: &mut [f32], frequencies: &[f32], sample_rate: f32) {
        for (sample, &frequency) in out.iter_mut().zip(frequencies) {
            *sample = self.next_sample(frequency, sample_rate);
        }
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}
