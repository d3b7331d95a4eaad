use crate::dsp::{envelope::Automation, oscillator::{OscillatorBlock, Waveform}};
use crate::graph::node::{GraphNode, Modulatable, RenderCtx};
use crate::MAX_BLOCK_SIZE;

/*
Audio Oscillator
================

The tonal source of every procedural sound: a repeating waveform at a
frequency that can move over time.

Waveforms and where they show up:

  Sine      Pure tone, no overtones. Whale calls, drones, the pulsar pulse
            LFO, sub-bass rumbles.
  Triangle  Soft, weak odd harmonics. Raindrops, pulsar carrier, pings.
  Sawtooth  Every harmonic, bright and buzzy. Thunder claps, radio bursts.
  Square    Odd harmonics, hollow. Insect chirp modulation.

Frequency and detune
--------------------

Both are automation curves plus optional modulation:

    freq(t) = (frequency(t) + freq_mod) × 2^((detune(t) + detune_mod) / 1200)

Detune is in cents (100 cents = 1 semitone). Layers of the same partial
detuned by a few cents beat against each other slowly, which is what makes
the quasar and black hole drones shimmer.

A frequency curve with an exponential ramp (1000 Hz → 200 Hz over half a
second) gives the falling "whistler" tone of Jupiter's radio emissions.

Example usage:
  // Whale call: slow glide down and back up
  let call = OscNode::new(Waveform::Sine)
      .with_frequency(Automation::starting_at(90.0)
          .linear_to(60.0, 2.0)
          .linear_to(75.0, 3.0));

  // Shimmering partial with a slowly drifting detune
  let partial = OscNode::new(Waveform::Sine)
      .with_frequency(100.0)
      .with_detune(4.0)
      .modulate(LfoNode::sine(0.02), OscParam::Detune, 8.0);
*/

/// Parameters that can be modulated on an oscillator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OscParam {
    /// Oscillator frequency in Hz
    Frequency,
    /// Detune in cents (100 cents = 1 semitone)
    Detune,
}

pub struct OscNode {
    osc: OscillatorBlock,
    frequency: Automation,
    detune: Automation,
    frequency_cursor: usize,
    detune_cursor: usize,
    frequency_offset: f32,
    detune_offset: f32,
    freq_buffer: Vec<f32>,
    detune_buffer: Vec<f32>,
}

impl OscNode {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            osc: OscillatorBlock::new(waveform),
            frequency: Automation::constant(440.0),
            detune: Automation::constant(0.0),
            frequency_cursor: 0,
            detune_cursor: 0,
            frequency_offset: 0.0,
            detune_offset: 0.0,
            freq_buffer: vec![0.0; MAX_BLOCK_SIZE],
            detune_buffer: vec![0.0; MAX_BLOCK_SIZE],
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

    /// Frequency in Hz, fixed or automated.
    pub fn with_frequency(mut self, frequency: impl Into<Automation>) -> Self {
        self.frequency = frequency.into();
        self.frequency_cursor = 0;
        self
    }

    /// Detune in cents, fixed or automated.
    pub fn with_detune(mut self, cents: impl Into<Automation>) -> Self {
        self.detune = cents.into();
        self.detune_cursor = 0;
        self
    }
}

impl GraphNode for OscNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let len = out.len();
        let nyquist = ctx.sample_rate * 0.5;

        let freqs = &mut self.freq_buffer[..len];
        self.frequency
            .fill(freqs, ctx.time, ctx.sample_rate, &mut self.frequency_cursor);

        let detune_fixed = self.detune.is_constant() && self.detune_offset == 0.0;
        if detune_fixed && self.detune.initial() == 0.0 {
            for f in freqs.iter_mut() {
                *f = (*f + self.frequency_offset).clamp(0.0, nyquist);
            }
        } else {
            let cents = &mut self.detune_buffer[..len];
            self.detune
                .fill(cents, ctx.time, ctx.sample_rate, &mut self.detune_cursor);
            for (f, c) in freqs.iter_mut().zip(cents.iter()) {
                let ratio = 2.0_f32.powf((c + self.detune_offset) / 1200.0);
                *f = ((*f + self.frequency_offset) * ratio).clamp(0.0, nyquist);
            }
        }

        self.osc.render_tracking(out, freqs, ctx.sample_rate);
    }
}

impl Modulatable for OscNode {
    type Param = OscParam;

    fn get_param(&self, param: Self::Param, time: f64) -> f32 {
        match param {
            OscParam::Frequency => self.frequency.value_at(time),
            OscParam::Detune => self.detune.value_at(time),
        }
    }

    fn apply_modulation(&mut self, param: Self::Param, offset: f32) {
        match param {
            OscParam::Frequency => self.frequency_offset += offset,
            OscParam::Detune => self.detune_offset += offset,
        }
    }

    fn clear_modulation(&mut self) {
        self.frequency_offset = 0.0;
        self.detune_offset = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn valid_sine() {
        let sample_rate = 48_000.0;
        let ctx = RenderCtx::new(sample_rate);
        let mut osc = OscNode::sine().with_frequency(440.0);

        let mut buffer = vec![0.0f32; 128];
        osc.render_block(&mut buffer, &ctx);

        // sample n should be sin(2pi f n / sr)
        let sample_index = 12;
        let expected = (TAU * 440.0 * sample_index as f32 / sample_rate).sin();
        let actual = buffer[sample_index];
        assert!(
            (actual - expected).abs() < 1e-5,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn detune_of_one_octave_doubles_frequency() {
        let ctx = RenderCtx::new(48_000.0);
        let mut plain = OscNode::sawtooth().with_frequency(440.0);
        let mut shifted = OscNode::sawtooth().with_frequency(220.0).with_detune(1200.0);

        let mut a = vec![0.0; 256];
        let mut b = vec![0.0; 256];
        plain.render_block(&mut a, &ctx);
        shifted.render_block(&mut b, &ctx);
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-3);
        }
    }

    #[test]
    fn frequency_modulation_offsets_automation() {
        let ctx = RenderCtx::new(48_000.0);
        let mut modulated = OscNode::sine().with_frequency(400.0);
        modulated.apply_modulation(OscParam::Frequency, 40.0);
        let mut reference = OscNode::sine().with_frequency(440.0);

        let mut a = vec![0.0; 128];
        let mut b = vec![0.0; 128];
        modulated.render_block(&mut a, &ctx);
        reference.render_block(&mut b, &ctx);
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-4);
        }

        modulated.clear_modulation();
        assert_eq!(modulated.get_param(OscParam::Frequency, 0.0), 400.0);
    }

    #[test]
    fn frequency_follows_automation_across_blocks() {
        let sample_rate = 1_000.0;
        let osc = OscNode::sine().with_frequency(Automation::starting_at(100.0).linear_to(200.0, 1.0));
        assert_eq!(osc.get_param(OscParam::Frequency, 0.5), 150.0);

        let mut osc = osc;
        let mut buffer = vec![0.0; 500];
        osc.render_block(&mut buffer, &RenderCtx::new(sample_rate));
        osc.render_block(&mut buffer, &RenderCtx::new(sample_rate).at(0.5));
        assert!(buffer.iter().all(|s| s.is_finite() && s.abs() <= 1.0));
    }
}
