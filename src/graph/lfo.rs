use crate::{
    dsp::oscillator::OscillatorBlock,
    graph::node::{GraphNode, RenderCtx},
};

/*
LFO (Low Frequency Oscillator)
==============================

An LFO is an oscillator that runs well below the audible range to move a
parameter over time. The ambient textures use very slow ones: a cosmic
background filter drifting at 0.015 Hz completes one sweep a minute.

  Rate        Period     Heard as
  0.01 Hz     100 s      Slow evolution, barely noticed
  0.1-0.3 Hz  3-10 s     Wind gusts, breathing filters
  1-7 Hz      0.15-1 s   Pulsing, insect trills, tremolo

Common uses in the presets:

  Wind:         LFO → bandpass cutoff (gusts)
  Rain:         LFO → gain (intensity swells)
  Insects:      square LFO → gain (chirping)
  Drones:       LFO → detune (shimmer), LFO → gain (tremolo)
  Aurora:       LFO → oscillator frequency (wavering tones)

Output swings in [-1, +1]. Use `.modulate()` with a depth to scale it into
the parameter's unit.

  // Gusting wind: cutoff sweeps 450-750 Hz every ~8 s
  let wind = NoiseNode::looped(pink)
      .through(FilterNode::bandpass(600.0, 2.0)
          .modulate(LfoNode::sine(0.12), FilterParam::Cutoff, 150.0));
*/

pub struct LfoNode {
    osc: OscillatorBlock,
    frequency: f32,
}

impl LfoNode {
    pub fn sine(frequency: f32) -> Self {
        Self {
            osc: OscillatorBlock::sine(),
            frequency,
        }
    }

    pub fn sawtooth(frequency: f32) -> Self {
        Self {
            osc: OscillatorBlock::sawtooth(),
            frequency,
        }
    }

    pub fn square(frequency: f32) -> Self {
        Self {
            osc: OscillatorBlock::square(),
            frequency,
        }
    }

    pub fn triangle(frequency: f32) -> Self {
        Self {
            osc: OscillatorBlock::triangle(),
            frequency,
        }
    }

    pub fn with_waveform(waveform: crate::dsp::Waveform, frequency: f32) -> Self {
        Self {
            osc: OscillatorBlock::new(waveform),
            frequency,
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }
}

impl GraphNode for LfoNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.osc.render(out, self.frequency, ctx.sample_rate);
    }
}
