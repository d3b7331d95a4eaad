use crate::{
    dsp::envelope::Automation,
    graph::node::{GraphNode, Modulatable, RenderCtx},
};

/*
Gain Curve
==========

A control signal: renders its automation curve (plus any modulation) as a
stream of gain values. It makes no sound on its own. Multiply a signal by
it with `.amplify()`:

  // Thunder roll: swell to 0.15 in 0.4 s, decay to -80 dB by 4 s
  let roll = NoiseNode::once(brown)
      .through(FilterNode::lowpass(60.0))
      .amplify(GainNode::new(Automation::starting_at(0.0)
          .linear_to(0.15, 0.4)
          .exponential_to(0.0001, 4.0)));

  // Tremolo: 0.2 ± 0.06 at 0.03 Hz
  let drone = partials.amplify(
      GainNode::constant(0.2).modulate(LfoNode::sine(0.03), GainParam::Gain, 0.06));

This is the counterpart of an envelope generator, but driven by absolute
time rather than note events: every event in a procedural texture is
scheduled up front.
*/

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GainParam {
    Gain,
}

pub struct GainNode {
    curve: Automation,
    cursor: usize,
    offset: f32,
    modulated: bool,
}

impl GainNode {
    pub fn new(curve: impl Into<Automation>) -> Self {
        Self {
            curve: curve.into(),
            cursor: 0,
            offset: 0.0,
            modulated: false,
        }
    }

    pub fn constant(gain: f32) -> Self {
        Self::new(gain)
    }

    pub fn curve(&self) -> &Automation {
        &self.curve
    }
}

impl GraphNode for GainNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.curve
            .fill(out, ctx.time, ctx.sample_rate, &mut self.cursor);
        if self.offset != 0.0 {
            for value in out.iter_mut() {
                *value += self.offset;
            }
        }
    }

    fn is_active(&self, from: f64, to: f64) -> bool {
        self.modulated || !self.curve.is_silent_between(from, to)
    }
}

impl Modulatable for GainNode {
    type Param = GainParam;

    fn get_param(&self, _param: Self::Param, time: f64) -> f32 {
        self.curve.value_at(time)
    }

    fn apply_modulation(&mut self, _param: Self::Param, offset: f32) {
        self.offset += offset;
        self.modulated = true;
    }

    fn clear_modulation(&mut self) {
        self.offset = 0.0;
    }
}
