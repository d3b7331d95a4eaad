use crate::{
    dsp::{
        envelope::Automation,
        pan::{equal_power_gains, pan_stereo_frame},
    },
    graph::node::{GraphNode, Modulatable, RenderCtx, StereoNode},
};

/*
Stereo Placement
================

Three ways to turn a signal into stereo:

  Centered       mono → same signal on both sides
  Panner         mono → equal-power placement between left and right
  StereoPanner   stereo → shift the whole image left or right

Panning is what spreads a rainforest out: every bird call, raindrop and
thunder clap gets its own random position, so the events surround the
listener instead of stacking in the middle.

  let chirp = OscNode::sine().with_frequency(2400.0)
      .amplify(GainNode::new(envelope))
      .pan(-0.6);                 // mostly left

The position is evaluated once per block (automation at the block start
plus modulation), which is plenty for the slow auto-pan an LFO can drive.
*/

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanParam {
    Position,
}

/// Equal-power panner for a mono source.
pub struct Panner<N> {
    input: N,
    position: Automation,
    offset: f32,
}

impl<N> Panner<N> {
    pub fn new(input: N, position: impl Into<Automation>) -> Self {
        Self {
            input,
            position: position.into(),
            offset: 0.0,
        }
    }

    fn position_at(&self, time: f64) -> f32 {
        (self.position.value_at(time) + self.offset).clamp(-1.0, 1.0)
    }
}

impl<N: GraphNode> StereoNode for Panner<N> {
    fn render_stereo(&mut self, left: &mut [f32], right: &mut [f32], ctx: &RenderCtx) {
        self.input.render_block(left, ctx);
        let (gain_l, gain_r) = equal_power_gains(self.position_at(ctx.time));
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let sample = *l;
            *l = sample * gain_l;
            *r = sample * gain_r;
        }
    }

    fn is_active(&self, from: f64, to: f64) -> bool {
        self.input.is_active(from, to)
    }
}

impl<N: Send> Modulatable for Panner<N> {
    type Param = PanParam;

    fn get_param(&self, _param: Self::Param, time: f64) -> f32 {
        self.position.value_at(time)
    }

    fn apply_modulation(&mut self, _param: Self::Param, offset: f32) {
        self.offset += offset;
    }

    fn clear_modulation(&mut self) {
        self.offset = 0.0;
    }
}

/// Moves the image of a stereo source.
pub struct StereoPanner<N> {
    input: N,
    position: Automation,
    offset: f32,
}

impl<N> StereoPanner<N> {
    pub fn new(input: N, position: impl Into<Automation>) -> Self {
        Self {
            input,
            position: position.into(),
            offset: 0.0,
        }
    }
}

impl<N: StereoNode> StereoNode for StereoPanner<N> {
    fn render_stereo(&mut self, left: &mut [f32], right: &mut [f32], ctx: &RenderCtx) {
        self.input.render_stereo(left, right, ctx);
        let pan = (self.position.value_at(ctx.time) + self.offset).clamp(-1.0, 1.0);
        if pan == 0.0 {
            return;
        }
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            (*l, *r) = pan_stereo_frame(*l, *r, pan);
        }
    }

    fn is_active(&self, from: f64, to: f64) -> bool {
        self.input.is_active(from, to)
    }
}

impl<N: Send> Modulatable for StereoPanner<N> {
    type Param = PanParam;

    fn get_param(&self, _param: Self::Param, time: f64) -> f32 {
        self.position.value_at(time)
    }

    fn apply_modulation(&mut self, _param: Self::Param, offset: f32) {
        self.offset += offset;
    }

    fn clear_modulation(&mut self) {
        self.offset = 0.0;
    }
}

/// Mono source copied to both channels.
pub struct Centered<N> {
    input: N,
}

impl<N> Centered<N> {
    pub fn new(input: N) -> Self {
        Self { input }
    }
}

impl<N: GraphNode> StereoNode for Centered<N> {
    fn render_stereo(&mut self, left: &mut [f32], right: &mut [f32], ctx: &RenderCtx) {
        self.input.render_block(left, ctx);
        right.copy_from_slice(left);
    }

    fn is_active(&self, from: f64, to: f64) -> bool {
        self.input.is_active(from, to)
    }
}
