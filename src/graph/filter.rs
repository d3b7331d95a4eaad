use crate::{
    dsp::{
        envelope::Automation,
        filter::{FilterType, SVFilter, DEFAULT_Q},
    },
    graph::node::{GraphNode, Modulatable, RenderCtx},
    MAX_BLOCK_SIZE,
};

/*
State-Variable Filter (SVF)
===========================

Filters turn flat noise into everything the ambient textures are made of:
the same pink noise becomes rain, wind, insects or the cosmic background
depending on which band survives.

Filter Types and the Sounds They Make:
--------------------------------------

Lowpass (LP): keeps the low end.
  - Brown noise through 40-70 Hz lowpass: thunder rumble
  - Pink noise through 250 Hz lowpass: cosmic microwave background

Highpass (HP): keeps the top end.
  - Pink noise above ~2 kHz: rain hiss, geyser steam

Bandpass (BP): keeps a band around the cutoff.
  - Wide band (Q 1.5-3) swept by an LFO: wind
  - Narrow band (Q 10-25): insects, solar wind whistle, pulsar ring

Notch: removes a band around the cutoff.

Parameters:
-----------

Cutoff (Hz): where the filter acts. Automatable (a thunder roll closes its
lowpass from 60 Hz to 20 Hz as it fades) and modulatable.

Q: resonance for LP/HP (0.707 is flat), selectivity for BP/notch
(centre / bandwidth). Modulation of Q is applied once per block.

The filter works in place: it filters whatever is already in the buffer.
Put it after a source with `.through()`:

  let rain = NoiseNode::looped(pink)
      .through(FilterNode::highpass(2000.0).with_q(1.2));

  let wind = NoiseNode::looped(pink)
      .through(FilterNode::bandpass(600.0, 2.0)
          .modulate(LfoNode::sine(0.12), FilterParam::Cutoff, 200.0));
*/

const MIN_CUTOFF_HZ: f32 = 10.0;
const MIN_Q: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterParam {
    Cutoff,
    Q,
}

pub struct FilterNode {
    filter: SVFilter,
    cutoff: Automation,
    q: Automation,
    cutoff_cursor: usize,
    cutoff_offset: f32,
    q_offset: f32,
    cutoff_buffer: Vec<f32>,
}

impl FilterNode {
    pub fn new(
        filter_type: FilterType,
        cutoff_hz: impl Into<Automation>,
        q: impl Into<Automation>,
    ) -> Self {
        let cutoff = cutoff_hz.into();
        let q = q.into();
        Self {
            filter: SVFilter::new(filter_type, cutoff.initial(), q.initial()),
            cutoff,
            q,
            cutoff_cursor: 0,
            cutoff_offset: 0.0,
            q_offset: 0.0,
            cutoff_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn lowpass(cutoff_hz: impl Into<Automation>) -> Self {
        Self::new(FilterType::LowPass, cutoff_hz, DEFAULT_Q)
    }

    pub fn highpass(cutoff_hz: impl Into<Automation>) -> Self {
        Self::new(FilterType::HighPass, cutoff_hz, DEFAULT_Q)
    }

    pub fn bandpass(cutoff_hz: impl Into<Automation>, q: f32) -> Self {
        Self::new(FilterType::BandPass, cutoff_hz, q)
    }

    pub fn notch(cutoff_hz: impl Into<Automation>, q: f32) -> Self {
        Self::new(FilterType::Notch, cutoff_hz, q)
    }

    pub fn with_q(mut self, q: impl Into<Automation>) -> Self {
        self.q = q.into();
        self
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter.filter_type()
    }
}

impl GraphNode for FilterNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let len = out.len();
        let q = (self.q.value_at(ctx.time) + self.q_offset).max(MIN_Q);
        self.filter.set_q(q);

        if self.cutoff.is_constant() {
            let cutoff = (self.cutoff.initial() + self.cutoff_offset).max(MIN_CUTOFF_HZ);
            self.filter.set_cutoff(cutoff);
            self.filter.render(out, ctx.sample_rate);
            return;
        }

        let cutoffs = &mut self.cutoff_buffer[..len];
        self.cutoff
            .fill(cutoffs, ctx.time, ctx.sample_rate, &mut self.cutoff_cursor);
        for c in cutoffs.iter_mut() {
            *c = (*c + self.cutoff_offset).max(MIN_CUTOFF_HZ);
        }
        self.filter.render_tracking(out, cutoffs, ctx.sample_rate);
    }

    fn is_active(&self, _from: f64, _to: f64) -> bool {
        // A filter on its own only shapes its input.
        false
    }
}

impl Modulatable for FilterNode {
    type Param = FilterParam;

    fn get_param(&self, param: Self::Param, time: f64) -> f32 {
        match param {
            FilterParam::Cutoff => self.cutoff.value_at(time),
            FilterParam::Q => self.q.value_at(time),
        }
    }

    fn apply_modulation(&mut self, param: Self::Param, offset: f32) {
        match param {
            FilterParam::Cutoff => self.cutoff_offset += offset,
            FilterParam::Q => self.q_offset += offset,
        }
    }

    fn clear_modulation(&mut self) {
        self.cutoff_offset = 0.0;
        self.q_offset = 0.0;
    }
}
