use crate::{
    dsp::modulate::block_average,
    graph::node::{GraphNode, Modulatable, RenderCtx, StereoNode},
    MAX_BLOCK_SIZE,
};

/*
Modulate Node
=============

Connects an LFO (or any signal) to a parameter on another node. This is how
wind gusts, pulsing insects, wavering aurora tones and shimmering drones
move.

  // Gusts: LFO sweeps a bandpass cutoff
  let wind = FilterNode::bandpass(600.0, 2.0)
      .modulate(LfoNode::sine(0.1), FilterParam::Cutoff, 200.0);

  // Two routes on the same node
  let storm = FilterNode::bandpass(1500.0, 3.5)
      .modulate(lfo_a, FilterParam::Cutoff, 1000.0)
      .and(lfo_b, FilterParam::Q, 0.5);


Understanding Depth
-------------------

    modulated_value = automation(t) + (LFO × depth)

Example with cutoff=1000, depth=500, LFO swinging -1 to +1:
    LFO = -1.0  →  cutoff = 1000 + (-1 × 500) = 500 Hz
    LFO =  0.0  →  cutoff = 1000 + ( 0 × 500) = 1000 Hz
    LFO = +1.0  →  cutoff = 1000 + (+1 × 500) = 1500 Hz


Several Routes
--------------

Each block the node clears the previous offsets on its target, renders every
route's LFO, and adds `average × depth` for each. Routes on the same
parameter add up. Routes live in one node (`.and()`) rather than nested
Modulate wrappers, because an inner wrapper would clear the offsets an outer
one had just applied.

See `dsp/modulate.rs` for the block-rate details.
*/

struct Route<P, L> {
    lfo: L,
    param: P,
    depth: f32,
}

pub struct Modulate<S, L>
where
    S: Modulatable,
{
    source: S,                         // The node being modulated (e.g., FilterNode)
    routes: Vec<Route<S::Param, L>>,   // LFO → parameter connections
    lfo_buffer: Vec<f32>,              // Temp buffer for LFO output
}

impl<S, L> Modulate<S, L>
where
    S: Modulatable,
    L: GraphNode,
{
    pub fn new(source: S, lfo: L, param: S::Param, depth: f32) -> Self {
        Self {
            source,
            routes: vec![Route { lfo, param, depth }],
            lfo_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    /// A node with no routes yet; renders the source unmodulated.
    pub fn unrouted(source: S) -> Self {
        Self {
            source,
            routes: Vec::new(),
            lfo_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    /// Add another LFO route.
    pub fn and(mut self, lfo: L, param: S::Param, depth: f32) -> Self {
        self.push_route(lfo, param, depth);
        self
    }

    pub fn push_route(&mut self, lfo: L, param: S::Param, depth: f32) {
        self.routes.push(Route { lfo, param, depth });
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn update(&mut self, len: usize, ctx: &RenderCtx) {
        self.source.clear_modulation();
        for route in &mut self.routes {
            // Render LFO to temp buffer (values in [-1.0, +1.0])
            let frames = &mut self.lfo_buffer[..len];
            route.lfo.render_block(frames, ctx);

            // Average LFO samples for block-rate modulation
            let offset = block_average(frames) * route.depth;
            self.source.apply_modulation(route.param, offset);
        }
    }
}

impl<S, L> GraphNode for Modulate<S, L>
where
    S: GraphNode + Modulatable,
    L: GraphNode,
{
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.update(out.len(), ctx);
        self.source.render_block(out, ctx);
    }

    // A routed parameter can lift a silent curve (a gain of 0 plus an LFO),
    // so the source's own answer only holds without routes.
    fn is_active(&self, from: f64, to: f64) -> bool {
        !self.routes.is_empty() || GraphNode::is_active(&self.source, from, to)
    }
}

impl<S, L> StereoNode for Modulate<S, L>
where
    S: StereoNode + Modulatable,
    L: GraphNode,
{
    fn render_stereo(&mut self, left: &mut [f32], right: &mut [f32], ctx: &RenderCtx) {
        self.update(left.len(), ctx);
        self.source.render_stereo(left, right, ctx);
    }

    fn is_active(&self, from: f64, to: f64) -> bool {
        StereoNode::is_active(&self.source, from, to)
    }
}
