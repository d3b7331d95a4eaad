use crate::graph::node::{GraphNode, RenderCtx};

/*
Serial Signal Chain (Through)
=============================

Through connects two nodes in series, passing the output of the first (source)
into the second (effect). This is the fundamental building block for creating
signal processing chains like: noise → highpass → bandpass.

How It Works:
-------------
1. Render the source into the output buffer
2. Pass that buffer through the effect (in-place processing)

  Source renders:  [0.5, 0.8, -0.3, 0.9, ...]
  Effect processes in-place (e.g., filter)
  Final output:    [0.4, 0.6, -0.2, 0.7, ...]  (filtered result)

Common Use Cases:
-----------------

1. Shaping noise into a texture:

     let rain = NoiseNode::looped(pink)
         .through(FilterNode::highpass(2000.0))
         .amplify(GainNode::constant(0.03));

2. Stacking filters:

     let storm_wind = NoiseNode::looped(pink)
         .through(FilterNode::bandpass(1500.0, 3.5))
         .through(FilterNode::lowpass(300.0));

Through vs Amplify vs Sum:
--------------------------
- Through: Serial processing (source → effect → output)
- Amplify: Multiplication (signal × gain curve)
- Sum:     Parallel layering (a + b + c)

Activity
--------
A chain is active while its source is, plus a short tail so a resonant
filter can ring out after its source stops.
*/

/// How long an effect keeps sounding after its source falls silent.
pub const EFFECT_TAIL_SECONDS: f64 = 0.5;

pub struct Through<S, F> {
    source: S,
    filter: F,
}

impl<S, F> Through<S, F> {
    pub fn new(source: S, filter: F) -> Self {
        Self { source, filter }
    }
}

impl<S: GraphNode, F: GraphNode> GraphNode for Through<S, F> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.source.render_block(out, ctx);
        self.filter.render_block(out, ctx);
    }

    fn is_active(&self, from: f64, to: f64) -> bool {
        self.source.is_active(from - EFFECT_TAIL_SECONDS, to)
    }
}
