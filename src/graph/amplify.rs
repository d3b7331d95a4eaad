use crate::{
    graph::node::{GraphNode, RenderCtx, StereoNode},
    MAX_BLOCK_SIZE,
};

/// Multiply a signal by a control signal (a gain curve, a tremolo, a pulse
/// envelope).
///
/// Works on mono and stereo signals; the control signal is always mono and
/// applies to both channels.
pub struct Amplify<N, M> {
    pub signal: N,
    pub modulator: M,
    temp_buffer: Vec<f32>,
}

impl<N, M> Amplify<N, M> {
    pub fn new(signal: N, modulator: M) -> Self {
        Self {
            signal,
            modulator,
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }
}

impl<N: GraphNode, M: GraphNode> GraphNode for Amplify<N, M> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        // Render signal into output
        self.signal.render_block(out, ctx);

        // Slice temp buffer to match output size (RT-safe, no allocation)
        let frames = &mut self.temp_buffer[..out.len()];
        self.modulator.render_block(frames, ctx);

        for (o, m) in out.iter_mut().zip(frames.iter()) {
            *o *= *m;
        }
    }

    fn is_active(&self, from: f64, to: f64) -> bool {
        self.signal.is_active(from, to) && self.modulator.is_active(from, to)
    }
}

impl<N: StereoNode, M: GraphNode> StereoNode for Amplify<N, M> {
    fn render_stereo(&mut self, left: &mut [f32], right: &mut [f32], ctx: &RenderCtx) {
        self.signal.render_stereo(left, right, ctx);

        let frames = &mut self.temp_buffer[..left.len()];
        self.modulator.render_block(frames, ctx);

        for ((l, r), m) in left.iter_mut().zip(right.iter_mut()).zip(frames.iter()) {
            *l *= *m;
            *r *= *m;
        }
    }

    fn is_active(&self, from: f64, to: f64) -> bool {
        self.signal.is_active(from, to) && self.modulator.is_active(from, to)
    }
}
