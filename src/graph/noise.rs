use std::sync::Arc;

use crate::graph::node::{GraphNode, RenderCtx};

/// Plays a pre-generated noise buffer, once or looped.
///
/// Noise is generated up front (see `dsp::noise`) and shared, so two nodes
/// built from the same buffer play the same samples. The buffer is indexed
/// by block time, so a node started late (inside a `Scheduled` window)
/// begins at the first sample of the buffer.
pub struct NoiseNode {
    buffer: Arc<[f32]>,
    looped: bool,
    position: usize,
}

impl NoiseNode {
    /// Play `buffer` once, then silence.
    pub fn once(buffer: impl Into<Arc<[f32]>>) -> Self {
        Self {
            buffer: buffer.into(),
            looped: false,
            position: 0,
        }
    }

    /// Play `buffer` over and over.
    pub fn looped(buffer: impl Into<Arc<[f32]>>) -> Self {
        Self {
            buffer: buffer.into(),
            looped: true,
            position: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl GraphNode for NoiseNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        let len = self.buffer.len();
        if len == 0 {
            out.fill(0.0);
            return;
        }

        let mut written = 0;
        while written < out.len() {
            if self.position >= len {
                if !self.looped {
                    out[written..].fill(0.0);
                    return;
                }
                self.position = 0;
            }
            let n = (len - self.position).min(out.len() - written);
            out[written..written + n]
                .copy_from_slice(&self.buffer[self.position..self.position + n]);
            self.position += n;
            written += n;
        }
    }

    fn is_active(&self, _from: f64, _to: f64) -> bool {
        self.looped || self.position < self.buffer.len()
    }
}
