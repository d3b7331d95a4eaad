use crate::graph::node::{GraphNode, RenderCtx, StereoNode};

/*
Scheduled Sources
=================

Every event in a procedural texture (a raindrop, a bird chirp, a thunder
clap) is a source that starts and stops at a fixed time. `Scheduled` gates a
node to the window [start, stop):

  block:   |--------|--------|--------|--------|
  window:        [=================)
  render:     0000 xxxx xxxxxxxx xxx 00000000

Only the part of each block inside the window is rendered; the rest is
zero. The child is never called before the window opens, so an oscillator's
phase starts at 0 exactly at `start`, and it is never called again after
the window closes.

The child keeps seeing absolute render time, so its automation curves are
written in the same timeline as the window.
*/

pub struct Scheduled<N> {
    node: N,
    start: f64,
    stop: f64,
}

impl<N> Scheduled<N> {
    /// Gate `node` to `[start, stop)` seconds. `stop` may be infinite.
    pub fn new(node: N, start: f64, stop: f64) -> Self {
        Self {
            node,
            start: start.max(0.0),
            stop,
        }
    }

    pub fn window(&self) -> (f64, f64) {
        (self.start, self.stop)
    }

    fn overlaps(&self, from: f64, to: f64) -> bool {
        from < self.stop && to > self.start
    }

    /// Sample range of a block starting at `ctx.time` that lies in the
    /// window.
    fn active_range(&self, len: usize, ctx: &RenderCtx) -> (usize, usize) {
        let sr = ctx.sample_rate as f64;
        let to_index = |t: f64| -> usize {
            if t <= ctx.time {
                0
            } else {
                (((t - ctx.time) * sr).ceil() as usize).min(len)
            }
        };
        let first = to_index(self.start);
        let last = if self.stop.is_finite() { to_index(self.stop) } else { len };
        (first, last.max(first))
    }
}

impl<N: GraphNode> GraphNode for Scheduled<N> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let (first, last) = self.active_range(out.len(), ctx);
        out[..first].fill(0.0);
        out[last..].fill(0.0);
        if first < last {
            self.node.render_block(&mut out[first..last], &ctx.offset(first));
        }
    }

    fn is_active(&self, from: f64, to: f64) -> bool {
        self.overlaps(from, to) && self.node.is_active(from.max(self.start), to)
    }
}

impl<N: StereoNode> StereoNode for Scheduled<N> {
    fn render_stereo(&mut self, left: &mut [f32], right: &mut [f32], ctx: &RenderCtx) {
        let (first, last) = self.active_range(left.len(), ctx);
        left[..first].fill(0.0);
        left[last..].fill(0.0);
        right[..first].fill(0.0);
        right[last..].fill(0.0);
        if first < last {
            self.node.render_stereo(
                &mut left[first..last],
                &mut right[first..last],
                &ctx.offset(first),
            );
        }
    }

    fn is_active(&self, from: f64, to: f64) -> bool {
        self.overlaps(from, to) && self.node.is_active(from.max(self.start), to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{extensions::NodeExt, noise::NoiseNode};

    #[test]
    fn renders_only_inside_window() {
        let mut node = NoiseNode::looped(vec![1.0]).between(0.25, 0.5);
        let ctx = RenderCtx::new(16.0);
        let mut out = vec![9.0; 16];
        node.render_block(&mut out, &ctx);
        assert_eq!(&out[..4], &[0.0; 4]);
        assert_eq!(&out[4..8], &[1.0; 4]);
        assert_eq!(&out[8..], &[0.0; 8]);
    }

    #[test]
    fn child_starts_fresh_at_window_start() {
        let mut node = NoiseNode::once(vec![0.1, 0.2, 0.3]).between(1.0, f64::INFINITY);
        let ctx = RenderCtx::new(4.0);
        let mut first = vec![0.0; 4];
        let mut second = vec![0.0; 4];
        node.render_block(&mut first, &ctx);
        node.render_block(&mut second, &ctx.offset(4));
        assert_eq!(first, vec![0.0; 4]);
        assert_eq!(second, vec![0.1, 0.2, 0.3, 0.0]);
    }

    #[test]
    fn activity_follows_window() {
        let node = NoiseNode::looped(vec![1.0]).between(2.0, 3.0);
        assert!(!node.is_active(0.0, 1.0));
        assert!(node.is_active(2.5, 2.6));
        assert!(!node.is_active(3.0, 4.0));
    }
}
