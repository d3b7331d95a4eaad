use crate::{
    graph::node::{GraphNode, RenderCtx, StereoNode},
    MAX_BLOCK_SIZE,
};

/*
Parallel Signal Summing
=======================

Sum and Bus add any number of signals together, the way every connection
into a single destination adds in a node graph:

  Sum (mono):     [a] ──┐
                  [b] ──┼──→ (+) ──→ out
                  [c] ──┘

  Bus (stereo):   [a L/R] ──┐
                  [b L/R] ──┼──→ (+) ──→ out L/R
                  [c L/R] ──┘

There is no crossfade or normalization: a rain layer, a wind layer and a
dozen bird calls simply add. Set each layer's level with `.amplify()` on
the way in.

Skipping silent inputs
----------------------

A thunderstorm schedules hundreds of one-shot events, each active for a
fraction of the render. Before rendering an input for a block, the summer
asks `is_active(block_start, block_end)`. Inputs that can only produce
silence in that block are not rendered at all, so the cost of a block
depends on how many events overlap it rather than on how many exist.
*/

pub struct Sum {
    inputs: Vec<Box<dyn GraphNode>>,
    temp_buffer: Vec<f32>,
}

impl Sum {
    pub fn new(inputs: Vec<Box<dyn GraphNode>>) -> Self {
        Self {
            inputs,
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn push(&mut self, input: Box<dyn GraphNode>) {
        self.inputs.push(input);
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

impl GraphNode for Sum {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        out.fill(0.0);
        let (from, to) = (ctx.time, ctx.end(out.len()));
        let frames = &mut self.temp_buffer[..out.len()];

        for input in &mut self.inputs {
            if !input.is_active(from, to) {
                continue;
            }
            input.render_block(frames, ctx);
            for (o, s) in out.iter_mut().zip(frames.iter()) {
                *o += *s;
            }
        }
    }

    fn is_active(&self, from: f64, to: f64) -> bool {
        self.inputs.iter().any(|input| input.is_active(from, to))
    }
}

pub struct Bus {
    inputs: Vec<Box<dyn StereoNode>>,
    left_buffer: Vec<f32>,
    right_buffer: Vec<f32>,
}

impl Bus {
    pub fn new(inputs: Vec<Box<dyn StereoNode>>) -> Self {
        Self {
            inputs,
            left_buffer: vec![0.0; MAX_BLOCK_SIZE],
            right_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn push(&mut self, input: Box<dyn StereoNode>) {
        self.inputs.push(input);
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

impl StereoNode for Bus {
    fn render_stereo(&mut self, left: &mut [f32], right: &mut [f32], ctx: &RenderCtx) {
        left.fill(0.0);
        right.fill(0.0);
        let len = left.len();
        let (from, to) = (ctx.time, ctx.end(len));
        let l_frames = &mut self.left_buffer[..len];
        let r_frames = &mut self.right_buffer[..len];

        for input in &mut self.inputs {
            if !input.is_active(from, to) {
                continue;
            }
            input.render_stereo(l_frames, r_frames, ctx);
            for (o, s) in left.iter_mut().zip(l_frames.iter()) {
                *o += *s;
            }
            for (o, s) in right.iter_mut().zip(r_frames.iter()) {
                *o += *s;
            }
        }
    }

    fn is_active(&self, from: f64, to: f64) -> bool {
        self.inputs.iter().any(|input| input.is_active(from, to))
    }
}
