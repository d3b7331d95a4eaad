use std::collections::VecDeque;

use crate::{
    dsp::{convolution::Convolver, impulse::ImpulseResponse},
    graph::node::{RenderCtx, StereoNode},
};

/*
Convolution Reverb
==================

Places a sound in a space by convolving it with an impulse response. The
impulse responses here are generated (see `dsp/impulse.rs`), so the space
is described by two numbers instead of a recording:

  IR length   2 s          small cave, geyser basin
              4-7 s        ocean, whale song
              9-14 s       the inside of a black hole (reversed)
  decay       1-7          how fast the tail falls away

The left input is convolved with the left IR channel and the right input
with the right one. The output is

    out = dry × input + wet × (input ∗ ir)

Presets that want only the reverberated sound use dry = 0, wet = 1.

Block size
----------

The convolver works in partitions (1024 samples by default) while the
graph renders in smaller blocks. The node renders its input one partition
ahead into a queue and serves each block from that queue. The input is
owned by this node alone, so rendering it early changes nothing but the
order of work.

Normalization
-------------

A long noisy IR sums many more samples than a short one, so raw
convolution output would get louder with IR length.
`ImpulseResponse::normalize` scales an IR so every IR lands at a comparable
level; do it before handing the IR to the node.
*/

pub struct ConvolverNode<N> {
    input: N,
    convolvers: [Convolver; 2],
    dry: f32,
    wet: f32,
    partition: usize,
    tail_seconds: f64,
    next_input_time: f64,
    pending: [VecDeque<f32>; 2],
    in_buffers: [Vec<f32>; 2],
    out_buffer: Vec<f32>,
}

impl<N> ConvolverNode<N> {
    /// `partition` is the convolution block size; it must not exceed
    /// `MAX_BLOCK_SIZE`, since the input is rendered in blocks of that size.
    pub fn new(
        input: N,
        impulse: ImpulseResponse,
        partition: usize,
        sample_rate: f32,
    ) -> Self {
        let partition = partition.clamp(1, crate::MAX_BLOCK_SIZE);
        let tail_seconds = impulse.len() as f64 / sample_rate as f64;
        let [left, right] = impulse.channels();

        Self {
            input,
            convolvers: [Convolver::new(left, partition), Convolver::new(right, partition)],
            dry: 0.0,
            wet: 1.0,
            partition,
            tail_seconds,
            next_input_time: 0.0,
            pending: [VecDeque::new(), VecDeque::new()],
            in_buffers: [vec![0.0; partition], vec![0.0; partition]],
            out_buffer: vec![0.0; partition],
        }
    }

    pub fn with_mix(mut self, dry: f32, wet: f32) -> Self {
        self.dry = dry;
        self.wet = wet;
        self
    }
}

impl<N: StereoNode> ConvolverNode<N> {
    /// Render and convolve one more partition of input into the queue.
    fn fill_partition(&mut self, sample_rate: f32) {
        let ctx = RenderCtx {
            sample_rate,
            time: self.next_input_time,
        };
        let [left, right] = &mut self.in_buffers;
        self.input.render_stereo(left, right, &ctx);
        self.next_input_time = ctx.end(self.partition);

        for channel in 0..2 {
            let input = &self.in_buffers[channel];
            self.convolvers[channel].process_block(input, &mut self.out_buffer);
            for (&dry, &wet) in input.iter().zip(self.out_buffer.iter()) {
                self.pending[channel].push_back(self.dry * dry + self.wet * wet);
            }
        }
    }
}

impl<N: StereoNode> StereoNode for ConvolverNode<N> {
    fn render_stereo(&mut self, left: &mut [f32], right: &mut [f32], ctx: &RenderCtx) {
        // A parent that skipped this node while it was silent resumes at a
        // later time; the queued audio and the convolver state are stale.
        let queued_from =
            self.next_input_time - self.pending[0].len() as f64 / ctx.sample_rate as f64;
        if (ctx.time - queued_from).abs() * ctx.sample_rate as f64 > 0.5 {
            for (queue, convolver) in self.pending.iter_mut().zip(self.convolvers.iter_mut()) {
                queue.clear();
                convolver.reset();
            }
            self.next_input_time = ctx.time;
        }

        let n = left.len();
        while self.pending[0].len() < n {
            self.fill_partition(ctx.sample_rate);
        }
        for (out, sample) in left.iter_mut().zip(self.pending[0].drain(..n)) {
            *out = sample;
        }
        for (out, sample) in right.iter_mut().zip(self.pending[1].drain(..n)) {
            *out = sample;
        }
    }

    fn is_active(&self, from: f64, to: f64) -> bool {
        self.input.is_active(from - self.tail_seconds, to)
    }
}
