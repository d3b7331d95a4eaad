//! Offline rendering of synthesis graphs.
//!
//! A render is a batch computation: the whole graph is compiled, then
//! advanced in fixed render quanta until `round(sample_rate × duration)`
//! samples exist. Nothing streams; the result is a finished
//! [`RenderedBuffer`].
//!
//! Renders that shouldn't block the caller run on a worker thread through
//! [`RenderTask`], with finished results collected in a [`RenderSlot`].

use rand::{rngs::StdRng, SeedableRng};

use crate::{
    config::SynthesisConfig,
    dsp::noise::buffer_len,
    error::GraphError,
    graph::node::RenderCtx,
    io::AudioBuffer,
    patch::{compile, CompileContext, Compiled, SignalGraph},
};

mod task;

pub use task::{CompletedRender, RenderResult, RenderSlot, RenderTask};

/// A finished render. Never modified after the renderer returns it.
pub type RenderedBuffer = AudioBuffer;

/// Everything a render needs besides the graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSpec {
    pub sample_rate: u32,
    pub duration: f64,
    /// Seed for every random choice made while compiling (noise buffers,
    /// impulse responses).
    pub seed: u64,
}

#[derive(Debug, Clone)]
pub struct OfflineRenderer {
    quantum: usize,
    partition: usize,
    max_seconds: f64,
}

impl Default for OfflineRenderer {
    fn default() -> Self {
        Self::new(&SynthesisConfig::default())
    }
}

impl OfflineRenderer {
    pub fn new(config: &SynthesisConfig) -> Self {
        Self {
            quantum: config.render_quantum.clamp(1, crate::MAX_BLOCK_SIZE),
            partition: config.convolution_partition.clamp(1, crate::MAX_BLOCK_SIZE),
            max_seconds: config.max_render_seconds,
        }
    }

    pub fn render(
        &self,
        graph: &SignalGraph,
        spec: RenderSpec,
    ) -> Result<RenderedBuffer, GraphError> {
        if spec.sample_rate == 0 {
            return Err(GraphError::InvalidSampleRate(spec.sample_rate));
        }
        if !(spec.duration.is_finite() && spec.duration > 0.0) {
            return Err(GraphError::InvalidDuration(spec.duration));
        }
        if spec.duration > self.max_seconds {
            return Err(GraphError::RenderTooLong {
                seconds: spec.duration,
                max: self.max_seconds,
            });
        }
        if !(1..=2).contains(&graph.channels) {
            return Err(GraphError::InvalidChannelCount(graph.channels));
        }
        if !graph.master_gain.is_finite() {
            return Err(GraphError::NonFinite {
                param: "master gain",
            });
        }
        let len = buffer_len(spec.sample_rate, spec.duration);
        if len == 0 {
            return Err(GraphError::InvalidDuration(spec.duration));
        }

        let mut rng = StdRng::seed_from_u64(spec.seed);
        let mut cx = CompileContext {
            sample_rate: spec.sample_rate,
            duration: spec.duration,
            partition: self.partition,
            rng: &mut rng,
        };
        let compiled = compile(&graph.root, &mut cx)?;

        log::debug!(
            "rendering {len} samples at {} Hz ({} quanta of {})",
            spec.sample_rate,
            len.div_ceil(self.quantum),
            self.quantum
        );

        let ctx = RenderCtx::new(spec.sample_rate as f32);
        let mut channels = match compiled {
            Compiled::Mono(mut node) => {
                let mut out = vec![0.0; len];
                for (i, block) in out.chunks_mut(self.quantum).enumerate() {
                    node.render_block(block, &ctx.offset(i * self.quantum));
                }
                vec![out]
            }
            Compiled::Stereo(mut node) => {
                let mut left = vec![0.0; len];
                let mut right = vec![0.0; len];
                let blocks = left
                    .chunks_mut(self.quantum)
                    .zip(right.chunks_mut(self.quantum));
                for (i, (l, r)) in blocks.enumerate() {
                    node.render_stereo(l, r, &ctx.offset(i * self.quantum));
                }
                vec![left, right]
            }
        };

        for channel in &mut channels {
            for sample in channel.iter_mut() {
                *sample *= graph.master_gain;
            }
        }
        let channels = match (channels.len(), graph.channels) {
            (1, 2) => {
                let mono = channels.swap_remove(0);
                vec![mono.clone(), mono]
            }
            (2, 1) => vec![channels[0]
                .iter()
                .zip(&channels[1])
                .map(|(l, r)| 0.5 * (l + r))
                .collect()],
            _ => channels,
        };

        Ok(AudioBuffer::from_rendered(spec.sample_rate, channels))
    }
}
