use crate::{
    dsp::delay::DelayLine,
    graph::node::{GraphNode, RenderCtx},
};

/// Longest echo a feedback delay accepts, in seconds.
pub const MAX_DELAY_SECONDS: f32 = 2.0;

/// Level below which an echo tail counts as gone (-80 dB).
const TAIL_FLOOR: f32 = 1.0e-4;

/*
Feedback Delay
==============

    input ──┬───────────────────────────(× dry)──→ (+) ──→ out
            │                                        ↑
            └──→ (+) ──→ [ delay D ] ──┬──(× wet)────┘
                  ↑                    │
                  └────(× feedback)────┘

Each echo comes back `feedback` times quieter than the last. With feedback
0.4 the fourth echo is at 0.4⁴ ≈ 2.5 %. Feedback must stay below 1 or the
echoes grow without end.

The pulsar sound runs its ringing bandpass through one of these so each
pulse is followed by a trail of fading repeats.
*/

pub struct FeedbackDelay<N> {
    input: N,
    line: DelayLine,
    delay_seconds: f32,
    feedback: f32,
    dry: f32,
    wet: f32,
}

impl<N> FeedbackDelay<N> {
    /// `delay_seconds` is clamped to (0, MAX_DELAY_SECONDS]; `feedback` to
    /// [0, 0.99].
    pub fn new(input: N, delay_seconds: f32, feedback: f32, sample_rate: f32) -> Self {
        let delay_seconds = delay_seconds.clamp(1.0 / sample_rate, MAX_DELAY_SECONDS);
        let capacity = (MAX_DELAY_SECONDS * sample_rate).ceil() as usize + 1;
        Self {
            input,
            line: DelayLine::with_capacity(capacity),
            delay_seconds,
            feedback: feedback.clamp(0.0, 0.99),
            dry: 1.0,
            wet: 1.0,
        }
    }

    pub fn with_mix(mut self, dry: f32, wet: f32) -> Self {
        self.dry = dry;
        self.wet = wet;
        self
    }

    /// Seconds until the echoes of a stopped input fall below -80 dB.
    pub fn tail_seconds(&self) -> f64 {
        let repeats = if self.feedback > 0.0 {
            (TAIL_FLOOR.ln() / self.feedback.ln()).ceil().max(1.0)
        } else {
            1.0
        };
        (self.delay_seconds * (repeats + 1.0)) as f64
    }
}

impl<N: GraphNode> GraphNode for FeedbackDelay<N> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.input.render_block(out, ctx);

        let delay_samples = (self.delay_seconds * ctx.sample_rate).round().max(1.0) as usize;
        for sample in out.iter_mut() {
            let dry = *sample;
            let delayed = self.line.read(delay_samples);
            self.line.push(dry + self.feedback * delayed);
            *sample = self.dry * dry + self.wet * delayed;
        }
    }

    fn is_active(&self, from: f64, to: f64) -> bool {
        self.input.is_active(from - self.tail_seconds(), to)
    }
}
