/// Context passed to graph nodes during rendering
///
/// - sample_rate: Audio sample rate (e.g., 44100.0)
/// - time: Time of the first sample of the block, in seconds from the start
///   of the render
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub time: f64,
}

impl RenderCtx {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            time: 0.0,
        }
    }

    /// Same sample rate, block starting at `time`.
    pub fn at(&self, time: f64) -> Self {
        Self {
            sample_rate: self.sample_rate,
            time,
        }
    }

    /// Context for a block that starts `samples` into this one.
    pub fn offset(&self, samples: usize) -> Self {
        self.at(self.time + samples as f64 / self.sample_rate as f64)
    }

    /// Time just past the end of a block of `len` samples.
    pub fn end(&self, len: usize) -> f64 {
        self.time + len as f64 / self.sample_rate as f64
    }
}

/// Trait for nodes that support parameter modulation
///
/// Modulation is an offset on top of a node's own value for the parameter
/// (its automation curve). Offsets from several sources add up until the
/// next `clear_modulation`.
pub trait Modulatable: Send {
    type Param: Copy + Send;

    /// Unmodulated value of `param` at `time`.
    fn get_param(&self, param: Self::Param, time: f64) -> f32;

    fn apply_modulation(&mut self, param: Self::Param, offset: f32);

    fn clear_modulation(&mut self);
}

/// Core trait for mono audio processing graph nodes
///
/// `render_block` overwrites `out`. Sources fill it; processors (filters,
/// delays) read the input they own and write the result.
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Whether the node can produce anything other than silence between
    /// `from` and `to` seconds.
    ///
    /// Summing nodes skip inactive children. Default: always active.
    fn is_active(&self, _from: f64, _to: f64) -> bool {
        true
    }
}

/// Two-channel counterpart of [`GraphNode`]. Panners, stereo buses and the
/// convolution reverb produce stereo.
pub trait StereoNode: Send {
    fn render_stereo(&mut self, left: &mut [f32], right: &mut [f32], ctx: &RenderCtx);

    fn is_active(&self, _from: f64, _to: f64) -> bool {
        true
    }
}

/// Allow boxed graph nodes to be used as graph nodes (for dynamic dispatch)
impl GraphNode for Box<dyn GraphNode> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        (**self).render_block(out, ctx)
    }

    fn is_active(&self, from: f64, to: f64) -> bool {
        (**self).is_active(from, to)
    }
}

impl StereoNode for Box<dyn StereoNode> {
    fn render_stereo(&mut self, left: &mut [f32], right: &mut [f32], ctx: &RenderCtx) {
        (**self).render_stereo(left, right, ctx)
    }

    fn is_active(&self, from: f64, to: f64) -> bool {
        (**self).is_active(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_advances_time_by_samples() {
        let ctx = RenderCtx::new(48_000.0).at(1.0);
        let later = ctx.offset(24_000);
        assert!((later.time - 1.5).abs() < 1e-12);
        assert!((ctx.end(48_000) - 2.0).abs() < 1e-12);
    }
}
