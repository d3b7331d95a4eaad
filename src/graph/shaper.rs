use std::sync::Arc;

use crate::{
    dsp::shaper::shape_buffer,
    graph::node::{GraphNode, RenderCtx},
};

/// Waveshaper: maps every input sample through a piecewise-linear curve.
///
/// Used as a processor with `.through()`. The pulsar sound passes a slow
/// sine through `[0, 0.6, 1, 0.6, 0]` to get a pulse envelope that is loud
/// when the sine crosses zero and silent at its peaks.
pub struct ShaperNode {
    curve: Arc<[f32]>,
}

impl ShaperNode {
    pub fn new(curve: impl Into<Arc<[f32]>>) -> Self {
        Self {
            curve: curve.into(),
        }
    }

    pub fn curve(&self) -> &[f32] {
        &self.curve
    }
}

impl GraphNode for ShaperNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        shape_buffer(&self.curve, out);
    }

    fn is_active(&self, _from: f64, _to: f64) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{extensions::NodeExt, lfo::LfoNode};

    #[test]
    fn pulse_curve_turns_sine_into_unipolar_envelope() {
        let mut pulse = LfoNode::sine(1.0).through(ShaperNode::new(vec![0.0, 0.6, 1.0, 0.6, 0.0]));
        let mut out = vec![0.0; 1000];
        pulse.render_block(&mut out, &RenderCtx::new(1_000.0));

        assert!(out.iter().all(|&s| (0.0..=1.0).contains(&s)));
        // Sine starts at zero, so the envelope starts at its peak.
        assert!((out[0] - 1.0).abs() < 1e-6);
        // A quarter cycle in the sine is at +1, the curve's right end.
        assert!(out[250].abs() < 1e-3);
    }
}
