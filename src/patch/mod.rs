//! Serializable descriptions of synthesis graphs.
//!
//! A [`SignalGraph`] is plain data: a tree of [`SignalNode`]s whose
//! parameters are automation curves, optionally modulated by other signals.
//! Presets build one per render and [`compile`] turns it into the
//! render nodes from [`crate::graph`].
//!
//! ```
//! use cosmic_dsp::dsp::{Automation, Waveform};
//! use cosmic_dsp::patch::{OscillatorSource, PatchExt, Param, SignalGraph};
//!
//! let hum = OscillatorSource::new(Waveform::Sine, 55.0)
//!     .lowpass(Param::from(400.0).with_lfo(Waveform::Sine, 0.1, 150.0), 1.0)
//!     .gain(Automation::starting_at(0.0).linear_to(0.3, 2.0))
//!     .pan(-0.2);
//! let graph = SignalGraph::stereo(hum).with_master_gain(0.5);
//! assert_eq!(graph.channels, 2);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::{envelope::Automation, filter::FilterType, noise::NoiseColor, oscillator::Waveform};

pub mod compile;

pub use compile::{compile, CompileContext, Compiled};

/// A node parameter: a curve over absolute render time plus any number of
/// signals added on top of it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Param {
    pub automation: Automation,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub modulators: Vec<Modulator>,
}

/// A signal added to a parameter, scaled by `depth`. The signal is averaged
/// over each render block.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Modulator {
    pub source: SignalNode,
    pub depth: f32,
}

impl Param {
    /// Add a free-running oscillator of `rate` Hz, swinging the parameter by
    /// `±depth`.
    pub fn with_lfo(self, waveform: Waveform, rate: f32, depth: f32) -> Self {
        self.with_modulator(OscillatorSource::new(waveform, rate), depth)
    }

    pub fn with_modulator(mut self, source: impl Into<SignalNode>, depth: f32) -> Self {
        self.modulators.push(Modulator {
            source: source.into(),
            depth,
        });
        self
    }
}

impl From<f32> for Param {
    fn from(value: f32) -> Self {
        Automation::constant(value).into()
    }
}

impl From<Automation> for Param {
    fn from(automation: Automation) -> Self {
        Self {
            automation,
            modulators: Vec::new(),
        }
    }
}

/// Window during which a source plays, in seconds. `stop: None` plays to the
/// end of the render.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Window {
    pub start: f64,
    pub stop: Option<f64>,
}

impl Window {
    pub fn is_whole_render(&self) -> bool {
        self.start == 0.0 && self.stop.is_none()
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct OscillatorSource {
    pub waveform: Waveform,
    pub frequency: Param,
    #[cfg_attr(feature = "serde", serde(default))]
    pub detune: Param,
    #[cfg_attr(feature = "serde", serde(default))]
    pub window: Window,
}

impl OscillatorSource {
    pub fn new(waveform: Waveform, frequency: impl Into<Param>) -> Self {
        Self {
            waveform,
            frequency: frequency.into(),
            detune: Param::default(),
            window: Window::default(),
        }
    }

    /// Detune in cents.
    pub fn detune(mut self, cents: impl Into<Param>) -> Self {
        self.detune = cents.into();
        self
    }

    /// Play from `start` until `stop` seconds.
    pub fn between(mut self, start: f64, stop: f64) -> Self {
        self.window = Window {
            start,
            stop: Some(stop),
        };
        self
    }

    pub fn starting_at(mut self, start: f64) -> Self {
        self.window.start = start;
        self
    }
}

/// Playback of a generated noise buffer.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseSource {
    pub color: NoiseColor,
    /// Buffer length in seconds. `None` generates a buffer as long as the
    /// render.
    #[cfg_attr(feature = "serde", serde(default))]
    pub seconds: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub looped: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub window: Window,
}

impl NoiseSource {
    /// A looping buffer that covers the whole render.
    pub fn new(color: NoiseColor) -> Self {
        Self {
            color,
            seconds: None,
            looped: true,
            window: Window::default(),
        }
    }

    /// A buffer of `seconds` played once.
    pub fn once(color: NoiseColor, seconds: f64) -> Self {
        Self {
            color,
            seconds: Some(seconds),
            looped: false,
            window: Window::default(),
        }
    }

    pub fn between(mut self, start: f64, stop: f64) -> Self {
        self.window = Window {
            start,
            stop: Some(stop),
        };
        self
    }

    pub fn starting_at(mut self, start: f64) -> Self {
        self.window.start = start;
        self
    }
}

/// Noise-tail impulse response, see [`crate::dsp::impulse`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpulseSpec {
    pub seconds: f32,
    pub decay: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub reverse: bool,
}

impl ImpulseSpec {
    pub fn new(seconds: f32, decay: f32) -> Self {
        Self {
            seconds,
            decay,
            reverse: false,
        }
    }

    pub fn reversed(seconds: f32, decay: f32) -> Self {
        Self {
            seconds,
            decay,
            reverse: true,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, PartialEq)]
pub enum SignalNode {
    Oscillator(OscillatorSource),
    Noise(NoiseSource),
    Gain {
        input: Box<SignalNode>,
        gain: Param,
    },
    Filter {
        input: Box<SignalNode>,
        kind: FilterType,
        cutoff: Param,
        q: Param,
    },
    /// Mono inputs are placed with equal-power panning; stereo inputs are
    /// shifted.
    Panner {
        input: Box<SignalNode>,
        pan: Param,
    },
    Delay {
        input: Box<SignalNode>,
        time: f32,
        feedback: f32,
        dry: f32,
        wet: f32,
    },
    Shaper {
        input: Box<SignalNode>,
        curve: Vec<f32>,
    },
    ConvolutionReverb {
        input: Box<SignalNode>,
        impulse: ImpulseSpec,
        dry: f32,
        wet: f32,
        normalize: bool,
    },
    Sum(Vec<SignalNode>),
}

impl SignalNode {
    pub fn sum(inputs: impl IntoIterator<Item = SignalNode>) -> Self {
        SignalNode::Sum(inputs.into_iter().collect())
    }

    /// Name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            SignalNode::Oscillator(_) => "oscillator",
            SignalNode::Noise(_) => "noise",
            SignalNode::Gain { .. } => "gain",
            SignalNode::Filter { .. } => "filter",
            SignalNode::Panner { .. } => "panner",
            SignalNode::Delay { .. } => "delay",
            SignalNode::Shaper { .. } => "shaper",
            SignalNode::ConvolutionReverb { .. } => "convolution reverb",
            SignalNode::Sum(_) => "sum",
        }
    }
}

impl From<OscillatorSource> for SignalNode {
    fn from(source: OscillatorSource) -> Self {
        SignalNode::Oscillator(source)
    }
}

impl From<NoiseSource> for SignalNode {
    fn from(source: NoiseSource) -> Self {
        SignalNode::Noise(source)
    }
}

/// Fluent builders for wrapping a node in a processor.
pub trait PatchExt: Into<SignalNode> + Sized {
    fn gain(self, gain: impl Into<Param>) -> SignalNode {
        SignalNode::Gain {
            input: Box::new(self.into()),
            gain: gain.into(),
        }
    }

    fn filter(self, kind: FilterType, cutoff: impl Into<Param>, q: impl Into<Param>) -> SignalNode {
        SignalNode::Filter {
            input: Box::new(self.into()),
            kind,
            cutoff: cutoff.into(),
            q: q.into(),
        }
    }

    fn lowpass(self, cutoff: impl Into<Param>, q: impl Into<Param>) -> SignalNode {
        self.filter(FilterType::LowPass, cutoff, q)
    }

    fn highpass(self, cutoff: impl Into<Param>, q: impl Into<Param>) -> SignalNode {
        self.filter(FilterType::HighPass, cutoff, q)
    }

    fn bandpass(self, cutoff: impl Into<Param>, q: impl Into<Param>) -> SignalNode {
        self.filter(FilterType::BandPass, cutoff, q)
    }

    fn pan(self, pan: impl Into<Param>) -> SignalNode {
        SignalNode::Panner {
            input: Box::new(self.into()),
            pan: pan.into(),
        }
    }

    /// Echo with feedback; dry and wet both at unity.
    fn delay(self, time: f32, feedback: f32) -> SignalNode {
        SignalNode::Delay {
            input: Box::new(self.into()),
            time,
            feedback,
            dry: 1.0,
            wet: 1.0,
        }
    }

    fn shape(self, curve: Vec<f32>) -> SignalNode {
        SignalNode::Shaper {
            input: Box::new(self.into()),
            curve,
        }
    }

    /// Normalized convolution reverb.
    fn reverb(self, impulse: ImpulseSpec, dry: f32, wet: f32) -> SignalNode {
        SignalNode::ConvolutionReverb {
            input: Box::new(self.into()),
            impulse,
            dry,
            wet,
            normalize: true,
        }
    }
}

impl<T: Into<SignalNode>> PatchExt for T {}

/// A complete sound: the node tree, the number of output channels and a
/// master gain applied after everything else.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SignalGraph {
    pub root: SignalNode,
    pub channels: usize,
    pub master_gain: f32,
}

impl SignalGraph {
    pub fn stereo(root: impl Into<SignalNode>) -> Self {
        Self {
            root: root.into(),
            channels: 2,
            master_gain: 1.0,
        }
    }

    pub fn mono(root: impl Into<SignalNode>) -> Self {
        Self {
            root: root.into(),
            channels: 1,
            master_gain: 1.0,
        }
    }

    pub fn with_master_gain(mut self, gain: f32) -> Self {
        self.master_gain = gain;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_nest_inputs() {
        let node = NoiseSource::new(NoiseColor::Pink).highpass(200.0, 1.0).gain(0.5);
        let SignalNode::Gain { input, gain } = node else {
            panic!("expected a gain node");
        };
        assert_eq!(gain.automation.initial(), 0.5);
        assert!(matches!(
            *input,
            SignalNode::Filter {
                kind: FilterType::HighPass,
                ..
            }
        ));
    }

    #[test]
    fn lfo_adds_a_modulator() {
        let param = Param::from(300.0).with_lfo(Waveform::Sine, 0.2, 100.0);
        assert_eq!(param.modulators.len(), 1);
        assert_eq!(param.modulators[0].depth, 100.0);
        assert_eq!(param.modulators[0].source.kind(), "oscillator");
    }

    #[test]
    fn window_defaults_to_whole_render() {
        assert!(OscillatorSource::new(Waveform::Sine, 1.0).window.is_whole_render());
        assert!(!OscillatorSource::new(Waveform::Sine, 1.0)
            .starting_at(0.5)
            .window
            .is_whole_render());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn graph_survives_toml_round_trip() {
        let graph = SignalGraph::stereo(
            OscillatorSource::new(Waveform::Triangle, 110.0)
                .reverb(ImpulseSpec::reversed(3.0, 2.0), 0.2, 0.8),
        )
        .with_master_gain(0.1);
        let text = toml::to_string(&graph).unwrap();
        let parsed: SignalGraph = toml::from_str(&text).unwrap();
        assert_eq!(parsed, graph);
    }
}
