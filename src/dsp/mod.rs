//! Low-level DSP primitives used by the higher level graph nodes.
//!
//! These components do their allocation up front and stay realtime-safe
//! once constructed. They stick to the signal-processing math so graph
//! combinators can layer on scheduling and modulation.

/// Uniformly partitioned FFT convolution.
pub mod convolution;
/// Sample-indexed delay line.
pub mod delay;
/// Parameter automation curves (linear/exponential ramps and holds).
pub mod envelope;
/// State-variable filter implementation with multiple responses.
pub mod filter;
/// Generated noise impulse responses for convolution reverb.
pub mod impulse;
/// Block-rate modulation helpers.
pub mod modulate;
/// White, pink and brown noise generators.
pub mod noise;
/// Phase-accumulating oscillator waveforms.
pub mod oscillator;
/// Equal-power stereo panning laws.
pub mod pan;
/// Piecewise-linear waveshaping.
pub mod shaper;

pub use envelope::{Automation, Ramp};
pub use noise::NoiseColor;
pub use oscillator::Waveform;
