//! Composable building blocks for constructing audio-processing graphs.
//!
//! Graph nodes wrap the low-level DSP primitives with what offline rendering
//! of a procedural texture needs: absolute-time automation, block-rate
//! modulation, scheduled start/stop windows and stereo placement. The
//! `extensions` module adds fluent helpers so graphs can be written with a
//! clear, chainable API; `patch::compile` builds the same nodes from a
//! serializable description.

/// Multiply a signal by a control signal.
pub mod amplify;
/// Feedback delay (echoes).
pub mod delay;
/// Fluent combinators (`.amplify()`, `.through()`, `.pan()`, etc.).
pub mod extensions;
/// Topology-preserving filter node with automatable cutoff.
pub mod filter;
/// Automated gain curves.
pub mod gain;
/// Low frequency oscillators for parameter modulation.
pub mod lfo;
/// Summing of any number of mono or stereo inputs.
pub mod mix;
/// Connect modulation sources to node parameters.
pub mod modulate;
/// Core traits shared by all graph nodes.
pub mod node;
/// Playback of pre-generated noise buffers.
pub mod noise;
/// Audio-band oscillators with automated frequency and detune.
pub mod oscillator;
/// Mono and stereo panning.
pub mod pan;
/// Convolution reverb with generated impulse responses.
pub mod reverb;
/// Start/stop windows for one-shot events.
pub mod schedule;
/// Piecewise-linear waveshaping.
pub mod shaper;
/// Serial chaining of two nodes (source → effect).
pub mod through;
