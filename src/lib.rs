//! Realtime pitch and harmonic analysis, plus offline rendering of
//! procedural ambient sound textures.
//!
//! The crate is split the same way a signal flows through it:
//!
//! - [`dsp`]: allocation-free primitives (oscillators, noise, filters,
//!   automation curves, delay lines, FFT convolution).
//! - [`graph`]: composable render nodes built on those primitives.
//! - [`patch`]: serializable descriptions of synthesis graphs, compiled into
//!   graph nodes.
//! - [`render`] and [`presets`]: offline rendering and the built-in sounds.
//! - [`analysis`]: spectrum analysis, pitch detection, history and reports.
//! - [`capture`]: the session controller that drives the analysis tick.
//! - [`io`]: decoded waveforms and WAV decoding.

pub mod analysis;
pub mod capture;
pub mod config;
pub mod dsp;
pub mod error;
pub mod graph; // Composable audio graph nodes
pub mod io;
pub mod patch; // Serializable graph descriptions
pub mod presets;
pub mod render;

pub use config::EngineConfig;
pub use error::{DecodeError, DeviceError, Error, GraphError, StateError, SynthesisError};
pub use io::AudioBuffer;

/// Largest block any node is asked to render in one call.
pub const MAX_BLOCK_SIZE: usize = 2048;
