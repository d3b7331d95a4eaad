//! Whole-render benchmarks.
//!
//! Each one renders a built-in preset end to end: graph construction,
//! compilation, noise and impulse generation, and the quantum loop.

mod presets;

pub use presets::bench_presets;
