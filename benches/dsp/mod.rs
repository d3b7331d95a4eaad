//! Benchmarks for low-level DSP primitives.

mod analysis;
mod automation;
mod convolution;
mod filter;
mod oscillator;

pub use analysis::bench_analysis;
pub use automation::bench_automation;
pub use convolution::bench_convolution;
pub use filter::bench_filter;
pub use oscillator::bench_oscillator;
