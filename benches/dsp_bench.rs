//! Benchmarks for DSP primitives, analysis and preset renders.
//!
//! Run with: cargo bench
//!
//! The analysis tick runs at 60 Hz, so one tick's work (analyser plus
//! detection) has a 16.7 ms budget. Primitives are measured per render
//! quantum, the block size the offline renderer advances in.
//!
//! Benchmark groups:
//!   - dsp/*        Primitives (oscillator, filter, automation, convolution)
//!   - analysis/*   Spectrum analysis and pitch detection
//!   - scenarios/*  Whole preset renders

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Block sizes a render quantum is typically set to.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

criterion_group!(
    benches,
    // Primitives
    dsp::bench_oscillator,
    dsp::bench_filter,
    dsp::bench_automation,
    dsp::bench_convolution,
    dsp::bench_analysis,
    // Whole renders
    scenarios::bench_presets,
);
criterion_main!(benches);
