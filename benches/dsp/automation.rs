//! Benchmarks for automation curve evaluation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use cosmic_dsp::dsp::Automation;

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 44_100.0;

pub fn bench_automation(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/automation");

    // A percussive strike: attack, exponential decay, then a hold.
    let strike = Automation::starting_at(0.0)
        .linear_to(0.8, 0.01)
        .exponential_to(0.001, 0.5)
        .hold_until(2.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        group.bench_with_input(BenchmarkId::new("fill_strike", size), &size, |b, _| {
            b.iter(|| {
                let mut cursor = 0;
                strike.fill(black_box(&mut buffer), black_box(0.005), SAMPLE_RATE, &mut cursor);
            })
        });

        let constant = Automation::constant(0.5);
        group.bench_with_input(BenchmarkId::new("fill_constant", size), &size, |b, _| {
            b.iter(|| {
                let mut cursor = 0;
                constant.fill(black_box(&mut buffer), 0.0, SAMPLE_RATE, &mut cursor);
            })
        });
    }

    group.finish();
}
