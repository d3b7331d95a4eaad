//! Benchmarks for one analysis tick: the analyser and pitch detection.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use cosmic_dsp::{
    analysis::{detect_with, Analyser},
    config::AnalyserConfig,
};

const SAMPLE_RATE: f32 = 44_100.0;

pub fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");

    for fft_size in [1024, 2048, 4096] {
        let config = AnalyserConfig {
            fft_size,
            ..AnalyserConfig::default()
        };
        // A4 plus two overtones
        let samples: Vec<f32> = (0..fft_size)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE;
                (1..=3)
                    .map(|k| (2.0 * std::f32::consts::PI * 440.0 * k as f32 * t).sin() / k as f32)
                    .sum()
            })
            .collect();

        let mut analyser = Analyser::new(config.clone());
        group.bench_with_input(BenchmarkId::new("analyse", fft_size), &fft_size, |b, _| {
            b.iter(|| analyser.analyse(black_box(&samples)))
        });

        let spectrum = analyser.analyse(&samples).spectrum;
        group.bench_with_input(BenchmarkId::new("detect", fft_size), &fft_size, |b, _| {
            b.iter(|| detect_with(black_box(&spectrum), SAMPLE_RATE, &config))
        });
    }

    group.finish();
}
