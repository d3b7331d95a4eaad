//! Benchmarks for partitioned FFT convolution.
//!
//! Reverb tails are several seconds long, so the impulse is split into many
//! partitions. Cost grows with the partition count, not the block size.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use cosmic_dsp::dsp::impulse::generate_impulse_response;
use rand::{rngs::StdRng, SeedableRng};

const SAMPLE_RATE: u32 = 44_100;
const PARTITION: usize = 1024;

pub fn bench_convolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/convolution");
    let mut rng = StdRng::seed_from_u64(3);

    let input: Vec<f32> = (0..PARTITION).map(|i| ((i * 7) % 13) as f32 / 13.0 - 0.5).collect();
    let mut output = vec![0.0f32; PARTITION];

    for seconds in [0.5, 2.0, 7.0] {
        let ir = generate_impulse_response(&mut rng, SAMPLE_RATE, seconds, 3.0, false);
        let mut convolver = cosmic_dsp::dsp::convolution::Convolver::new(ir.channels()[0], PARTITION);
        group.bench_with_input(
            BenchmarkId::new("block", format!("{seconds}s")),
            &seconds,
            |b, _| {
                b.iter(|| {
                    convolver.process_block(black_box(&input), black_box(&mut output));
                })
            },
        );
    }

    group.finish();
}
