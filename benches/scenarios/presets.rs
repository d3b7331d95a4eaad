//! Benchmarks for rendering built-in presets.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use cosmic_dsp::presets::{PresetRegistry, RenderRequest};

pub fn bench_presets(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/presets");
    group.sample_size(10);
    let registry = PresetRegistry::builtin();

    // One second each: long enough to include every layer's setup cost.
    let request = RenderRequest::default().duration(1.0).seed(11);
    for id in ["white-noise", "pulsar", "black-hole", "rainforest", "jupiter-radio"] {
        group.bench_with_input(BenchmarkId::new("render_1s", id), &id, |b, id| {
            b.iter(|| registry.render(black_box(id), request))
        });
    }

    group.finish();
}
