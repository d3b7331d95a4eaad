use rand::rngs::StdRng;

use crate::{
    dsp::NoiseColor,
    patch::{NoiseSource, SignalGraph},
};

use super::SoundPresetDescriptor;

pub(super) fn presets() -> Vec<SoundPresetDescriptor> {
    vec![SoundPresetDescriptor::new(
        "white-noise",
        7.0,
        "Plain white noise at a comfortable level, mono.",
        white_noise,
    )]
}

fn white_noise(duration: f64, _rng: &mut StdRng) -> SignalGraph {
    SignalGraph::mono(NoiseSource::once(NoiseColor::White, duration)).with_master_gain(0.06)
}
