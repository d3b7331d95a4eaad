use rand::{rngs::StdRng, Rng};

use crate::{
    dsp::{Automation, NoiseColor, Waveform},
    patch::{ImpulseSpec, NoiseSource, OscillatorSource, Param, PatchExt, SignalGraph, SignalNode},
};

use super::{swell, vary, vary32, SoundPresetDescriptor, GLIDE_SECONDS};

pub(super) fn presets() -> Vec<SoundPresetDescriptor> {
    vec![
        SoundPresetDescriptor::new(
            "pulsar",
            7.0,
            "Regular shaped pulses ringing through a narrow bandpass, with echo.",
            pulsar,
        ),
        SoundPresetDescriptor::new(
            "quasar",
            10.0,
            "Two detuned drones of harmonic partials swelling into a reversed reverb.",
            quasar,
        ),
        SoundPresetDescriptor::new(
            "black-hole",
            12.0,
            "A sub-audio drone over resonant brown noise, reversed reverb only.",
            black_hole,
        ),
        SoundPresetDescriptor::new(
            "aurora",
            12.0,
            "Wandering high sine layers spread across the stereo field.",
            aurora,
        ),
        SoundPresetDescriptor::new(
            "solar-wind",
            12.0,
            "A whistling band of pink noise gated into short crackles.",
            solar_wind,
        ),
    ]
}

fn pulsar(_duration: f64, rng: &mut StdRng) -> SignalGraph {
    let carrier = vary32(rng, 400.0, 200.0);
    let pulse_rate = vary32(rng, 0.8, 1.0);
    // A sine folded into one bump per half cycle: silent at the extremes,
    // loudest at the zero crossings.
    let pulse =
        OscillatorSource::new(Waveform::Sine, pulse_rate).shape(vec![0.0, 0.6, 1.0, 0.6, 0.0]);

    let root = OscillatorSource::new(Waveform::Triangle, carrier)
        .gain(Param::from(0.0).with_modulator(pulse, 1.0))
        .bandpass(carrier, vary32(rng, 15.0, 10.0))
        .delay(vary32(rng, 0.5, 0.4), vary32(rng, 0.35, 0.15));

    SignalGraph::stereo(root).with_master_gain(0.09)
}

fn quasar(duration: f64, rng: &mut StdRng) -> SignalGraph {
    // (fundamental, partials, detune spread, pan)
    let layers = [(25.0f32, 5usize, 0.01f32, -0.6f32), (100.0, 3, 0.006, 0.6)];

    let mut voices = Vec::with_capacity(layers.len());
    for (fundamental, partials, spread, pan) in layers {
        let mut partial_voices: Vec<SignalNode> = Vec::with_capacity(partials);
        for harmonic in 1..=partials {
            let frequency = fundamental * harmonic as f32;
            let detune = (2.0 * rng.gen::<f32>() - 1.0) * spread * frequency * 0.8;
            let drift = Param::from(detune).with_lfo(
                Waveform::Sine,
                vary32(rng, 0.005, 0.06),
                vary32(rng, 3.0, 10.0),
            );
            partial_voices.push(
                OscillatorSource::new(Waveform::Sine, frequency)
                    .detune(drift)
                    .into(),
            );
        }

        let level = 0.35 / partials as f32;
        voices.push(
            SignalNode::sum(partial_voices)
                .pan(pan)
                .gain(swell(0.0, duration * 0.5, level, duration * 0.85, duration)),
        );
    }

    let tail = ImpulseSpec::reversed(vary32(rng, 7.0, 3.0), 4.5);
    SignalGraph::stereo(SignalNode::sum(voices).reverb(tail, 0.0, 1.0)).with_master_gain(0.07)
}

fn black_hole(_duration: f64, rng: &mut StdRng) -> SignalGraph {
    let fundamental = vary32(rng, 12.0, 6.0);
    let undertone = fundamental / vary32(rng, 2.5, 0.5);
    let tremolo = Param::from(0.2).with_lfo(
        Waveform::Sine,
        vary32(rng, 0.015, 0.02),
        vary32(rng, 0.25, 0.1),
    );
    let drone = SignalNode::sum([
        OscillatorSource::new(Waveform::Sine, fundamental).into(),
        OscillatorSource::new(Waveform::Sine, undertone).gain(0.5),
    ])
    .gain(tremolo);

    // Resonance sweeps from flat to a whistle and back.
    let resonance = Param::from(1.0).with_lfo(
        Waveform::Sine,
        vary32(rng, 0.025, 0.03),
        vary32(rng, 1.5, 1.0),
    );
    let rumble = NoiseSource::new(NoiseColor::Brown)
        .lowpass(vary32(rng, 50.0, 25.0), resonance)
        .gain(0.035);

    let tail = ImpulseSpec::reversed(vary32(rng, 9.0, 5.0), vary32(rng, 5.0, 2.0));
    SignalGraph::stereo(SignalNode::sum([drone, rumble]).reverb(tail, 0.0, 1.0))
        .with_master_gain(0.18)
}

fn aurora(duration: f64, rng: &mut StdRng) -> SignalGraph {
    let layer_count = rng.gen_range(3..=5);
    let mut layers = Vec::with_capacity(layer_count);
    for _ in 0..layer_count {
        let base = vary32(rng, 400.0, 800.0);
        let frequency = Param::from(base).with_lfo(
            Waveform::Sine,
            vary32(rng, 0.1, 0.3),
            base * vary32(rng, 0.2, 0.3),
        );
        let attack = duration * vary(rng, 0.1, 0.2);
        let sustain = duration * vary(rng, 0.4, 0.3);
        let level = vary32(rng, 0.03, 0.02);

        layers.push(
            OscillatorSource::new(Waveform::Sine, frequency)
                .gain(swell(0.0, attack, level, attack + sustain, duration))
                .pan(2.0 * rng.gen::<f32>() - 1.0),
        );
    }

    let hall = ImpulseSpec::new(vary32(rng, 3.0, 2.0), vary32(rng, 2.0, 1.0));
    SignalGraph::stereo(SignalNode::sum(layers).reverb(hall, 1.0, 0.4)).with_master_gain(0.05)
}

fn solar_wind(duration: f64, rng: &mut StdRng) -> SignalGraph {
    let centre = vary32(rng, 2000.0, 2000.0);
    let sweep = Param::from(centre).with_lfo(
        Waveform::Sine,
        vary32(rng, 0.2, 0.5),
        vary32(rng, 800.0, 500.0),
    );
    let q = vary32(rng, 10.0, 10.0);

    let count = (duration * 5.0).floor() as usize;
    let bursts = (0..count)
        .map(|_| {
            let time = rng.gen::<f64>() * duration;
            let level = vary32(rng, 0.005, 0.005);
            let length = vary(rng, 0.01, 0.02);
            (time, level, length)
        })
        .collect();

    let root = NoiseSource::new(NoiseColor::Pink)
        .bandpass(sweep, q)
        .gain(crackle(bursts));
    SignalGraph::stereo(root).with_master_gain(0.06)
}

/// Gate curve opening to `level` at each `(time, level, length)` burst.
/// Bursts that start before the previous one has closed are dropped.
fn crackle(mut bursts: Vec<(f64, f32, f64)>) -> Automation {
    bursts.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut curve = Automation::starting_at(0.0);
    let mut closed_at = f64::NEG_INFINITY;
    for (time, level, length) in bursts {
        if time <= closed_at {
            continue;
        }
        let close = time + length;
        curve = curve
            .hold_until(time)
            .linear_to(level, time + GLIDE_SECONDS)
            .hold_until(close)
            .linear_to(0.0, close + GLIDE_SECONDS);
        closed_at = close + GLIDE_SECONDS;
    }
    curve
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn overlapping_crackles_are_dropped() {
        let curve = crackle(vec![(0.5, 0.01, 0.02), (0.1, 0.005, 0.02), (0.11, 0.009, 0.02)]);
        assert!(curve.validate("gain").is_ok());
        assert_eq!(curve.value_at(0.05), 0.0);
        assert_eq!(curve.value_at(0.115), 0.005);
        assert_eq!(curve.value_at(0.3), 0.0);
        assert_eq!(curve.value_at(0.51), 0.01);
    }

    #[test]
    fn crackle_at_time_zero_is_valid() {
        let curve = crackle(vec![(0.0, 0.006, 0.015)]);
        assert!(curve.validate("gain").is_ok());
        assert_eq!(curve.value_at(0.01), 0.006);
    }

    #[test]
    fn quasar_layers_are_panned_apart() {
        let mut rng = StdRng::seed_from_u64(1);
        let graph = quasar(10.0, &mut rng);
        let SignalNode::ConvolutionReverb { input, dry, wet, impulse, .. } = &graph.root else {
            panic!("quasar should end in its reverb");
        };
        assert_eq!((*dry, *wet), (0.0, 1.0));
        assert!(impulse.reverse);
        let SignalNode::Sum(layers) = input.as_ref() else {
            panic!("expected a sum of layers");
        };
        assert_eq!(layers.len(), 2);
    }

    #[test]
    fn aurora_has_three_to_five_layers() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let graph = aurora(12.0, &mut rng);
            let SignalNode::ConvolutionReverb { input, .. } = &graph.root else {
                panic!("aurora should end in its reverb");
            };
            let SignalNode::Sum(layers) = input.as_ref() else {
                panic!("expected a sum of layers");
            };
            assert!((3..=5).contains(&layers.len()));
        }
    }
}
