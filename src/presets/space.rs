//! Sounds modelled on recordings from space missions: radio emission from
//! Jupiter's magnetosphere, the microwave background and seismometer
//! readings from Mars.

use rand::{rngs::StdRng, Rng};

use crate::{
    dsp::{Automation, NoiseColor, Waveform},
    patch::{NoiseSource, OscillatorSource, Param, PatchExt, SignalGraph, SignalNode},
};

use super::{strike, vary, vary32, SoundPresetDescriptor, GLIDE_SECONDS};

pub(super) fn presets() -> Vec<SoundPresetDescriptor> {
    vec![
        SoundPresetDescriptor::new(
            "jupiter-radio",
            7.0,
            "Falling whistlers and short sawtooth bursts scattered across the field.",
            jupiter_radio,
        ),
        SoundPresetDescriptor::new(
            "cosmic-background",
            12.0,
            "Low-passed pink noise whose cutoff breathes over tens of seconds.",
            cosmic_background,
        ),
        SoundPresetDescriptor::new(
            "mars-quake",
            12.0,
            "Deep falling rumbles, some answered by a metallic ping.",
            mars_quake,
        ),
    ]
}

fn jupiter_radio(duration: f64, rng: &mut StdRng) -> SignalGraph {
    let count = ((duration * 2.0).floor() as usize).max(1);
    let mut events = Vec::with_capacity(count);
    for _ in 0..count {
        let time = rng.gen::<f64>() * duration;
        let whistler = rng.gen::<f64>() > 0.4;
        let pan = vary32(rng, -0.7, 1.4);
        let peak = vary32(rng, 0.25, 0.15);

        let (waveform, frequency, fade) = if whistler {
            let from = vary32(rng, 1000.0, 2000.0);
            let to = vary32(rng, 100.0, 500.0);
            let fall = vary(rng, 0.3, 0.4);
            let frequency = Automation::starting_at(from)
                .hold_until(time)
                .exponential_to(to, time + fall);
            (Waveform::Sine, frequency, vary(rng, 0.4, 0.5))
        } else {
            let pitch = vary32(rng, 500.0, 1500.0);
            let wobble = pitch * (1.0 + (rng.gen::<f32>() - 0.5) * 0.2);
            let frequency = Automation::starting_at(pitch)
                .hold_until(time + 0.05)
                .linear_to(wobble, time + 0.05 + GLIDE_SECONDS);
            (Waveform::Sawtooth, frequency, vary(rng, 0.05, 0.05))
        };

        events.push(
            OscillatorSource::new(waveform, frequency)
                .between(time, time + 1.0)
                .gain(strike(time, 0.01, peak, time + fade, 0.001))
                .pan(pan),
        );
    }

    SignalGraph::stereo(SignalNode::sum(events)).with_master_gain(0.08)
}

fn cosmic_background(_duration: f64, _rng: &mut StdRng) -> SignalGraph {
    let cutoff = Param::from(250.0).with_lfo(Waveform::Sine, 0.015, 40.0);
    let root = NoiseSource::new(NoiseColor::Pink).lowpass(cutoff, 0.6);
    SignalGraph::stereo(root).with_master_gain(0.05)
}

fn mars_quake(duration: f64, rng: &mut StdRng) -> SignalGraph {
    let count = ((duration / 2.5).floor() as usize).max(1);
    let mut layers = Vec::new();
    for _ in 0..count {
        let time = rng.gen::<f64>() * (duration - 1.5).max(0.0) + 0.5;

        let base = vary32(rng, 15.0, 15.0);
        let sag = Automation::starting_at(base)
            .hold_until(time)
            .linear_to(base * 0.6, time + vary(rng, 1.2, 0.5));
        let envelope = strike(
            time,
            vary(rng, 0.25, 0.15),
            vary32(rng, 0.35, 0.15),
            time + vary(rng, 1.8, 1.2),
            0.001,
        );
        layers.push(
            OscillatorSource::new(Waveform::Sine, sag)
                .between(time, time + 3.5)
                .gain(envelope)
                .pan(vary32(rng, -0.4, 0.8)),
        );

        if rng.gen::<f64>() > 0.5 {
            let ping = time + rng.gen::<f64>() * 0.3;
            let pitch = vary32(rng, 600.0, 1000.0);
            let envelope = strike(
                ping,
                0.004,
                vary32(rng, 0.08, 0.07),
                ping + vary(rng, 0.08, 0.08),
                0.001,
            );
            layers.push(
                OscillatorSource::new(Waveform::Triangle, pitch)
                    .between(ping, ping + 0.25)
                    .gain(envelope)
                    .pan(vary32(rng, -0.6, 1.2)),
            );
        }
    }

    SignalGraph::stereo(SignalNode::sum(layers)).with_master_gain(0.12)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn event_count(graph: &SignalGraph) -> usize {
        match &graph.root {
            SignalNode::Sum(inputs) => inputs.len(),
            other => panic!("expected a sum, got {}", other.kind()),
        }
    }

    #[test]
    fn jupiter_has_two_events_per_second() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(event_count(&jupiter_radio(7.0, &mut rng)), 14);
    }

    #[test]
    fn short_renders_still_have_events() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(event_count(&jupiter_radio(0.2, &mut rng)), 1);
        assert!(event_count(&mars_quake(1.0, &mut rng)) >= 1);
    }

    #[test]
    fn every_curve_is_valid() {
        for seed in 0..25 {
            let mut rng = StdRng::seed_from_u64(seed);
            let graph = mars_quake(12.0, &mut rng);
            let SignalNode::Sum(layers) = &graph.root else {
                unreachable!();
            };
            for layer in layers {
                let SignalNode::Panner { input, .. } = layer else {
                    panic!("every layer is panned");
                };
                let SignalNode::Gain { gain, .. } = input.as_ref() else {
                    panic!("every layer has an envelope");
                };
                assert!(gain.automation.validate("gain").is_ok());
            }
        }
    }
}
