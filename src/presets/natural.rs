use rand::{rngs::StdRng, Rng};

use crate::{
    dsp::{Automation, NoiseColor, Waveform},
    patch::{ImpulseSpec, NoiseSource, OscillatorSource, Param, PatchExt, SignalGraph, SignalNode},
};

use super::{strike, swell, vary, vary32, SoundPresetDescriptor, GLIDE_SECONDS};

pub(super) fn presets() -> Vec<SoundPresetDescriptor> {
    vec![
        SoundPresetDescriptor::new(
            "rainforest",
            15.0,
            "Rain on leaves with bird calls, insects and a light wind.",
            rainforest,
        ),
        SoundPresetDescriptor::new(
            "thunderstorm",
            15.0,
            "Heavy rain, distant rolling thunder and gusting wind.",
            thunderstorm,
        ),
        SoundPresetDescriptor::new(
            "whale-song",
            15.0,
            "Slow, low gliding calls in a long reverb.",
            whale_song,
        ),
        SoundPresetDescriptor::new(
            "geyser",
            15.0,
            "Steam hiss building into deep bursts, in a short reverb.",
            geyser,
        ),
    ]
}

/// Hiss of rain with two layers of individual drops, faded in and out
/// with the render.
fn rain(duration: f64, rng: &mut StdRng) -> SignalNode {
    let intensity = Param::from(vary32(rng, 0.025, 0.01)).with_lfo(
        Waveform::Sine,
        vary32(rng, 0.15, 0.2),
        vary32(rng, 0.008, 0.005),
    );
    let hiss = NoiseSource::new(NoiseColor::Pink)
        .highpass(vary32(rng, 1800.0, 400.0), vary32(rng, 1.0, 0.5))
        .gain(intensity);

    let mut layers = vec![hiss];
    for _ in 0..2 {
        let interval = vary(rng, 0.05, 0.15);
        let mut time = rng.gen::<f64>() * interval;
        while time < duration {
            let pitch = vary32(rng, 1500.0, 2000.0);
            let envelope = strike(
                time,
                0.005,
                vary32(rng, 0.003, 0.002),
                time + vary(rng, 0.03, 0.05),
                0.000_01,
            );
            layers.push(
                OscillatorSource::new(Waveform::Triangle, pitch)
                    .between(time, time + 0.1)
                    .gain(envelope)
                    .pan(vary32(rng, -0.7, 1.4)),
            );
            time += interval + (rng.gen::<f64>() - 0.5) * interval * 0.3;
        }
    }

    let fade = Automation::starting_at(0.0)
        .linear_to(1.0, duration * 0.05)
        .hold_until(duration * 0.9)
        .linear_to(0.0, duration);
    SignalNode::sum(layers).gain(fade)
}

/// Groups of short chirps from a few kinds of bird.
fn birds(duration: f64, rng: &mut StdRng) -> Vec<SignalNode> {
    let mut chirps = Vec::new();
    let kinds = rng.gen_range(2..=3);
    for kind in 0..kinds {
        let calls = (duration / vary(rng, 5.0, 7.0)).floor() as usize;
        let base = vary32(rng, 1200.0, 2000.0);
        let pattern = rng.gen_range(2..=4);

        for _ in 0..calls {
            let mut time = rng.gen::<f64>() * (duration - 2.0).max(0.0) + 1.0;
            for _ in 0..pattern {
                if time > duration - 0.5 {
                    break;
                }
                let pan = vary32(rng, -0.9, 1.8);
                let waveform = if rng.gen::<f64>() > 0.4 {
                    Waveform::Sine
                } else {
                    Waveform::Triangle
                };
                let pitch = base + vary32(rng, -400.0, 800.0) * (kind + 1) as f32 * 0.5;
                let length = vary(rng, 0.08, 0.15);

                let frequency = Automation::starting_at(pitch)
                    .hold_until(time)
                    .linear_to(pitch + vary32(rng, -150.0, 300.0), time + length * 0.6)
                    .hold_until(time + length)
                    .linear_to(pitch, time + length + GLIDE_SECONDS);
                let peak = vary32(rng, 0.008, 0.005);
                let envelope = strike(time, length * 0.1, peak, time + length, 0.000_05);

                chirps.push(
                    OscillatorSource::new(waveform, frequency)
                        .between(time, time + length + 0.05)
                        .gain(envelope)
                        .pan(pan),
                );
                time += length + vary(rng, 0.1, 0.3);
            }
        }
    }
    chirps
}

fn rainforest(duration: f64, rng: &mut StdRng) -> SignalGraph {
    let mut layers = vec![rain(duration, rng).gain(0.55)];
    layers.extend(birds(duration, rng));

    let chirr = Param::from(vary32(rng, 0.0008, 0.0005)).with_lfo(
        Waveform::Square,
        vary32(rng, 4.0, 3.0),
        0.0003,
    );
    layers.push(
        NoiseSource::new(NoiseColor::Pink)
            .bandpass(vary32(rng, 3000.0, 1000.0), vary32(rng, 10.0, 5.0))
            .gain(chirr),
    );

    let gust = Param::from(vary32(rng, 500.0, 200.0)).with_lfo(
        Waveform::Sine,
        vary32(rng, 0.08, 0.07),
        vary32(rng, 150.0, 100.0),
    );
    layers.push(
        NoiseSource::new(NoiseColor::Pink)
            .bandpass(gust, vary32(rng, 1.5, 1.0))
            .gain(vary32(rng, 0.003, 0.002)),
    );

    SignalGraph::stereo(SignalNode::sum(layers)).with_master_gain(0.3)
}

fn thunderstorm(duration: f64, rng: &mut StdRng) -> SignalGraph {
    let mut layers = vec![rain(duration, rng).gain(0.7)];

    let strikes = (duration / vary(rng, 7.0, 5.0)).floor() as usize + 2;
    for _ in 0..strikes {
        let start = rng.gen::<f64>() * (duration - 4.0).max(0.0) + 2.0;
        let length = vary(rng, 2.5, 2.5);

        let cutoff = Automation::starting_at(vary32(rng, 40.0, 30.0))
            .hold_until(start)
            .linear_to(20.0, start + length * 0.7);
        let q = vary32(rng, 0.5, 0.5);
        let attack = vary(rng, 0.3, 0.3);
        let peak = vary32(rng, 0.12, 0.08);
        let envelope = strike(start, attack, peak, start + length, 0.0001);
        let rumble = NoiseSource::once(NoiseColor::Brown, length)
            .starting_at(start)
            .lowpass(cutoff, q)
            .gain(envelope);

        if rng.gen::<f64>() > 0.4 {
            let pitch = vary32(rng, 100.0, 150.0);
            let snap = Automation::starting_at(pitch)
                .hold_until(start)
                .exponential_to(pitch * 0.3, start + 0.05);
            let envelope = strike(
                start,
                vary(rng, 0.005, 0.005),
                vary32(rng, 0.05, 0.03),
                start + vary(rng, 0.15, 0.1),
                0.000_01,
            );
            layers.push(
                OscillatorSource::new(Waveform::Sawtooth, snap)
                    .between(start, start + 0.3)
                    .bandpass(vary32(rng, 800.0, 400.0), vary32(rng, 1.0, 1.0))
                    .gain(envelope),
            );
        }

        layers.push(rumble.pan(rng.gen::<f32>() - 0.5));
    }

    // One gust LFO sweeps both wind bands.
    let gust_rate = vary32(rng, 0.1, 0.15);
    let high = Param::from(1500.0).with_lfo(Waveform::Sine, gust_rate, vary32(rng, 800.0, 400.0));
    let high_q = vary32(rng, 3.0, 1.0);
    let low = Param::from(300.0).with_lfo(Waveform::Sine, gust_rate, vary32(rng, 100.0, 50.0));
    let wind = SignalNode::sum([
        NoiseSource::new(NoiseColor::Pink).bandpass(high, high_q),
        NoiseSource::new(NoiseColor::Pink).lowpass(low, 1.0),
    ]);

    let rise = vary32(rng, 0.015, 0.01);
    let fall_from = vary32(rng, 0.015, 0.01);
    let gusts = Automation::starting_at(0.0)
        .linear_to(rise, duration * 0.2)
        .hold_until(duration * 0.8)
        .linear_to(fall_from, duration * 0.8 + GLIDE_SECONDS)
        .linear_to(0.0, duration);
    layers.push(wind.gain(gusts));

    SignalGraph::stereo(SignalNode::sum(layers)).with_master_gain(0.25)
}

fn whale_song(duration: f64, rng: &mut StdRng) -> SignalGraph {
    let calls = ((duration / vary(rng, 4.0, 4.0)).floor() as usize).max(1);
    let mut voices = Vec::with_capacity(calls);
    for _ in 0..calls {
        let time = rng.gen::<f64>() * (duration - 3.0).max(0.0) + 1.0;
        let length = vary(rng, 1.5, 2.5);
        let waveform = if rng.gen::<f64>() > 0.3 {
            Waveform::Sine
        } else {
            Waveform::Triangle
        };

        let from = vary32(rng, 50.0, 100.0);
        let to = (from + vary32(rng, -50.0, 100.0)).max(20.0);
        let settle = from * vary32(rng, 0.8, 0.4);
        let frequency = Automation::starting_at(from)
            .hold_until(time)
            .linear_to(to, time + length * 0.7)
            .hold_until(time + length)
            .linear_to(settle, time + length + GLIDE_SECONDS);
        let envelope = swell(
            time,
            time + length * 0.2,
            vary32(rng, 0.1, 0.05),
            time + length * 0.8,
            time + length,
        );

        voices.push(
            OscillatorSource::new(waveform, frequency)
                .between(time, time + length + 0.2)
                .gain(envelope)
                .pan(vary32(rng, -0.6, 1.2)),
        );
    }

    let ocean = ImpulseSpec::new(vary32(rng, 4.0, 3.0), vary32(rng, 3.0, 2.0));
    SignalGraph::stereo(SignalNode::sum(voices).reverb(ocean, 1.0, 0.6)).with_master_gain(0.1)
}

fn geyser(duration: f64, rng: &mut StdRng) -> SignalGraph {
    let interval = vary(rng, 3.0, 3.0);
    let mut time = vary(rng, 1.0, 1.0).min(duration * 0.25);
    let mut layers = Vec::new();
    loop {
        let hiss_length = vary(rng, 0.5, 1.0);
        let envelope = swell(
            time,
            time + hiss_length * 0.3,
            vary32(rng, 0.02, 0.01),
            time + hiss_length * 0.7,
            time + hiss_length,
        );
        layers.push(
            NoiseSource::once(NoiseColor::Pink, hiss_length)
                .starting_at(time)
                .highpass(vary32(rng, 1500.0, 1000.0), 1.0)
                .gain(envelope),
        );

        let burst = time + hiss_length * vary(rng, 0.6, 0.2);
        let burst_length = vary(rng, 0.3, 0.4);
        let envelope = strike(
            burst,
            burst_length * 0.1,
            vary32(rng, 0.25, 0.1),
            burst + burst_length,
            0.001,
        );
        layers.push(
            NoiseSource::once(NoiseColor::Brown, burst_length)
                .starting_at(burst)
                .lowpass(vary32(rng, 300.0, 200.0), vary32(rng, 1.0, 1.0))
                .gain(envelope)
                .pan(vary32(rng, -0.3, 0.6)),
        );

        time += interval + (rng.gen::<f64>() - 0.5) * interval * 0.3;
        if time >= duration - 2.0 {
            break;
        }
    }

    let vent = ImpulseSpec::new(vary32(rng, 1.5, 1.0), vary32(rng, 1.0, 0.5));
    SignalGraph::stereo(SignalNode::sum(layers).reverb(vent, 1.0, 0.25)).with_master_gain(0.2)
}
