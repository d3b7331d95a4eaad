use std::sync::Arc;

use cosmic_dsp::{
    config::SynthesisConfig,
    dsp::{noise::generate_white_noise, Automation, NoiseColor, Waveform},
    patch::{NoiseSource, OscillatorSource, PatchExt, SignalGraph, SignalNode},
    presets::{PresetRegistry, RenderRequest, SoundPresetDescriptor},
    render::{OfflineRenderer, RenderSpec},
    GraphError,
};
use rand::{rngs::StdRng, SeedableRng};

const SAMPLE_RATE: u32 = 8_000;

fn quick(seconds: f64) -> RenderRequest {
    RenderRequest::default()
        .duration(seconds)
        .sample_rate(SAMPLE_RATE)
        .seed(2024)
}

#[test]
fn white_noise_has_exact_length_and_range() {
    let mut rng = StdRng::seed_from_u64(1);
    let noise = generate_white_noise(&mut rng, 44_100, 1.0);
    assert_eq!(noise.len(), 44_100);
    assert!(noise.iter().all(|s| (-1.0..=1.0).contains(s)));
}

#[test]
fn every_preset_renders_finite_audio_of_the_right_length() {
    let registry = PresetRegistry::builtin();
    for id in registry.ids() {
        for seconds in [0.3, 1.5] {
            let buffer = registry
                .render(id, quick(seconds))
                .unwrap_or_else(|err| panic!("{id} at {seconds} s: {err}"));
            let expected = (SAMPLE_RATE as f64 * seconds).round() as usize;
            assert_eq!(buffer.len(), expected, "{id}");
            assert_eq!(buffer.sample_rate(), SAMPLE_RATE);
            assert!(buffer.samples().all(f32::is_finite), "{id} produced a non-finite sample");
        }
    }
}

#[test]
fn suggested_duration_is_the_default() {
    let registry = PresetRegistry::with_builtins(&SynthesisConfig {
        sample_rate: 2_000,
        ..SynthesisConfig::default()
    });
    let buffer = registry.render("white-noise", RenderRequest::default().seed(5)).unwrap();
    assert_eq!(buffer.len(), 14_000);
    assert_eq!(buffer.channel_count(), 1);
}

#[test]
fn presets_are_audible_and_not_clipping_wildly() {
    let registry = PresetRegistry::builtin();
    for id in ["pulsar", "black-hole", "aurora", "rainforest", "thunderstorm", "geyser"] {
        let buffer = registry.render(id, quick(3.0)).unwrap();
        let peak = buffer.samples().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak > 1e-4, "{id} is silent");
        assert!(peak < 4.0, "{id} peaks at {peak}");
    }
}

#[test]
fn invalid_graph_fails_with_the_preset_id() {
    let mut registry = PresetRegistry::new(&SynthesisConfig::default());
    registry.register(SoundPresetDescriptor::new(
        "negative-tone",
        1.0,
        "an oscillator below 0 Hz",
        |_: f64, _: &mut StdRng| {
            SignalGraph::stereo(OscillatorSource::new(Waveform::Sine, -10.0).pan(0.0))
        },
    ));
    registry.register(SoundPresetDescriptor::new(
        "stereo-filter",
        1.0,
        "a panned signal into a filter",
        |_: f64, _: &mut StdRng| {
            SignalGraph::stereo(NoiseSource::new(NoiseColor::Pink).pan(0.5).lowpass(500.0, 1.0))
        },
    ));
    registry.register(SoundPresetDescriptor::new(
        "through-zero",
        1.0,
        "an exponential fade to silence",
        |_: f64, _: &mut StdRng| {
            let fade = Automation::starting_at(1.0).exponential_to(0.0, 0.5);
            SignalGraph::mono(NoiseSource::new(NoiseColor::White).gain(fade))
        },
    ));

    let err = registry.render("negative-tone", quick(0.5)).unwrap_err();
    assert_eq!(err.preset_id, "negative-tone");
    assert!(matches!(err.cause, GraphError::NonPositiveFrequency(_)));
    assert!(err.to_string().contains("negative-tone"));

    let err = registry.render("stereo-filter", quick(0.5)).unwrap_err();
    assert!(matches!(err.cause, GraphError::StereoInput { .. }));

    let err = registry.render("through-zero", quick(0.5)).unwrap_err();
    assert!(matches!(err.cause, GraphError::ExponentialThroughZero { .. }));
}

#[test]
fn renderer_rejects_bad_specs() {
    let renderer = OfflineRenderer::default();
    let graph = SignalGraph::mono(OscillatorSource::new(Waveform::Sine, 440.0));
    let spec = |sample_rate, duration| RenderSpec {
        sample_rate,
        duration,
        seed: 0,
    };

    assert!(matches!(
        renderer.render(&graph, spec(0, 1.0)),
        Err(GraphError::InvalidSampleRate(0))
    ));
    assert!(matches!(
        renderer.render(&graph, spec(8_000, 0.0)),
        Err(GraphError::InvalidDuration(_))
    ));
    assert!(matches!(
        renderer.render(&graph, spec(8_000, 600.0)),
        Err(GraphError::RenderTooLong { .. })
    ));
    assert!(matches!(
        renderer.render(&SignalGraph::stereo(SignalNode::sum(Vec::new())), spec(8_000, 1.0)),
        Err(GraphError::EmptySum)
    ));
}

#[test]
fn a_sine_renders_at_its_pitch() {
    let renderer = OfflineRenderer::default();
    let graph = SignalGraph::mono(OscillatorSource::new(Waveform::Sine, 100.0));
    let buffer = renderer
        .render(
            &graph,
            RenderSpec {
                sample_rate: SAMPLE_RATE,
                duration: 1.0,
                seed: 0,
            },
        )
        .unwrap();
    let samples = buffer.channel(0).unwrap();
    let upward_crossings = samples.windows(2).filter(|w| w[0] < 0.0 && w[1] >= 0.0).count();
    assert!((99..=101).contains(&upward_crossings), "{upward_crossings}");
}

#[test]
fn background_renders_can_be_shared() {
    let registry = Arc::new(PresetRegistry::builtin());
    let tasks: Vec<_> = ["quasar", "mars-quake", "whale-song"]
        .into_iter()
        .map(|id| registry.spawn_render(id, quick(0.5)))
        .collect();
    for task in tasks {
        let id = task.preset_id().to_owned();
        let buffer = task.join().unwrap_or_else(|err| panic!("{id}: {err}"));
        assert_eq!(buffer.len(), 4_000);
    }
}
