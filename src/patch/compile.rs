use rand::rngs::StdRng;

use crate::{
    dsp::{impulse::generate_impulse_response, noise::buffer_len, noise::generate_noise},
    error::GraphError,
    graph::{
        amplify::Amplify,
        delay::{FeedbackDelay, MAX_DELAY_SECONDS},
        extensions::NodeExt,
        filter::{FilterNode, FilterParam},
        gain::{GainNode, GainParam},
        lfo::LfoNode,
        mix::{Bus, Sum},
        modulate::Modulate,
        node::{GraphNode, Modulatable, StereoNode},
        noise::NoiseNode,
        oscillator::{OscNode, OscParam},
        pan::{Centered, PanParam, Panner, StereoPanner},
        reverb::ConvolverNode,
        shaper::ShaperNode,
    },
    patch::{Modulator, NoiseSource, OscillatorSource, SignalNode, Window},
};

/*
Compiling a Patch
=================

A `SignalNode` tree is data; compiling walks it depth first and builds the
matching render nodes. Everything random (noise buffers, impulse
responses) is generated here from the context's RNG, so a patch compiled
twice with the same seed renders the same samples.

Channels
--------

Every compiled node is either mono or stereo:

  oscillator, noise            mono
  filter, delay, shaper        mono in, mono out (stereo input is an error)
  gain                         keeps the channel count of its input
  panner                       always stereo
  convolution reverb           always stereo; a mono input is centered first
  sum                          mono if every input is mono, else stereo

Parameters
----------

A parameter's automation curve goes straight into the node. Each modulator
is compiled as a mono signal and routed through `Modulate`, which adds its
block average × depth on top of the curve. A plain constant-rate oscillator
used as a modulator becomes an `LfoNode`.
*/

/// What compilation needs to know about the render.
pub struct CompileContext<'a> {
    pub sample_rate: u32,
    /// Length of the render in seconds. Noise buffers without an explicit
    /// length and impulse responses are sized from it.
    pub duration: f64,
    /// Convolution partition size.
    pub partition: usize,
    pub rng: &'a mut StdRng,
}

pub enum Compiled {
    Mono(Box<dyn GraphNode>),
    Stereo(Box<dyn StereoNode>),
}

impl Compiled {
    pub fn is_stereo(&self) -> bool {
        matches!(self, Compiled::Stereo(_))
    }

    /// Mono nodes are copied to both channels.
    pub fn into_stereo(self) -> Box<dyn StereoNode> {
        match self {
            Compiled::Mono(node) => Box::new(Centered::new(node)),
            Compiled::Stereo(node) => node,
        }
    }

    fn into_mono(self, consumer: &'static str) -> Result<Box<dyn GraphNode>, GraphError> {
        match self {
            Compiled::Mono(node) => Ok(node),
            Compiled::Stereo(_) => Err(GraphError::StereoInput { node: consumer }),
        }
    }
}

/// Validate `node` and build its render nodes.
pub fn compile(node: &SignalNode, cx: &mut CompileContext<'_>) -> Result<Compiled, GraphError> {
    match node {
        SignalNode::Oscillator(source) => compile_oscillator(source, cx).map(Compiled::Mono),
        SignalNode::Noise(source) => compile_noise(source, cx).map(Compiled::Mono),

        SignalNode::Gain { input, gain } => {
            gain.automation.validate("gain")?;
            let control = modulated(
                GainNode::new(gain.automation.clone()),
                &[(GainParam::Gain, &gain.modulators)],
                cx,
            )?;
            Ok(match compile(input, cx)? {
                Compiled::Mono(signal) => Compiled::Mono(Box::new(Amplify::new(signal, control))),
                Compiled::Stereo(signal) => {
                    Compiled::Stereo(Box::new(Amplify::new(signal, control)))
                }
            })
        }

        SignalNode::Filter {
            input,
            kind,
            cutoff,
            q,
        } => {
            cutoff.automation.validate("cutoff")?;
            if let Some(bad) = cutoff.automation.values().find(|&v| v <= 0.0) {
                return Err(GraphError::NonPositiveCutoff(bad));
            }
            q.automation.validate("q")?;
            if let Some(bad) = q.automation.values().find(|&v| v <= 0.0) {
                return Err(GraphError::InvalidQ(bad));
            }

            let signal = compile(input, cx)?.into_mono("filter")?;
            let filter = modulated(
                FilterNode::new(*kind, cutoff.automation.clone(), q.automation.clone()),
                &[
                    (FilterParam::Cutoff, &cutoff.modulators),
                    (FilterParam::Q, &q.modulators),
                ],
                cx,
            )?;
            Ok(Compiled::Mono(Box::new(signal.through(filter))))
        }

        SignalNode::Panner { input, pan } => {
            pan.automation.validate("pan")?;
            if let Some(bad) = pan.automation.values().find(|v| !(-1.0..=1.0).contains(v)) {
                return Err(GraphError::PanOutOfRange(bad));
            }
            let placed = match compile(input, cx)? {
                Compiled::Mono(signal) => modulated_stereo(
                    Panner::new(signal, pan.automation.clone()),
                    PanParam::Position,
                    &pan.modulators,
                    cx,
                )?,
                Compiled::Stereo(signal) => modulated_stereo(
                    StereoPanner::new(signal, pan.automation.clone()),
                    PanParam::Position,
                    &pan.modulators,
                    cx,
                )?,
            };
            Ok(Compiled::Stereo(placed))
        }

        SignalNode::Delay {
            input,
            time,
            feedback,
            dry,
            wet,
        } => {
            if !(time.is_finite() && *time > 0.0 && *time <= MAX_DELAY_SECONDS) {
                return Err(GraphError::DelayOutOfRange(*time));
            }
            if !(0.0..1.0).contains(feedback) {
                return Err(GraphError::FeedbackOutOfRange(*feedback));
            }
            check_mix("delay mix", *dry, *wet)?;
            let signal = compile(input, cx)?.into_mono("delay")?;
            let delay = FeedbackDelay::new(signal, *time, *feedback, cx.sample_rate as f32)
                .with_mix(*dry, *wet);
            Ok(Compiled::Mono(Box::new(delay)))
        }

        SignalNode::Shaper { input, curve } => {
            if curve.len() < 2 {
                return Err(GraphError::ShortCurve);
            }
            if curve.iter().any(|v| !v.is_finite()) {
                return Err(GraphError::NonFinite {
                    param: "shaper curve",
                });
            }
            let signal = compile(input, cx)?.into_mono("shaper")?;
            Ok(Compiled::Mono(Box::new(
                signal.through(ShaperNode::new(curve.clone())),
            )))
        }

        SignalNode::ConvolutionReverb {
            input,
            impulse,
            dry,
            wet,
            normalize,
        } => {
            let valid = impulse.seconds.is_finite()
                && impulse.seconds > 0.0
                && impulse.decay.is_finite()
                && impulse.decay >= 0.0;
            if !valid {
                return Err(GraphError::InvalidImpulse {
                    seconds: impulse.seconds,
                    decay: impulse.decay,
                });
            }
            check_mix("reverb mix", *dry, *wet)?;

            let signal = compile(input, cx)?.into_stereo();
            let mut response = generate_impulse_response(
                cx.rng,
                cx.sample_rate,
                impulse.seconds as f64,
                impulse.decay,
                impulse.reverse,
            );
            // Normalize on the whole response, then drop the part that
            // can't reach the output before the render ends.
            if *normalize {
                response.normalize(cx.sample_rate as f32);
            }
            response.truncate(buffer_len(cx.sample_rate, cx.duration).max(1));

            let reverb = ConvolverNode::new(signal, response, cx.partition, cx.sample_rate as f32)
                .with_mix(*dry, *wet);
            Ok(Compiled::Stereo(Box::new(reverb)))
        }

        SignalNode::Sum(inputs) => {
            if inputs.is_empty() {
                return Err(GraphError::EmptySum);
            }
            let compiled = inputs
                .iter()
                .map(|input| compile(input, cx))
                .collect::<Result<Vec<_>, _>>()?;

            if compiled.iter().any(Compiled::is_stereo) {
                let inputs = compiled.into_iter().map(Compiled::into_stereo).collect();
                Ok(Compiled::Stereo(Box::new(Bus::new(inputs))))
            } else {
                let inputs = compiled
                    .into_iter()
                    .map(|c| c.into_mono("sum"))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Compiled::Mono(Box::new(Sum::new(inputs))))
            }
        }
    }
}

fn compile_oscillator(
    source: &OscillatorSource,
    cx: &mut CompileContext<'_>,
) -> Result<Box<dyn GraphNode>, GraphError> {
    source.frequency.automation.validate("frequency")?;
    if let Some(bad) = source.frequency.automation.values().find(|&v| v <= 0.0) {
        return Err(GraphError::NonPositiveFrequency(bad));
    }
    source.detune.automation.validate("detune")?;

    let osc = OscNode::new(source.waveform)
        .with_frequency(source.frequency.automation.clone())
        .with_detune(source.detune.automation.clone());
    let osc = modulated(
        osc,
        &[
            (OscParam::Frequency, &source.frequency.modulators),
            (OscParam::Detune, &source.detune.modulators),
        ],
        cx,
    )?;
    scheduled(osc, source.window)
}

fn compile_noise(
    source: &NoiseSource,
    cx: &mut CompileContext<'_>,
) -> Result<Box<dyn GraphNode>, GraphError> {
    let seconds = source.seconds.unwrap_or(cx.duration);
    if !(seconds.is_finite() && seconds > 0.0) {
        return Err(GraphError::InvalidDuration(seconds));
    }
    let buffer = generate_noise(source.color, cx.rng, cx.sample_rate, seconds);
    let node = if source.looped {
        NoiseNode::looped(buffer)
    } else {
        NoiseNode::once(buffer)
    };
    scheduled(Box::new(node), source.window)
}

fn scheduled(node: Box<dyn GraphNode>, window: Window) -> Result<Box<dyn GraphNode>, GraphError> {
    let stop = window.stop.unwrap_or(f64::INFINITY);
    let valid = window.start.is_finite()
        && window.start >= 0.0
        && (window.stop.is_none() || (stop.is_finite() && stop > window.start));
    if !valid {
        return Err(GraphError::InvalidWindow {
            start: window.start,
            stop,
        });
    }

    if window.is_whole_render() {
        Ok(node)
    } else {
        Ok(Box::new(node.between(window.start, stop)))
    }
}

fn check_mix(param: &'static str, dry: f32, wet: f32) -> Result<(), GraphError> {
    if dry.is_finite() && wet.is_finite() {
        Ok(())
    } else {
        Err(GraphError::NonFinite { param })
    }
}

/// A modulator's signal. Plain constant-rate oscillators run as LFOs.
fn compile_modulator(
    modulator: &Modulator,
    cx: &mut CompileContext<'_>,
) -> Result<Box<dyn GraphNode>, GraphError> {
    if !modulator.depth.is_finite() {
        return Err(GraphError::NonFinite {
            param: "modulation depth",
        });
    }

    if let SignalNode::Oscillator(osc) = &modulator.source {
        let plain = osc.frequency.modulators.is_empty()
            && osc.frequency.automation.is_constant()
            && osc.detune.modulators.is_empty()
            && osc.detune.automation.values().all(|v| v == 0.0)
            && osc.window.is_whole_render();
        if plain {
            let rate = osc.frequency.automation.initial();
            if !(rate.is_finite() && rate > 0.0) {
                return Err(GraphError::NonPositiveFrequency(rate));
            }
            return Ok(Box::new(LfoNode::with_waveform(osc.waveform, rate)));
        }
    }

    compile(&modulator.source, cx)?.into_mono("modulator")
}

/// Wrap `node` in a `Modulate` carrying every modulator of its parameters,
/// or return it as is when there are none.
fn modulated<S>(
    node: S,
    params: &[(S::Param, &Vec<Modulator>)],
    cx: &mut CompileContext<'_>,
) -> Result<Box<dyn GraphNode>, GraphError>
where
    S: GraphNode + Modulatable + 'static,
{
    if params.iter().all(|(_, modulators)| modulators.is_empty()) {
        return Ok(Box::new(node));
    }

    let mut wrapped = Modulate::unrouted(node);
    for (param, modulators) in params {
        for modulator in modulators.iter() {
            let lfo = compile_modulator(modulator, cx)?;
            wrapped.push_route(lfo, *param, modulator.depth);
        }
    }
    Ok(Box::new(wrapped))
}

fn modulated_stereo<S>(
    node: S,
    param: S::Param,
    modulators: &[Modulator],
    cx: &mut CompileContext<'_>,
) -> Result<Box<dyn StereoNode>, GraphError>
where
    S: StereoNode + Modulatable + 'static,
{
    if modulators.is_empty() {
        return Ok(Box::new(node));
    }

    let mut wrapped = Modulate::unrouted(node);
    for modulator in modulators {
        let lfo = compile_modulator(modulator, cx)?;
        wrapped.push_route(lfo, param, modulator.depth);
    }
    Ok(Box::new(wrapped))
}
