//! Pre-built procedural sounds.
//!
//! Each preset is a factory that builds a fresh [`SignalGraph`] for a given
//! duration, drawing its random choices (event times, pitches, pans) from
//! the RNG it is handed. The same seed always produces the same sound.
//!
//! # Example
//!
//! ```no_run
//! use cosmic_dsp::presets::{PresetRegistry, RenderRequest};
//!
//! let registry = PresetRegistry::builtin();
//! let pulsar = registry.render("pulsar", RenderRequest::default().seed(7))?;
//! assert_eq!(pulsar.channel_count(), 2);
//! # Ok::<(), cosmic_dsp::SynthesisError>(())
//! ```
//!
//! # The sounds
//!
//! | id                  | length | built from                                     |
//! |---------------------|--------|------------------------------------------------|
//! | `white-noise`       | 7 s    | flat noise, mono                               |
//! | `pulsar`            | 7 s    | shaped pulses through a ringing bandpass, echo |
//! | `jupiter-radio`     | 7 s    | falling whistlers and sawtooth bursts          |
//! | `quasar`            | 10 s   | detuned partial drones into a reversed reverb  |
//! | `black-hole`        | 12 s   | sub-audio drone and rumbling noise, reversed   |
//! | `cosmic-background` | 12 s   | slowly breathing low-passed pink noise         |
//! | `mars-quake`        | 12 s   | falling sub rumbles with metallic pings        |
//! | `aurora`            | 12 s   | wandering sine layers in a small hall          |
//! | `solar-wind`        | 12 s   | whistling band of noise, crackling             |
//! | `rainforest`        | 15 s   | rain, birds, insects and wind                  |
//! | `thunderstorm`      | 15 s   | rain, distant thunder, gusting wind            |
//! | `whale-song`        | 15 s   | slow low calls in a long reverb                |
//! | `geyser`            | 15 s   | steam hiss building into deep bursts           |

use std::{collections::HashMap, sync::Arc};

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    config::SynthesisConfig,
    dsp::Automation,
    error::{Error, GraphError, SynthesisError},
    patch::SignalGraph,
    render::{OfflineRenderer, RenderSpec, RenderTask, RenderedBuffer},
};

mod cosmic;
mod natural;
mod noise;
mod space;

/// Builds a preset's graph for a render of `duration` seconds.
pub trait GraphFactory: Send + Sync {
    fn build(&self, duration: f64, rng: &mut StdRng) -> SignalGraph;
}

impl<F> GraphFactory for F
where
    F: Fn(f64, &mut StdRng) -> SignalGraph + Send + Sync,
{
    fn build(&self, duration: f64, rng: &mut StdRng) -> SignalGraph {
        self(duration, rng)
    }
}

#[derive(Clone)]
pub struct SoundPresetDescriptor {
    pub id: &'static str,
    pub factory: Arc<dyn GraphFactory>,
    /// Length the sound was designed for, in seconds.
    pub suggested_duration: f64,
    pub description: &'static str,
}

impl SoundPresetDescriptor {
    pub fn new(
        id: &'static str,
        suggested_duration: f64,
        description: &'static str,
        factory: impl GraphFactory + 'static,
    ) -> Self {
        Self {
            id,
            factory: Arc::new(factory),
            suggested_duration,
            description,
        }
    }
}

impl std::fmt::Debug for SoundPresetDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundPresetDescriptor")
            .field("id", &self.id)
            .field("suggested_duration", &self.suggested_duration)
            .finish_non_exhaustive()
    }
}

/// Options for rendering a preset. Unset fields fall back to the preset's
/// suggested duration, the registry's sample rate and a random seed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderRequest {
    pub duration: Option<f64>,
    pub sample_rate: Option<u32>,
    pub seed: Option<u64>,
}

impl RenderRequest {
    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Preset lookup by id.
#[derive(Debug, Clone)]
pub struct PresetRegistry {
    presets: HashMap<&'static str, SoundPresetDescriptor>,
    renderer: OfflineRenderer,
    sample_rate: u32,
}

impl PresetRegistry {
    /// An empty registry rendering with `config`.
    pub fn new(config: &SynthesisConfig) -> Self {
        Self {
            presets: HashMap::new(),
            renderer: OfflineRenderer::new(config),
            sample_rate: config.sample_rate,
        }
    }

    /// All built-in sounds, default synthesis settings.
    pub fn builtin() -> Self {
        Self::with_builtins(&SynthesisConfig::default())
    }

    pub fn with_builtins(config: &SynthesisConfig) -> Self {
        let mut registry = Self::new(config);
        for preset in noise::presets()
            .into_iter()
            .chain(cosmic::presets())
            .chain(space::presets())
            .chain(natural::presets())
        {
            registry.register(preset);
        }
        registry
    }

    /// Add a preset, replacing any with the same id.
    pub fn register(&mut self, preset: SoundPresetDescriptor) {
        self.presets.insert(preset.id, preset);
    }

    pub fn get(&self, id: &str) -> Result<&SoundPresetDescriptor, Error> {
        self.presets
            .get(id)
            .ok_or_else(|| Error::UnknownPreset(id.to_owned()))
    }

    /// Preset ids, sorted.
    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.presets.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Build and render a preset on the calling thread.
    pub fn render(
        &self,
        id: &str,
        request: RenderRequest,
    ) -> Result<RenderedBuffer, SynthesisError> {
        let preset = self
            .presets
            .get(id)
            .ok_or_else(|| SynthesisError::new(id, GraphError::UnknownPreset))?;

        let duration = request.duration.unwrap_or(preset.suggested_duration);
        if !(duration.is_finite() && duration > 0.0) {
            return Err(SynthesisError::new(id, GraphError::InvalidDuration(duration)));
        }
        let seed = request.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let mut rng = StdRng::seed_from_u64(seed);

        let graph = preset.factory.build(duration, &mut rng);
        let spec = RenderSpec {
            sample_rate: request.sample_rate.unwrap_or(self.sample_rate),
            duration,
            seed: rng.gen(),
        };
        log::info!("rendering preset `{id}`: {duration} s at {} Hz, seed {seed}", spec.sample_rate);

        self.renderer
            .render(&graph, spec)
            .map_err(|cause| SynthesisError::new(id, cause))
    }

    /// Render on a worker thread.
    pub fn spawn_render(self: &Arc<Self>, id: &str, request: RenderRequest) -> RenderTask {
        let registry = Arc::clone(self);
        let preset_id = id.to_owned();
        RenderTask::spawn(id, move || registry.render(&preset_id, request))
    }
}

impl Default for PresetRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Frequency steps are played as linear glides this long.
const GLIDE_SECONDS: f64 = 0.005;

/// `base + U[0, 1) × spread`.
fn vary(rng: &mut StdRng, base: f64, spread: f64) -> f64 {
    base + rng.gen::<f64>() * spread
}

/// Like `vary`, for parameter values.
fn vary32(rng: &mut StdRng, base: f32, spread: f32) -> f32 {
    base + rng.gen::<f32>() * spread
}

/// Silent until `start`, linear rise to `peak` over `attack`, then an
/// exponential fall to `floor` at `end`.
fn strike(start: f64, attack: f64, peak: f32, end: f64, floor: f32) -> Automation {
    Automation::starting_at(0.0)
        .hold_until(start)
        .linear_to(peak, start + attack)
        .exponential_to(floor, end)
}

/// Silent until `start`, linear rise to `level` at `full`, held until
/// `release`, linear fall to silence at `end`.
fn swell(start: f64, full: f64, level: f32, release: f64, end: f64) -> Automation {
    Automation::starting_at(0.0)
        .hold_until(start)
        .linear_to(level, full)
        .hold_until(release)
        .linear_to(0.0, end)
}
