//! Render a preset, write it to a WAV file, then run it back through the
//! analyser and print the report.
//!
//! ```text
//! cargo run --example render_preset -- pulsar 7 pulsar.wav
//! RUST_LOG=debug cargo run --example render_preset -- whale-song
//! ```
//!
//! Set `COSMIC_CONFIG` to a TOML file to override engine settings.

use std::{path::PathBuf, sync::Arc};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cosmic_dsp::{
    capture::{CaptureController, CoreEvent, TickOutcome},
    config::load_config,
    presets::{PresetRegistry, RenderRequest},
    EngineConfig,
};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let id = args.next().unwrap_or_else(|| "pulsar".to_owned());
    let seconds = args
        .next()
        .map(|s| s.parse::<f64>().wrap_err_with(|| format!("invalid duration `{s}`")))
        .transpose()?;
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(format!("{id}.wav")));

    let config = match std::env::var_os("COSMIC_CONFIG") {
        Some(path) => load_config(std::path::Path::new(&path)).wrap_err("failed to load config")?,
        None => EngineConfig::default(),
    };

    let registry = Arc::new(PresetRegistry::with_builtins(&config.synthesis));
    let preset = registry.get(&id).map_err(|_| {
        eyre!(
            "unknown preset `{id}`; try one of: {}",
            registry.ids().join(", ")
        )
    })?;
    println!("=== {id} ===");
    println!("{}", preset.description);

    let mut request = RenderRequest::default();
    if let Some(seconds) = seconds {
        request = request.duration(seconds);
    }
    let buffer = Arc::new(registry.render(&id, request)?);
    println!(
        "Rendered {:.2} s, {} channels at {} Hz",
        buffer.duration(),
        buffer.channel_count(),
        buffer.sample_rate()
    );

    write_wav(&output, &buffer)?;
    println!("Wrote {}", output.display());

    let mut controller = CaptureController::new(config);
    controller.subscribe(|event: &CoreEvent| {
        if let CoreEvent::Frame {
            timestamp,
            analysis,
            ..
        } = event
        {
            if !analysis.is_silent() {
                log::debug!("{timestamp:6.2} s  {:7.1} Hz", analysis.fundamental);
            }
        }
    });
    controller.play_and_analyze(Arc::clone(&buffer))?;

    let report = loop {
        if let TickOutcome::Finished(report) = controller.tick() {
            break report;
        }
    };

    println!();
    match report {
        Some(report) => {
            println!("Fundamental: {} Hz ({})", report.fundamental_freq, report.estimated_note);
            for harmonic in &report.harmonics {
                println!(
                    "  {:>2}  {:>6} Hz  {:>6.1} dB{}",
                    harmonic.order,
                    harmonic.frequency,
                    harmonic.amplitude,
                    if harmonic.is_fundamental { "  (fundamental)" } else { "" }
                );
            }
            println!("Loudness: {}", report.loudness);
            println!("Peak:     {}", report.peak_amplitude);
        }
        None => println!("Nothing was analysed"),
    }

    Ok(())
}

fn write_wav(path: &std::path::Path, buffer: &cosmic_dsp::AudioBuffer) -> EyreResult<()> {
    let spec = hound::WavSpec {
        channels: buffer.channel_count() as u16,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .wrap_err_with(|| format!("failed to create {}", path.display()))?;
    for i in 0..buffer.len() {
        for channel in buffer.channels() {
            writer.write_sample(channel[i])?;
        }
    }
    writer.finalize()?;
    Ok(())
}
