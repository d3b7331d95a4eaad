//! Engine configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```toml
//! [analyser]
//! fft_size = 4096
//!
//! [capture]
//! analysis_throttle = 2
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    #[cfg_attr(feature = "serde", serde(default))]
    pub analyser: AnalyserConfig,
    #[cfg_attr(feature = "serde", serde(default))]
    pub capture: CaptureConfig,
    #[cfg_attr(feature = "serde", serde(default))]
    pub history: HistoryConfig,
    #[cfg_attr(feature = "serde", serde(default))]
    pub synthesis: SynthesisConfig,
}

/// Spectrum analyser settings. Mirrors the knobs of a browser analyser node.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyserConfig {
    #[cfg_attr(feature = "serde", serde(default = "default_fft_size"))]
    pub fft_size: usize,
    #[cfg_attr(feature = "serde", serde(default = "default_smoothing"))]
    pub smoothing: f32,
    #[cfg_attr(feature = "serde", serde(default = "default_min_db"))]
    pub min_db: f32,
    #[cfg_attr(feature = "serde", serde(default = "default_max_db"))]
    pub max_db: f32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfig {
    /// How often the host calls `tick`, in Hz.
    #[cfg_attr(feature = "serde", serde(default = "default_tick_rate"))]
    pub tick_rate_hz: f32,
    /// Full analysis runs on every Nth tick.
    #[cfg_attr(feature = "serde", serde(default = "default_throttle"))]
    pub analysis_throttle: u32,
    /// Sample rate requested from input devices.
    #[cfg_attr(feature = "serde", serde(default = "default_sample_rate"))]
    pub input_sample_rate: u32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryConfig {
    #[cfg_attr(feature = "serde", serde(default = "default_spectrogram_len"))]
    pub spectrogram_frames: usize,
    #[cfg_attr(feature = "serde", serde(default = "default_piano_roll_len"))]
    pub piano_roll_entries: usize,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisConfig {
    #[cfg_attr(feature = "serde", serde(default = "default_sample_rate"))]
    pub sample_rate: u32,
    /// Samples rendered per step of the offline renderer.
    #[cfg_attr(feature = "serde", serde(default = "default_render_quantum"))]
    pub render_quantum: usize,
    /// Partition length of the FFT convolver.
    #[cfg_attr(feature = "serde", serde(default = "default_partition"))]
    pub convolution_partition: usize,
    #[cfg_attr(feature = "serde", serde(default = "default_max_render_seconds"))]
    pub max_render_seconds: f64,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: default_fft_size(),
            smoothing: default_smoothing(),
            min_db: default_min_db(),
            max_db: default_max_db(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: default_tick_rate(),
            analysis_throttle: default_throttle(),
            input_sample_rate: default_sample_rate(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            spectrogram_frames: default_spectrogram_len(),
            piano_roll_entries: default_piano_roll_len(),
        }
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            render_quantum: default_render_quantum(),
            convolution_partition: default_partition(),
            max_render_seconds: default_max_render_seconds(),
        }
    }
}

fn default_fft_size() -> usize {
    2048
}

fn default_smoothing() -> f32 {
    0.75
}

fn default_min_db() -> f32 {
    -100.0
}

fn default_max_db() -> f32 {
    -10.0
}

fn default_tick_rate() -> f32 {
    60.0
}

fn default_throttle() -> u32 {
    1
}

fn default_sample_rate() -> u32 {
    44_100
}

fn default_spectrogram_len() -> usize {
    90
}

fn default_piano_roll_len() -> usize {
    120
}

fn default_render_quantum() -> usize {
    128
}

fn default_partition() -> usize {
    1024
}

fn default_max_render_seconds() -> f64 {
    120.0
}

impl AnalyserConfig {
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fft_size.is_power_of_two() || !(32..=32_768).contains(&self.fft_size) {
            return Err(ConfigError::Invalid(format!(
                "fft_size must be a power of two in [32, 32768], got {}",
                self.fft_size
            )));
        }
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(ConfigError::Invalid(format!(
                "smoothing must be in [0, 1], got {}",
                self.smoothing
            )));
        }
        if !(self.min_db < self.max_db) {
            return Err(ConfigError::Invalid(format!(
                "min_db ({}) must be below max_db ({})",
                self.min_db, self.max_db
            )));
        }
        Ok(())
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analyser.validate()?;
        if !(self.capture.tick_rate_hz > 0.0) {
            return Err(ConfigError::Invalid("tick_rate_hz must be positive".into()));
        }
        if self.capture.analysis_throttle == 0 {
            return Err(ConfigError::Invalid("analysis_throttle must be at least 1".into()));
        }
        if self.capture.input_sample_rate == 0 || self.synthesis.sample_rate == 0 {
            return Err(ConfigError::Invalid("sample rates must be positive".into()));
        }
        let quantum = self.synthesis.render_quantum;
        if quantum == 0 || quantum > crate::MAX_BLOCK_SIZE {
            return Err(ConfigError::Invalid(format!(
                "render_quantum must be in [1, {}], got {quantum}",
                crate::MAX_BLOCK_SIZE
            )));
        }
        let partition = self.synthesis.convolution_partition;
        if !(64..=crate::MAX_BLOCK_SIZE).contains(&partition) {
            return Err(ConfigError::Invalid(format!(
                "convolution_partition must be in [64, {}], got {partition}",
                crate::MAX_BLOCK_SIZE
            )));
        }
        Ok(())
    }

    #[cfg(feature = "serde")]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(feature = "serde")]
pub fn load_config(path: &std::path::Path) -> Result<EngineConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = EngineConfig::from_toml_str(&content)?;
    log::debug!("loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_analyser_conventions() {
        let config = EngineConfig::default();
        assert_eq!(config.analyser.fft_size, 2048);
        assert_eq!(config.analyser.bin_count(), 1024);
        assert_eq!(config.analyser.smoothing, 0.75);
        assert_eq!(config.analyser.min_db, -100.0);
        assert_eq!(config.analyser.max_db, -10.0);
        assert_eq!(config.history.spectrogram_frames, 90);
        assert_eq!(config.history.piano_roll_entries, 120);
        assert_eq!(config.capture.analysis_throttle, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_non_power_of_two_fft() {
        let mut config = EngineConfig::default();
        config.analyser.fft_size = 1000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_inverted_db_range() {
        let mut config = EngineConfig::default();
        config.analyser.min_db = -10.0;
        config.analyser.max_db = -100.0;
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [analyser]
            fft_size = 4096

            [capture]
            analysis_throttle = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.analyser.fft_size, 4096);
        assert_eq!(config.analyser.smoothing, 0.75);
        assert_eq!(config.capture.analysis_throttle, 3);
        assert_eq!(config.history.spectrogram_frames, 90);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn invalid_toml_values_are_reported() {
        let err = EngineConfig::from_toml_str("[capture]\nanalysis_throttle = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
