//! Error types shared across the crate.
//!
//! Each failure domain has its own enum so callers can match on the part
//! that went wrong; [`Error`] wraps all of them for callers that don't care.

use thiserror::Error;

use crate::capture::CaptureState;

/// Audio input could not be acquired or kept running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("no audio input device available")]
    NoInputDevice,
    #[error("permission to use the audio input was denied: {0}")]
    PermissionDenied(String),
    #[error("audio input device is unavailable")]
    Unavailable,
    #[error("audio backend error: {0}")]
    Backend(String),
}

/// Audio data could not be turned into a usable waveform.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("audio contains no samples")]
    Empty,
    #[error("invalid sample rate {0}")]
    InvalidSampleRate(u32),
    #[error("channel {channel} has {got} samples, expected {expected}")]
    ChannelMismatch {
        channel: usize,
        expected: usize,
        got: usize,
    },
    #[error("sample {index} is not a finite number")]
    NonFinite { index: usize },
    #[error("interleaved data of {len} samples does not divide into {channels} channels")]
    Interleave { len: usize, channels: usize },
    #[error("wav decoding failed: {0}")]
    Wav(#[from] hound::Error),
}

/// A session operation was requested in a state that doesn't allow it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {operation} while {state}")]
pub struct StateError {
    pub operation: &'static str,
    pub state: CaptureState,
}

/// A synthesis graph, or the request to render it, is invalid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("unknown preset")]
    UnknownPreset,
    #[error("duration must be positive and finite, got {0}")]
    InvalidDuration(f64),
    #[error("sample rate must be positive, got {0}")]
    InvalidSampleRate(u32),
    #[error("render of {seconds} s exceeds the {max} s limit")]
    RenderTooLong { seconds: f64, max: f64 },
    #[error("graphs render to 1 or 2 channels, got {0}")]
    InvalidChannelCount(usize),
    #[error("{param} must be finite")]
    NonFinite { param: &'static str },
    #[error("oscillator frequency must be positive, got {0}")]
    NonPositiveFrequency(f32),
    #[error("filter cutoff must be positive, got {0}")]
    NonPositiveCutoff(f32),
    #[error("filter Q must be positive, got {0}")]
    InvalidQ(f32),
    #[error("pan position {0} is outside [-1, 1]")]
    PanOutOfRange(f32),
    #[error("automation time {time} must not be negative")]
    NegativeAutomationTime { time: f64 },
    #[error("automation time {next} comes before {previous}")]
    AutomationOutOfOrder { previous: f64, next: f64 },
    #[error("exponential ramp from {from} to {to} passes through zero")]
    ExponentialThroughZero { from: f32, to: f32 },
    #[error("hold at {time} s changes the value from {from} to {to}")]
    AutomationJump { time: f64, from: f32, to: f32 },
    #[error("delay time {0} s is outside (0, {max}]", max = crate::graph::delay::MAX_DELAY_SECONDS)]
    DelayOutOfRange(f32),
    #[error("feedback {0} must be in [0, 1)")]
    FeedbackOutOfRange(f32),
    #[error("shaper curve needs at least two points")]
    ShortCurve,
    #[error("sum has no inputs")]
    EmptySum,
    #[error("impulse response of {seconds} s with decay {decay} is invalid")]
    InvalidImpulse { seconds: f32, decay: f32 },
    #[error("source window [{start}, {stop}) is invalid")]
    InvalidWindow { start: f64, stop: f64 },
    #[error("{node} only accepts a mono input")]
    StereoInput { node: &'static str },
    #[error("render worker panicked")]
    WorkerPanicked,
}

/// A preset render failed. Carries the preset id and the underlying cause.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("failed to synthesize preset `{preset_id}`: {cause}")]
pub struct SynthesisError {
    pub preset_id: String,
    #[source]
    pub cause: GraphError,
}

impl SynthesisError {
    pub fn new(preset_id: impl Into<String>, cause: GraphError) -> Self {
        Self {
            preset_id: preset_id.into(),
            cause,
        }
    }
}

/// Configuration could not be loaded or is inconsistent.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "serde")]
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Any error the crate can produce.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error("unknown preset `{0}`")]
    UnknownPreset(String),
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesis_error_names_preset_and_cause() {
        let err = SynthesisError::new("pulsar", GraphError::NonPositiveFrequency(-3.0));
        let message = err.to_string();
        assert!(message.contains("pulsar"), "{message}");
        assert!(message.contains("-3"), "{message}");
    }

    #[test]
    fn state_error_mentions_operation_and_state() {
        let err = StateError {
            operation: "stop",
            state: CaptureState::Idle,
        };
        assert_eq!(err.to_string(), "cannot stop while idle");
    }

    #[test]
    fn crate_error_wraps_domain_errors() {
        let err: Error = DeviceError::NoInputDevice.into();
        assert!(matches!(err, Error::Device(DeviceError::NoInputDevice)));
    }
}
