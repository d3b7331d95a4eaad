use std::{collections::VecDeque, sync::Arc};

use crate::{
    analysis::{Analyser, AnalyserFrame},
    config::AnalyserConfig,
    io::AudioBuffer,
};

/// Supplies one analyser frame per tick.
///
/// Sources run their own analyser (or none, for hosts that already have
/// spectra), so the controller only sees finished frames.
pub trait FrameSource {
    /// Advance one tick. `None` means the source is exhausted.
    fn next_frame(&mut self) -> Option<AnalyserFrame>;

    fn sample_rate(&self) -> u32;
}

/// Plays a decoded buffer through an analyser, one tick's worth of samples
/// at a time.
#[derive(Debug)]
pub struct BufferPlayback {
    samples: Vec<f32>,
    sample_rate: u32,
    analyser: Analyser,
    position: usize,
    hop: usize,
}

impl BufferPlayback {
    /// `tick_rate_hz` sets how far playback moves per tick. Channels are
    /// averaged before analysis.
    pub fn new(buffer: &AudioBuffer, analyser: AnalyserConfig, tick_rate_hz: f32) -> Self {
        let sample_rate = buffer.sample_rate();
        let hop = if tick_rate_hz > 0.0 {
            (sample_rate as f32 / tick_rate_hz).round().max(1.0) as usize
        } else {
            buffer.len().max(1)
        };
        Self {
            samples: buffer.mixdown(),
            sample_rate,
            analyser: Analyser::new(analyser),
            position: 0,
            hop,
        }
    }

    /// Samples played so far.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.samples.len()
    }
}

impl FrameSource for BufferPlayback {
    fn next_frame(&mut self) -> Option<AnalyserFrame> {
        if self.is_finished() {
            return None;
        }
        self.position = (self.position + self.hop).min(self.samples.len());
        Some(self.analyser.analyse(&self.samples[..self.position]))
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Replays frames handed to it up front. For hosts that run their own
/// analyser, and for tests.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    frames: VecDeque<AnalyserFrame>,
    sample_rate: u32,
}

impl ScriptedSource {
    pub fn new(sample_rate: u32, frames: impl IntoIterator<Item = AnalyserFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            sample_rate,
        }
    }

    /// The same frame `count` times.
    pub fn repeat(sample_rate: u32, frame: AnalyserFrame, count: usize) -> Self {
        Self::new(sample_rate, std::iter::repeat(frame).take(count))
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for ScriptedSource {
    fn next_frame(&mut self) -> Option<AnalyserFrame> {
        self.frames.pop_front()
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Option<AnalyserFrame> {
        (**self).next_frame()
    }

    fn sample_rate(&self) -> u32 {
        (**self).sample_rate()
    }
}

/// A playback source for `buffer` with the given analyser settings.
pub(crate) fn playback(
    buffer: &Arc<AudioBuffer>,
    analyser: &AnalyserConfig,
    tick_rate_hz: f32,
) -> Box<dyn FrameSource> {
    Box::new(BufferPlayback::new(buffer, analyser.clone(), tick_rate_hz))
}
