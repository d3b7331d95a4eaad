//! Everything that happens to audio on its way to a report: spectrum
//! analysis, pitch and harmonic detection, the rolling history shown while
//! a session runs, and the summary built when it ends.

pub mod analyser;
pub mod history;
pub mod note;
pub mod pitch;
pub mod report;

pub use analyser::{Analyser, AnalyserFrame, SpectralFrame};
pub use history::{mean_amplitude, AnalysisHistory, HistorySnapshot, PianoRollEntry, RingBuffer};
pub use note::{frequency_to_note, note_to_frequency};
pub use pitch::{detect, detect_with, AnalysisFrame, HarmonicComponent};
pub use report::{aggregate, AnalysisReport, Level};
