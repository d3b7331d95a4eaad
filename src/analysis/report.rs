//! Session summary built from every analysed frame of a playback.

use std::{collections::BTreeMap, fmt};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::analysis::{
    note::frequency_to_note,
    pitch::{round_to_tenth, AnalysisFrame, HarmonicComponent, MAX_HARMONIC_ORDER},
};

/// A level in dBFS. Zero amplitude has no finite dB value and reads `Silent`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Level {
    Silent,
    /// Rounded to 0.1 dB.
    Db(f32),
}

impl Level {
    pub fn from_amplitude(amplitude: f32) -> Self {
        if amplitude > 0.0 && amplitude.is_finite() {
            Level::Db(round_to_tenth(20.0 * amplitude.log10()))
        } else {
            Level::Silent
        }
    }

    /// `None` for `Silent`.
    pub fn db(self) -> Option<f32> {
        match self {
            Level::Silent => None,
            Level::Db(db) => Some(db),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Silent => f.write_str("-inf dB"),
            Level::Db(db) => write!(f, "{db:.1} dB"),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    /// Most frequent fundamental, 0 when nothing was pitched.
    pub fundamental_freq: f32,
    /// Per-order averages across the frames that share that fundamental.
    pub harmonics: Vec<HarmonicComponent>,
    pub estimated_note: String,
    /// RMS level of the waveform.
    pub loudness: Level,
    pub peak_amplitude: Level,
}

#[derive(Default)]
struct Group<'a> {
    count: usize,
    amplitude_sum: f32,
    frames: Vec<&'a AnalysisFrame>,
}

/// Summarise a session.
///
/// Frames are grouped by their rounded fundamental. The largest group wins;
/// on a tie the group with the higher summed harmonic amplitude wins, and the
/// lower frequency keeps it if that is equal too.
pub fn aggregate(frames: &[AnalysisFrame], waveform: &[f32]) -> AnalysisReport {
    let mut groups: BTreeMap<i64, Group<'_>> = BTreeMap::new();
    for frame in frames.iter().filter(|f| f.fundamental > 0.0) {
        let group = groups.entry(frame.fundamental.round() as i64).or_default();
        group.count += 1;
        group.amplitude_sum += frame.harmonics.iter().map(|h| h.amplitude).sum::<f32>();
        group.frames.push(frame);
    }

    let winner = groups
        .iter()
        .fold(None, |best: Option<(&i64, &Group<'_>)>, (key, group)| match best {
            Some((_, top))
                if group.count < top.count
                    || (group.count == top.count && group.amplitude_sum <= top.amplitude_sum) =>
            {
                best
            }
            _ => Some((key, group)),
        });

    let (fundamental_freq, harmonics) = match winner {
        Some((&frequency, group)) => (frequency as f32, average_harmonics(&group.frames)),
        None => (0.0, Vec::new()),
    };

    let (loudness, peak_amplitude) = levels(waveform);

    AnalysisReport {
        fundamental_freq,
        harmonics,
        estimated_note: frequency_to_note(fundamental_freq),
        loudness,
        peak_amplitude,
    }
}

fn average_harmonics(frames: &[&AnalysisFrame]) -> Vec<HarmonicComponent> {
    // order → (frequency sum, amplitude sum, count, is_fundamental)
    let mut orders: BTreeMap<u32, (f32, f32, usize, bool)> = BTreeMap::new();
    for harmonic in frames.iter().flat_map(|f| &f.harmonics) {
        if harmonic.order == 0 || harmonic.order > MAX_HARMONIC_ORDER {
            continue;
        }
        let slot = orders
            .entry(harmonic.order)
            .or_insert((0.0, 0.0, 0, harmonic.is_fundamental));
        slot.0 += harmonic.frequency;
        slot.1 += harmonic.amplitude;
        slot.2 += 1;
    }

    orders
        .into_iter()
        .map(|(order, (frequency, amplitude, count, is_fundamental))| {
            let n = count as f32;
            HarmonicComponent {
                order,
                frequency: (frequency / n).round(),
                amplitude: round_to_tenth(amplitude / n),
                is_fundamental,
            }
        })
        .collect()
}

/// RMS and peak levels of `waveform`.
fn levels(waveform: &[f32]) -> (Level, Level) {
    if waveform.is_empty() {
        return (Level::Silent, Level::Silent);
    }
    let energy: f64 = waveform.iter().map(|&s| (s as f64) * (s as f64)).sum();
    let rms = (energy / waveform.len() as f64).sqrt() as f32;
    let peak = waveform.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    (Level::from_amplitude(rms), Level::from_amplitude(peak))
}
