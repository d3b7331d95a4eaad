//! Frequency ↔ note name conversion, equal temperament at A4 = 440 Hz.

const NOTE_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

const A4_HZ: f64 = 440.0;
const A4_MIDI: i32 = 69;

/// Range in which a frequency is given a note name.
pub const NOTE_RANGE_HZ: std::ops::RangeInclusive<f32> = 20.0..=5000.0;

/// Returned by [`frequency_to_note`] outside [`NOTE_RANGE_HZ`].
pub const NO_NOTE: &str = "N/A";

/// Name of the nearest note, e.g. `"A4"`, or [`NO_NOTE`].
pub fn frequency_to_note(frequency: f32) -> String {
    if !NOTE_RANGE_HZ.contains(&frequency) {
        return NO_NOTE.to_owned();
    }
    nearest_note(frequency).unwrap_or_else(|| NO_NOTE.to_owned())
}

/// Name of the nearest note for any positive frequency, without the range
/// check of [`frequency_to_note`].
pub fn nearest_note(frequency: f32) -> Option<String> {
    if !(frequency.is_finite() && frequency > 0.0) {
        return None;
    }
    let semitones = (12.0 * (frequency as f64 / A4_HZ).log2()).round() as i32;
    // Names start at C, so index by MIDI number rather than distance from A4.
    let midi = semitones + A4_MIDI;
    let index = midi.rem_euclid(12) as usize;
    let octave = midi.div_euclid(12) - 1;
    Some(format!("{}{octave}", NOTE_NAMES[index]))
}

/// Frequency of a note name like `"C#4"` or `"A-1"`. Returns 0.0 for anything
/// that doesn't parse.
pub fn note_to_frequency(name: &str) -> f32 {
    parse_midi(name).map_or(0.0, midi_to_frequency)
}

pub fn midi_to_frequency(midi: i32) -> f32 {
    (A4_HZ * 2f64.powf((midi - A4_MIDI) as f64 / 12.0)) as f32
}

fn parse_midi(name: &str) -> Option<i32> {
    let letter_len = if name.get(1..2) == Some("#") { 2 } else { 1 };
    let (pitch, octave) = name.is_char_boundary(letter_len).then(|| name.split_at(letter_len))?;
    let index = NOTE_NAMES.iter().position(|&n| n == pitch)?;

    let digits = octave.strip_prefix('-').unwrap_or(octave);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let octave: i32 = octave.parse().ok()?;
    octave
        .checked_add(1)?
        .checked_mul(12)?
        .checked_add(index as i32)
}
