//! Fundamental and harmonic detection on one byte-encoded spectrum frame.
//!
//! The detector takes the loudest bin (DC excluded) as the fundamental, then
//! looks for peaks near each integer multiple of it. Thresholds are relative
//! to the analyser's `min_db`, so they follow whatever dynamic range it is
//! configured with. It is a local-maximum search, cheap enough to run every
//! tick; inharmonic or noisy input can produce false harmonics.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::AnalyserConfig;

/// Highest harmonic order reported; order 1 is the fundamental.
pub const MAX_HARMONIC_ORDER: u32 = 8;

/// Fundamentals below this are treated as silence.
pub const MIN_FUNDAMENTAL_HZ: f32 = 20.0;

/// The fundamental must be louder than `min_db × (1 - 0.35)`.
const FUNDAMENTAL_THRESHOLD_RATIO: f32 = 0.35;
/// Harmonics must be louder than `min_db × (1 - 0.20)`.
const HARMONIC_THRESHOLD_RATIO: f32 = 0.20;
/// Harmonic search radius as a fraction of the expected bin index.
const SEARCH_RADIUS_RATIO: f32 = 0.035;
const MIN_SEARCH_RADIUS: usize = 2;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarmonicComponent {
    pub order: u32,
    /// Hz, rounded to a whole number.
    pub frequency: f32,
    /// dB, rounded to 0.1.
    pub amplitude: f32,
    pub is_fundamental: bool,
}

/// Result of analysing one frame. A fundamental of 0 means no pitch.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisFrame {
    pub fundamental: f32,
    pub harmonics: Vec<HarmonicComponent>,
}

impl AnalysisFrame {
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn is_silent(&self) -> bool {
        self.fundamental == 0.0
    }
}

/// Map a spectrum byte back onto `[min_db, max_db]`.
pub fn byte_to_db(byte: u8, min_db: f32, max_db: f32) -> f32 {
    min_db + byte as f32 / 255.0 * (max_db - min_db)
}

pub(crate) fn round_to_tenth(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

/// Detect the fundamental and up to eight harmonics in `spectrum`.
///
/// `spectrum` holds `fft_size / 2` bytes; `min_db`/`max_db` are the range
/// the analyser mapped onto 0..=255.
pub fn detect(
    spectrum: &[u8],
    sample_rate: f32,
    fft_size: usize,
    min_db: f32,
    max_db: f32,
) -> AnalysisFrame {
    if spectrum.len() < 2 || fft_size == 0 || !(sample_rate > 0.0) {
        return AnalysisFrame::silent();
    }
    let bin_hz = sample_rate / fft_size as f32;

    // First maximum wins, DC excluded.
    let (peak_bin, peak) = spectrum
        .iter()
        .enumerate()
        .skip(1)
        .fold((0, 0u8), |best, (i, &b)| if b > best.1 { (i, b) } else { best });
    if peak == 0 {
        return AnalysisFrame::silent();
    }

    let fundamental = peak_bin as f32 * bin_hz;
    let peak_db = byte_to_db(peak, min_db, max_db);
    if fundamental < MIN_FUNDAMENTAL_HZ || peak_db < min_db * (1.0 - FUNDAMENTAL_THRESHOLD_RATIO) {
        return AnalysisFrame::silent();
    }

    let mut harmonics = vec![HarmonicComponent {
        order: 1,
        frequency: fundamental.round(),
        amplitude: round_to_tenth(peak_db),
        is_fundamental: true,
    }];

    let nyquist = sample_rate / 2.0;
    let harmonic_floor = min_db * (1.0 - HARMONIC_THRESHOLD_RATIO);
    for order in 2..=MAX_HARMONIC_ORDER {
        let expected = fundamental * order as f32;
        if expected > nyquist {
            break;
        }
        let expected_bin = (expected / bin_hz).round() as usize;
        if expected_bin >= spectrum.len() {
            continue;
        }

        let radius = MIN_SEARCH_RADIUS.max((expected_bin as f32 * SEARCH_RADIUS_RATIO) as usize);
        let lo = expected_bin.saturating_sub(radius).max(1);
        let hi = (expected_bin + radius).min(spectrum.len() - 1);
        let (bin, byte) = spectrum[lo..=hi]
            .iter()
            .enumerate()
            .fold((expected_bin, None), |best: (usize, Option<u8>), (i, &b)| {
                if best.1.map_or(true, |top| b > top) {
                    (lo + i, Some(b))
                } else {
                    best
                }
            });
        let Some(byte) = byte else { continue };

        let db = byte_to_db(byte, min_db, max_db);
        if db > harmonic_floor {
            harmonics.push(HarmonicComponent {
                order,
                frequency: (bin as f32 * bin_hz).round(),
                amplitude: round_to_tenth(db),
                is_fundamental: false,
            });
        }
    }

    AnalysisFrame {
        fundamental: fundamental.round(),
        harmonics,
    }
}

/// [`detect`] with the analyser's FFT size and dB range.
pub fn detect_with(spectrum: &[u8], sample_rate: f32, config: &AnalyserConfig) -> AnalysisFrame {
    detect(spectrum, sample_rate, config.fft_size, config.min_db, config.max_db)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 44_100.0;
    const FFT: usize = 2048;
    const BIN_HZ: f32 = SR / FFT as f32;

    fn spectrum_with(peaks: &[(usize, u8)]) -> Vec<u8> {
        let mut spectrum = vec![0u8; FFT / 2];
        for &(bin, value) in peaks {
            spectrum[bin] = value;
        }
        spectrum
    }

    fn run(spectrum: &[u8]) -> AnalysisFrame {
        detect(spectrum, SR, FFT, -100.0, -10.0)
    }

    #[test]
    fn single_peak_is_the_fundamental() {
        for bin in [5, 20, 41, 100, 500] {
            let frame = run(&spectrum_with(&[(bin, 200)]));
            let expected = bin as f32 * BIN_HZ;
            assert!((frame.fundamental - expected).abs() <= BIN_HZ, "bin {bin}");
            assert_eq!(frame.harmonics.len(), 1);
            assert!(frame.harmonics[0].is_fundamental);
            assert_eq!(frame.harmonics[0].order, 1);
        }
    }

    #[test]
    fn weak_or_low_peaks_are_silence() {
        // -65 dB threshold: byte 99 maps to about -65.06 dB.
        assert!(run(&spectrum_with(&[(40, 99)])).is_silent());
        assert!(!run(&spectrum_with(&[(40, 100)])).is_silent());
        // Bin 0 is DC and never counts.
        assert!(run(&spectrum_with(&[(0, 255)])).is_silent());
        assert!(run(&spectrum_with(&[])).is_silent());
        assert!(run(&[]).is_silent());
    }

    #[test]
    fn harmonics_found_near_multiples() {
        // Fundamental at bin 20 (430.7 Hz), partials slightly off their
        // exact multiples.
        let frame = run(&spectrum_with(&[(20, 220), (41, 180), (59, 150), (80, 40)]));
        let orders: Vec<u32> = frame.harmonics.iter().map(|h| h.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        assert_eq!(frame.harmonics[1].frequency, (41.0 * BIN_HZ).round());
        assert_eq!(frame.harmonics[2].frequency, (59.0 * BIN_HZ).round());
        assert!(frame.harmonics[1..].iter().all(|h| !h.is_fundamental));
        // Byte 180 → -100 + 180/255 × 90 = -36.47 dB.
        assert_eq!(frame.harmonics[1].amplitude, -36.5);
    }

    #[test]
    fn harmonics_stop_at_nyquist() {
        // 300 bins ≈ 6460 Hz: only order 2 and 3 fit below 22050 Hz.
        let frame = run(&spectrum_with(&[(300, 250), (600, 200), (900, 200)]));
        assert!(frame.harmonics.iter().all(|h| h.frequency <= SR / 2.0));
        assert!(frame.harmonics.iter().all(|h| h.order <= MAX_HARMONIC_ORDER));
        assert_eq!(frame.harmonics.len(), 3);
    }

    #[test]
    fn never_more_than_eight_orders() {
        let spectrum = vec![200u8; FFT / 2];
        let frame = run(&spectrum);
        assert!(frame.harmonics.len() <= MAX_HARMONIC_ORDER as usize);
        assert!(frame.harmonics.iter().all(|h| h.order <= MAX_HARMONIC_ORDER));
    }

    #[test]
    fn byte_mapping_spans_the_range() {
        assert_eq!(byte_to_db(0, -100.0, -10.0), -100.0);
        assert_eq!(byte_to_db(255, -100.0, -10.0), -10.0);
    }
}
