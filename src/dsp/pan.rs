//! Equal-power stereo panning.
//!
//! Pan positions run from -1 (hard left) through 0 (centre) to +1 (hard
//! right). The gains follow a quarter sine/cosine so that L² + R² stays
//! constant and a sound keeps its loudness as it moves.

use std::f32::consts::FRAC_PI_2;

/// (left, right) gains for a mono source at `pan`.
#[inline]
pub fn equal_power_gains(pan: f32) -> (f32, f32) {
    let x = (pan.clamp(-1.0, 1.0) + 1.0) * 0.5;
    ((x * FRAC_PI_2).cos(), (x * FRAC_PI_2).sin())
}

/// Pan one frame of a stereo source.
///
/// Moving left folds the right channel into the left; moving right folds
/// the left channel into the right. At 0 the frame passes unchanged.
#[inline]
pub fn pan_stereo_frame(left: f32, right: f32, pan: f32) -> (f32, f32) {
    let pan = pan.clamp(-1.0, 1.0);
    if pan <= 0.0 {
        let x = (pan + 1.0) * FRAC_PI_2;
        (left + right * x.cos(), right * x.sin())
    } else {
        let x = pan * FRAC_PI_2;
        (left * x.cos(), right + left * x.sin())
    }
}
