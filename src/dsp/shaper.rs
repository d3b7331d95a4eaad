//! Piecewise-linear waveshaping.
//!
//! A curve of N points is spread evenly over the input range [-1, 1]:
//! point 0 sits at -1, point N-1 at +1. Inputs between points are linearly
//! interpolated and inputs outside the range take the end values.
//!
//! Fed with a slow sine, a curve like `[0, 0.6, 1, 0.6, 0]` turns the LFO into
//! a pulse envelope: silent at both extremes, loudest as the sine crosses 0.

#[inline]
pub fn shape(curve: &[f32], input: f32) -> f32 {
    match curve.len() {
        0 => return input,
        1 => return curve[0],
        _ => {}
    }
    if input.is_nan() {
        return 0.0;
    }

    let last = curve.len() - 1;
    let position = (input.clamp(-1.0, 1.0) + 1.0) * 0.5 * last as f32;
    let index = (position.floor() as usize).min(last - 1);
    let frac = position - index as f32;
    curve[index] + (curve[index + 1] - curve[index]) * frac
}

pub fn shape_buffer(curve: &[f32], buffer: &mut [f32]) {
    for sample in buffer.iter_mut() {
        *sample = shape(curve, *sample);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PULSE: [f32; 5] = [0.0, 0.6, 1.0, 0.6, 0.0];

    #[test]
    fn curve_points_land_on_even_input_steps() {
        assert_eq!(shape(&PULSE, -1.0), 0.0);
        assert!((shape(&PULSE, -0.5) - 0.6).abs() < 1e-6);
        assert!((shape(&PULSE, 0.0) - 1.0).abs() < 1e-6);
        assert!((shape(&PULSE, 0.5) - 0.6).abs() < 1e-6);
        assert_eq!(shape(&PULSE, 1.0), 0.0);
    }

    #[test]
    fn interpolates_between_points() {
        assert!((shape(&PULSE, -0.75) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn clamps_out_of_range_input() {
        assert_eq!(shape(&PULSE, 3.0), 0.0);
        assert_eq!(shape(&PULSE, -3.0), 0.0);
        assert_eq!(shape(&[0.2, 0.8], 10.0), 0.8);
    }

    #[test]
    fn degenerate_curves() {
        assert_eq!(shape(&[], 0.3), 0.3);
        assert_eq!(shape(&[0.7], -0.3), 0.7);
    }
}
