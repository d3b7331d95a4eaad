//! Block-rate modulation helpers.

/*
Modulated Parameters
====================

Every continuous parameter in a synthesis graph is the sum of two parts:

    value(t) = automation(t) + Σ modulator_i(t) × depth_i

  automation   The scheduled curve (see `envelope.rs`): ramps and holds at
               fixed times. This is the part that makes an event swell and
               fade.

  modulator    Any signal, usually a slow oscillator (LFO). Swings in
               [-1, +1], so the parameter swings by ±depth around the curve.

  depth        Scale of the modulator, in the parameter's own unit
               (Hz for a cutoff, cents for detune, linear gain for gain).

Example: a wind filter at 600 Hz with a 0.1 Hz sine at depth 200
    modulator = -1.0  →  cutoff =  400 Hz
    modulator =  0.0  →  cutoff =  600 Hz
    modulator = +1.0  →  cutoff =  800 Hz

Several modulators may drive the same parameter; their contributions add.


Block Rate
----------

The automation part is evaluated every sample. The modulator part is
evaluated once per render block (128 samples by default) from the block's
average. At 44.1 kHz that is ~345 updates per second, which is smooth for
anything slower than ~20 Hz. Every modulator in the preset library sits
well below that.


Clamping
--------

The sum may leave the valid range (a cutoff swinging below 0 Hz). The
receiving node clamps: filters to (0, Nyquist), Q to a small positive
minimum, pan to [-1, 1], oscillator frequency to [0, Nyquist].
*/

/// Value of a modulated parameter: `base + modulator × depth`.
#[inline]
pub fn apply_modulation(base_value: f32, modulator: f32, depth: f32) -> f32 {
    base_value + (modulator * depth)
}

/// Average of a modulator over one block; the value used for the whole block.
#[inline]
pub fn block_average(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f32>() / samples.len() as f32
}

/// Add a block-rate offset to a per-sample curve in place.
#[inline]
pub fn offset_block(values: &mut [f32], offset: f32) {
    if offset != 0.0 {
        for value in values.iter_mut() {
            *value += offset;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modulation_centres_on_base() {
        assert_eq!(apply_modulation(600.0, 0.0, 200.0), 600.0);
        assert_eq!(apply_modulation(600.0, 1.0, 200.0), 800.0);
        assert_eq!(apply_modulation(600.0, -1.0, 200.0), 400.0);
    }

    #[test]
    fn block_average_of_empty_block_is_zero() {
        assert_eq!(block_average(&[]), 0.0);
        assert_eq!(block_average(&[1.0, 2.0, 3.0, 4.0]), 2.5);
    }

    #[test]
    fn offset_block_shifts_every_value() {
        let mut values = [1.0, 2.0];
        offset_block(&mut values, 0.5);
        assert_eq!(values, [1.5, 2.5]);
    }
}
