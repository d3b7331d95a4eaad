use crate::error::GraphError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Parameter Automation
====================

An automation curve describes how a parameter (gain, frequency, cutoff...)
moves over the course of a render. It starts at a value at t = 0 and is then
a list of breakpoints, each reached by one of three kinds of ramp:

  Value
    0.3 ┐        ╱‾‾‾‾‾‾‾‾‾‾╲
        │       ╱            ╲
        │      ╱   hold       ╲ exponential
        │     ╱ linear         ╲___
    0.0 └────╱─────────────────────‾‾‾──→ Time
           t0  t1          t2       t3

  linear       straight line from the previous breakpoint
  exponential  constant ratio per second; sounds like a natural decay.
               Both ends must be positive, there is no way to reach zero.
  hold         stays at the previous value until the breakpoint

A curve never jumps. The only place a value appears out of nowhere is the
initial value at t = 0. A decay "to silence" therefore ends on a tiny
positive value such as 0.001 (-60 dB).

Vocabulary
----------

  breakpoint   (time, value, ramp). The ramp describes how the curve arrives
               at this breakpoint from the previous one.

  segment      The stretch between two neighbouring breakpoints.

  cursor       Index of the next breakpoint ahead of the playhead. Rendering
               moves forward in time, so `fill` keeps a cursor instead of
               searching the whole list every sample.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ramp {
    Linear,
    Exponential,
    Hold,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutomationPoint {
    pub time: f64,
    pub value: f32,
    pub ramp: Ramp,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Automation {
    initial: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    points: Vec<AutomationPoint>,
}

impl Automation {
    /// A curve that never moves.
    pub fn constant(value: f32) -> Self {
        Self::starting_at(value)
    }

    /// Start a curve at `value` (at t = 0).
    pub fn starting_at(value: f32) -> Self {
        Self {
            initial: value,
            points: Vec::new(),
        }
    }

    /// Ramp linearly to `value`, arriving at `time` seconds.
    pub fn linear_to(mut self, value: f32, time: f64) -> Self {
        self.points.push(AutomationPoint {
            time,
            value,
            ramp: Ramp::Linear,
        });
        self
    }

    /// Ramp exponentially to `value`, arriving at `time` seconds.
    pub fn exponential_to(mut self, value: f32, time: f64) -> Self {
        self.points.push(AutomationPoint {
            time,
            value,
            ramp: Ramp::Exponential,
        });
        self
    }

    /// Keep the current value until `time` seconds.
    pub fn hold_until(mut self, time: f64) -> Self {
        let value = self.last_value();
        self.points.push(AutomationPoint {
            time,
            value,
            ramp: Ramp::Hold,
        });
        self
    }

    pub fn initial(&self) -> f32 {
        self.initial
    }

    pub fn points(&self) -> &[AutomationPoint] {
        &self.points
    }

    /// Value after the last breakpoint.
    pub fn last_value(&self) -> f32 {
        self.points.last().map_or(self.initial, |p| p.value)
    }

    pub fn is_constant(&self) -> bool {
        self.points.iter().all(|p| p.value == self.initial)
    }

    /// Every value the curve passes through at a breakpoint, initial value
    /// included. Ramps never leave the range these span.
    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        std::iter::once(self.initial).chain(self.points.iter().map(|p| p.value))
    }

    /// Scale every value by `factor`.
    pub fn scaled(mut self, factor: f32) -> Self {
        self.initial *= factor;
        for point in &mut self.points {
            point.value *= factor;
        }
        self
    }

    pub fn validate(&self, param: &'static str) -> Result<(), GraphError> {
        if !self.initial.is_finite() {
            return Err(GraphError::NonFinite { param });
        }

        let mut prev_time = 0.0f64;
        let mut prev_value = self.initial;
        for (i, point) in self.points.iter().enumerate() {
            if !point.value.is_finite() || !point.time.is_finite() {
                return Err(GraphError::NonFinite { param });
            }
            if point.time < 0.0 {
                return Err(GraphError::NegativeAutomationTime { time: point.time });
            }
            // Only the first breakpoint may sit on top of its predecessor (the
            // initial value at t = 0).
            if i > 0 && point.time <= prev_time {
                return Err(GraphError::AutomationOutOfOrder {
                    previous: prev_time,
                    next: point.time,
                });
            }
            match point.ramp {
                Ramp::Exponential if prev_value <= 0.0 || point.value <= 0.0 => {
                    return Err(GraphError::ExponentialThroughZero {
                        from: prev_value,
                        to: point.value,
                    });
                }
                Ramp::Hold if point.value != prev_value => {
                    return Err(GraphError::AutomationJump {
                        time: point.time,
                        from: prev_value,
                        to: point.value,
                    });
                }
                _ => {}
            }
            prev_time = point.time;
            prev_value = point.value;
        }
        Ok(())
    }

    #[inline]
    fn segment_value(&self, index: usize, time: f64) -> f32 {
        let Some(next) = self.points.get(index) else {
            return self.last_value();
        };
        let (start_time, start_value) = match index {
            0 => (0.0, self.initial),
            _ => {
                let prev = &self.points[index - 1];
                (prev.time, prev.value)
            }
        };

        let span = next.time - start_time;
        if span <= 0.0 {
            return next.value;
        }
        let frac = ((time - start_time) / span).clamp(0.0, 1.0);
        match next.ramp {
            Ramp::Linear => start_value + (next.value - start_value) * frac as f32,
            Ramp::Exponential => {
                let ratio = (next.value / start_value) as f64;
                (start_value as f64 * ratio.powf(frac)) as f32
            }
            Ramp::Hold => start_value,
        }
    }

    /// Value of the curve at `time` seconds.
    pub fn value_at(&self, time: f64) -> f32 {
        let index = self.points.partition_point(|p| p.time <= time);
        self.segment_value(index, time)
    }

    /// Whether the curve stays exactly at zero from `from` to `to` seconds.
    ///
    /// Segments are monotonic, so checking both ends and every breakpoint in
    /// between is enough.
    pub fn is_silent_between(&self, from: f64, to: f64) -> bool {
        self.value_at(from) == 0.0
            && self.value_at(to) == 0.0
            && self
                .points
                .iter()
                .filter(|p| p.time > from && p.time < to)
                .all(|p| p.value == 0.0)
    }

    /// Fill `out` with curve values for consecutive samples starting at
    /// `start` seconds. `cursor` carries the segment position between calls
    /// and must start at 0; time must not move backwards between calls.
    pub fn fill(&self, out: &mut [f32], start: f64, sample_rate: f32, cursor: &mut usize) {
        if self.points.is_empty() {
            out.fill(self.initial);
            return;
        }

        let dt = 1.0 / sample_rate as f64;
        for (i, sample) in out.iter_mut().enumerate() {
            let time = start + i as f64 * dt;
            while *cursor < self.points.len() && self.points[*cursor].time <= time {
                *cursor += 1;
            }
            *sample = self.segment_value(*cursor, time);
        }
    }
}

impl Default for Automation {
    fn default() -> Self {
        Self::constant(0.0)
    }
}

impl From<f32> for Automation {
    fn from(value: f32) -> Self {
        Self::constant(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_curve_holds_everywhere() {
        let curve = Automation::constant(0.25);
        assert_eq!(curve.value_at(0.0), 0.25);
        assert_eq!(curve.value_at(100.0), 0.25);
        assert!(curve.is_constant());
    }

    #[test]
    fn linear_ramp_interpolates() {
        let curve = Automation::starting_at(0.0).linear_to(1.0, 2.0);
        assert!((curve.value_at(1.0) - 0.5).abs() < 1e-6);
        assert!((curve.value_at(2.0) - 1.0).abs() < 1e-6);
        assert!((curve.value_at(5.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn exponential_ramp_has_constant_ratio() {
        let curve = Automation::starting_at(1000.0).exponential_to(10.0, 2.0);
        // Halfway in time is the geometric mean of the endpoints.
        assert!((curve.value_at(1.0) - 100.0).abs() < 1e-3);
        assert!((curve.value_at(0.5) - 316.227_77).abs() < 1e-2);
    }

    #[test]
    fn hold_keeps_previous_value() {
        let curve = Automation::starting_at(0.0)
            .hold_until(1.0)
            .linear_to(0.2, 1.5)
            .hold_until(3.0)
            .linear_to(0.0, 4.0);
        assert_eq!(curve.value_at(0.7), 0.0);
        assert!((curve.value_at(1.25) - 0.1).abs() < 1e-6);
        assert!((curve.value_at(2.0) - 0.2).abs() < 1e-6);
        assert!((curve.value_at(3.5) - 0.1).abs() < 1e-6);
        assert!(curve.validate("gain").is_ok());
    }

    #[test]
    fn fill_matches_value_at() {
        let curve = Automation::starting_at(0.0)
            .linear_to(1.0, 0.01)
            .exponential_to(0.001, 0.05);
        let sample_rate = 8000.0;
        let mut out = vec![0.0; 512];
        let mut cursor = 0;
        curve.fill(&mut out[..200], 0.0, sample_rate, &mut cursor);
        curve.fill(&mut out[200..], 200.0 / sample_rate as f64, sample_rate, &mut cursor);
        for (i, &value) in out.iter().enumerate() {
            let expected = curve.value_at(i as f64 / sample_rate as f64);
            assert!((value - expected).abs() < 1e-5, "sample {i}: {value} vs {expected}");
        }
    }

    #[test]
    fn rejects_exponential_ramp_from_zero() {
        let curve = Automation::starting_at(0.0).exponential_to(1.0, 1.0);
        assert!(matches!(
            curve.validate("gain"),
            Err(GraphError::ExponentialThroughZero { .. })
        ));
    }

    #[test]
    fn rejects_times_going_backwards() {
        let curve = Automation::starting_at(0.0)
            .linear_to(1.0, 2.0)
            .linear_to(0.5, 1.0);
        assert!(matches!(
            curve.validate("gain"),
            Err(GraphError::AutomationOutOfOrder { .. })
        ));
    }

    #[test]
    fn rejects_hold_that_changes_value() {
        let mut curve = Automation::starting_at(0.0).hold_until(1.0);
        curve.points[0].value = 1.0;
        assert!(matches!(
            curve.validate("gain"),
            Err(GraphError::AutomationJump { .. })
        ));
    }

    #[test]
    fn scaled_multiplies_every_value() {
        let curve = Automation::starting_at(1.0).linear_to(2.0, 1.0).scaled(0.5);
        assert_eq!(curve.values().collect::<Vec<_>>(), vec![0.5, 1.0]);
    }

    #[test]
    fn silence_check_covers_interior_breakpoints() {
        let curve = Automation::starting_at(0.0)
            .linear_to(0.0, 1.0)
            .linear_to(0.5, 2.0)
            .linear_to(0.0, 3.0);
        assert!(curve.is_silent_between(0.0, 1.0));
        assert!(!curve.is_silent_between(0.5, 2.5));
        assert!(!curve.is_silent_between(0.0, 3.0));
        assert!(curve.is_silent_between(3.0, 10.0));
    }
}
