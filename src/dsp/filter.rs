use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
| type              | passes          | rejects      | peak gain |
| ----------------- | --------------- | ------------ | --------- |
| low-pass          | below cutoff    | above cutoff | Q         |
| high-pass         | above cutoff    | below cutoff | Q         |
| band-pass         | around cutoff   | both sides   | 1         |
| notch / band-stop | both sides      | at cutoff    | 1         |

Q is the quality factor. 0.707 is the flattest low/high-pass response;
larger values add a resonant bump at the cutoff. For band-pass and notch, Q
is the centre frequency divided by the bandwidth: Q = 20 at 500 Hz leaves a
25 Hz wide band. The band-pass output is scaled by 1/Q so its peak stays at
unity no matter how narrow it gets.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    HighPass,
    BandPass,
    Notch,
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
    pub notch: f32,
}

pub const DEFAULT_Q: f32 = std::f32::consts::FRAC_1_SQRT_2;
const MIN_Q: f32 = 1.0e-3;
const MIN_CUTOFF_HZ: f32 = 1.0;

pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    pub cutoff_hz: f32,
    pub q: f32,
    filter_type: FilterType,
}

impl SVFilter {
    pub fn new(filter_type: FilterType, cutoff_hz: f32, q: f32) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz,
            q,
            filter_type,
        }
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::LowPass, cutoff_hz, DEFAULT_Q)
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::HighPass, cutoff_hz, DEFAULT_Q)
    }

    pub fn bandpass(cutoff_hz: f32, q: f32) -> Self {
        Self::new(FilterType::BandPass, cutoff_hz, q)
    }

    pub fn notch(cutoff_hz: f32, q: f32) -> Self {
        Self::new(FilterType::Notch, cutoff_hz, q)
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    /// Integrator gain for `cutoff_hz`. The cutoff is kept just under Nyquist
    /// where tan() blows up.
    #[inline]
    pub fn compute_g(cutoff_hz: f32, sample_rate: f32) -> f32 {
        let nyquist_guard = sample_rate * 0.49;
        let cutoff = cutoff_hz.clamp(MIN_CUTOFF_HZ, nyquist_guard);
        (PI * cutoff / sample_rate).tan()
    }

    #[inline]
    pub fn compute_k(q: f32) -> f32 {
        1.0 / q.max(MIN_Q)
    }

    pub fn next_sample(&mut self, sample: f32, k: f32, g: f32) -> FilterOutputs {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            lowpass: v2,
            bandpass: v1,
            highpass: sample - k * v1 - v2,
            notch: sample - k * v1,
        }
    }

    #[inline]
    fn select(&self, outputs: FilterOutputs, k: f32) -> f32 {
        match self.filter_type {
            FilterType::LowPass => outputs.lowpass,
            FilterType::HighPass => outputs.highpass,
            FilterType::BandPass => outputs.bandpass * k,
            FilterType::Notch => outputs.notch,
        }
    }

    /// Filter `buffer` in place with the current cutoff and Q.
    pub fn render(&mut self, buffer: &mut [f32], sample_rate: f32) {
        let g = Self::compute_g(self.cutoff_hz, sample_rate);
        let k = Self::compute_k(self.q);

        for sample in buffer.iter_mut() {
            let outputs = self.next_sample(*sample, k, g);
            *sample = self.select(outputs, k);
        }
    }

    /// Filter `buffer` in place while the cutoff follows `cutoffs` sample by
    /// sample.
    pub fn render_tracking(&mut self, buffer: &mut [f32], cutoffs: &[f32], sample_rate: f32) {
        let k = Self::compute_k(self.q);
        let mut last_cutoff = f32::NAN;
        let mut g = 0.0;

        for (sample, &cutoff) in buffer.iter_mut().zip(cutoffs) {
            if cutoff != last_cutoff {
                g = Self::compute_g(cutoff, sample_rate);
                last_cutoff = cutoff;
            }
            let outputs = self.next_sample(*sample, k, g);
            *sample = self.select(outputs, k);
        }
        if last_cutoff.is_finite() {
            self.cutoff_hz = last_cutoff;
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.cutoff_hz = cutoff;
    }

    pub fn set_q(&mut self, q: f32) {
        self.q = q;
    }
}
