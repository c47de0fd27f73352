//! Zero-phase Butterworth low-pass filtering
//!
//! The filter is designed as a cascade of second-order sections (bilinear
//! transform with frequency pre-warping) and run forward then backward, so
//! the smoothed force keeps its timing. The edges are padded with an odd
//! reflection and each section starts in its steady state for the first
//! padded sample, which keeps a constant signal constant at both ends.

use crate::error::ComputeError;
use std::f64::consts::PI;

/// Second-order section coefficients, `a[0]` normalised to 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    /// Numerator coefficients [b0, b1, b2]
    pub b: [f64; 3],
    /// Denominator coefficients [1, a1, a2]
    pub a: [f64; 3],
}

impl BiquadCoeffs {
    /// Low-pass section with quality factor `q`
    pub fn lowpass(sample_rate: f64, cutoff: f64, q: f64) -> Self {
        let k = (PI * cutoff / sample_rate).tan();
        let k2 = k * k;
        let norm = 1.0 / (1.0 + k / q + k2);
        let b0 = k2 * norm;

        Self {
            b: [b0, 2.0 * b0, b0],
            a: [1.0, 2.0 * (k2 - 1.0) * norm, (1.0 - k / q + k2) * norm],
        }
    }

    /// Gain at 0 Hz
    pub fn dc_gain(&self) -> f64 {
        (self.b[0] + self.b[1] + self.b[2]) / (self.a[0] + self.a[1] + self.a[2])
    }
}

/// Direct form II transposed section
#[derive(Debug, Clone)]
struct Biquad {
    coeffs: BiquadCoeffs,
    state: [f64; 2],
}

impl Biquad {
    fn new(coeffs: BiquadCoeffs) -> Self {
        Self {
            coeffs,
            state: [0.0, 0.0],
        }
    }

    /// Load the state a constant input `x0` would settle into
    fn prime(&mut self, x0: f64) {
        let [_, b1, b2] = self.coeffs.b;
        let [_, a1, a2] = self.coeffs.a;
        let y0 = self.coeffs.dc_gain() * x0;
        let z2 = b2 * x0 - a2 * y0;
        let z1 = b1 * x0 - a1 * y0 + z2;
        self.state = [z1, z2];
    }

    fn filter(&mut self, input: f64) -> f64 {
        let [b0, b1, b2] = self.coeffs.b;
        let [_, a1, a2] = self.coeffs.a;
        let output = b0 * input + self.state[0];
        self.state[0] = b1 * input - a1 * output + self.state[1];
        self.state[1] = b2 * input - a2 * output;
        output
    }
}

/// Even-order Butterworth low-pass as cascaded biquads
#[derive(Debug, Clone)]
pub struct ButterworthLowpass {
    order: usize,
    sections: Vec<BiquadCoeffs>,
}

impl ButterworthLowpass {
    /// Design the filter
    ///
    /// # Arguments
    /// * `order` - Filter order, even and at least 2
    /// * `cutoff_hz` - -3 dB frequency of a single pass
    /// * `sample_rate_hz` - Sampling frequency
    pub fn design(order: usize, cutoff_hz: f64, sample_rate_hz: f64) -> Result<Self, ComputeError> {
        if order < 2 || order % 2 != 0 {
            return Err(ComputeError::InvalidFilter {
                reason: format!("order must be even and >= 2 (got {})", order),
            });
        }
        if !(cutoff_hz > 0.0 && cutoff_hz < sample_rate_hz / 2.0) {
            return Err(ComputeError::InvalidFilter {
                reason: format!(
                    "cutoff {} Hz must lie in (0, {}) Hz",
                    cutoff_hz,
                    sample_rate_hz / 2.0
                ),
            });
        }

        // Pole pairs sit at angles (2k + 1) * pi / (2n) from the imaginary axis
        let sections = (0..order / 2)
            .map(|k| {
                let theta = PI * (2 * k + 1) as f64 / (2 * order) as f64;
                let q = 1.0 / (2.0 * theta.cos());
                BiquadCoeffs::lowpass(sample_rate_hz, cutoff_hz, q)
            })
            .collect();

        Ok(Self { order, sections })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn sections(&self) -> &[BiquadCoeffs] {
        &self.sections
    }

    /// Samples of odd reflection added at each edge
    pub fn pad_len(&self) -> usize {
        3 * (self.order + 1)
    }

    /// Forward-backward pass with no phase distortion
    pub fn filtfilt(&self, signal: &[f64]) -> Result<Vec<f64>, ComputeError> {
        let pad = self.pad_len();
        if signal.len() <= pad {
            return Err(ComputeError::SeriesTooShort {
                what: "filter input",
                len: signal.len(),
                required: pad + 1,
            });
        }

        let n = signal.len();
        let first = signal[0];
        let last = signal[n - 1];
        let mut extended = Vec::with_capacity(n + 2 * pad);
        extended.extend((1..=pad).rev().map(|i| 2.0 * first - signal[i]));
        extended.extend_from_slice(signal);
        extended.extend((1..=pad).map(|i| 2.0 * last - signal[n - 1 - i]));

        let mut forward = self.primed_pass(&extended);
        forward.reverse();
        let mut backward = self.primed_pass(&forward);
        backward.reverse();

        Ok(backward[pad..pad + n].to_vec())
    }

    fn primed_pass(&self, signal: &[f64]) -> Vec<f64> {
        let mut cascade: Vec<Biquad> = self.sections.iter().copied().map(Biquad::new).collect();
        let mut level = signal.first().copied().unwrap_or(0.0);
        for section in &mut cascade {
            section.prime(level);
            level *= section.coeffs.dc_gain();
        }
        signal
            .iter()
            .map(|&x| cascade.iter_mut().fold(x, |acc, section| section.filter(acc)))
            .collect()
    }
}
