// src/processing/filters/iir.rs
//! IIR (Infinite Impulse Response) digital filters

use rustfft::num_complex::Complex64;

use super::IirCoefficients;
use crate::error::{EmgError, EmgResult};

/// IIR filter in transposed Direct Form II
pub struct IirFilter {
    coefficients: IirCoefficients,
    state: Vec<f64>,
    order: usize,
}

impl IirFilter {
    /// Digital Butterworth low-pass of the given order and cutoff
    ///
    /// Analog prototype, pre-warped frequency scaling and the bilinear
    /// transform, the same construction as the usual zero-pole-gain design.
    pub fn butterworth_lowpass(order: usize, cutoff_hz: f64, sample_rate_hz: f64) -> EmgResult<Self> {
        if order == 0 {
            return Err(EmgError::invalid_parameter("max", "order", "must be at least 1"));
        }
        if !(cutoff_hz > 0.0 && cutoff_hz < sample_rate_hz / 2.0) {
            return Err(EmgError::invalid_parameter(
                "max",
                "cutoff",
                format!("must lie in (0, {}) Hz, got {}", sample_rate_hz / 2.0, cutoff_hz),
            ));
        }

        let coefficients = butterworth_lowpass_coefficients(order, cutoff_hz / (sample_rate_hz / 2.0));
        Ok(Self::new(coefficients))
    }

    /// Create filter from coefficients, normalising by `a[0]`
    fn new(mut coefficients: IirCoefficients) -> Self {
        let order = coefficients.a.len().max(coefficients.b.len()) - 1;
        coefficients.a.resize(order + 1, 0.0);
        coefficients.b.resize(order + 1, 0.0);

        let a0 = coefficients.a[0];
        if a0 != 1.0 {
            coefficients.a.iter_mut().for_each(|c| *c /= a0);
            coefficients.b.iter_mut().for_each(|c| *c /= a0);
        }

        Self {
            coefficients,
            state: vec![0.0; order],
            order,
        }
    }

    /// Process single sample
    fn process_sample(&mut self, input: f64) -> f64 {
        let b = &self.coefficients.b;
        let a = &self.coefficients.a;
        let output = b[0] * input + self.state.first().copied().unwrap_or(0.0);

        for i in 0..self.order {
            let carried = if i + 1 < self.order { self.state[i + 1] } else { 0.0 };
            self.state[i] = b[i + 1] * input - a[i + 1] * output + carried;
        }

        output
    }

    /// Filter a whole sequence starting from zero state
    pub fn filter(&mut self, input: &[f64]) -> Vec<f64> {
        self.reset();
        input.iter().map(|&x| self.process_sample(x)).collect()
    }

    /// Reset filter state
    fn reset(&mut self) {
        self.state.fill(0.0);
    }
}

/// Butterworth low-pass for a cutoff normalised to Nyquist (`0 < wn < 1`)
fn butterworth_lowpass_coefficients(order: usize, wn: f64) -> IirCoefficients {
    use std::f64::consts::PI;

    let n = order as f64;
    // Bilinear transform with fs = 2 gives 2 * fs = 4
    let fs2 = 4.0;
    let warped = fs2 * (PI * wn / 2.0).tan();

    let analog_poles: Vec<Complex64> = (0..order)
        .map(|k| Complex64::from_polar(1.0, PI * (2.0 * k as f64 + n + 1.0) / (2.0 * n)) * warped)
        .collect();

    let digital_poles: Vec<Complex64> = analog_poles
        .iter()
        .map(|&p| (Complex64::new(fs2, 0.0) + p) / (Complex64::new(fs2, 0.0) - p))
        .collect();

    let denominator = analog_poles
        .iter()
        .fold(Complex64::new(1.0, 0.0), |acc, &p| acc * (Complex64::new(fs2, 0.0) - p));
    let gain = (Complex64::new(warped.powi(order as i32), 0.0) / denominator).re;

    // All zeros of the digital low-pass sit at z = -1
    let zeros = vec![Complex64::new(-1.0, 0.0); order];

    IirCoefficients {
        b: poly(&zeros).into_iter().map(|c| c.re * gain).collect(),
        a: poly(&digital_poles).into_iter().map(|c| c.re).collect(),
    }
}

/// Monic polynomial with the given roots, highest power first
fn poly(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coefficients = vec![Complex64::new(1.0, 0.0)];
    for &root in roots {
        let mut next = coefficients.clone();
        next.push(Complex64::new(0.0, 0.0));
        for (i, &c) in coefficients.iter().enumerate() {
            next[i + 1] -= root * c;
        }
        coefficients = next;
    }
    coefficients
}
