//! Box-counting fractal dimension of a window or of its power spectrum

use std::collections::HashSet;

use ndarray::Array1;

use crate::config::constants::features::MIN_BOX_COUNTING_SAMPLES;
use crate::error::{EmgErrorBuilder, EmgResult, ProcessingStage};
use crate::processing::features::frequency::SpectralDensity;
use crate::processing::windowing::{with_row_slice, StridedWindows};

/// Box-counting dimension of one curve
///
/// The curve is resampled linearly at `1/subsampling` sample spacing. Box
/// widths run `2^n, 2^(n-1), ..., 4` with `n = floor(log2(len))`; box heights
/// are `width * y_box_size_multiplier`. The slope of `ln(count)` against
/// `ln(1/width)` is returned.
pub fn box_counting_dimension(sig: &[f64], y_box_size_multiplier: f64, subsampling: usize) -> EmgResult<f64> {
    if sig.len() < MIN_BOX_COUNTING_SAMPLES || subsampling == 0 {
        return Err(EmgErrorBuilder::new("fractal", "box_counting_dimension").processing(
            ProcessingStage::Fractal,
            "need at least 8 samples and a positive subsampling",
        ));
    }

    let minimum = sig.iter().copied().fold(f64::INFINITY, f64::min);
    let points = resample(sig, subsampling);
    let n = sig.len().ilog2();

    let mut log_inverse_sizes = Vec::new();
    let mut log_counts = Vec::new();
    for exponent in (2..=n).rev() {
        let x_box_size = f64::from(1u32 << exponent);
        let y_box_size = x_box_size * y_box_size_multiplier;

        let occupied: HashSet<(i64, i64)> = points
            .iter()
            .map(|&(x, y)| {
                (
                    (x / x_box_size).floor() as i64,
                    ((y - minimum) / y_box_size).floor() as i64,
                )
            })
            .collect();

        log_inverse_sizes.push((1.0 / x_box_size).ln());
        log_counts.push((occupied.len() as f64).ln());
    }

    Ok(linear_fit_slope(&log_inverse_sizes, &log_counts))
}

/// Points `(i/subsampling, sig interpolated there)` for `i = 0..=(len-1)*subsampling`
fn resample(sig: &[f64], subsampling: usize) -> Vec<(f64, f64)> {
    let last = (sig.len() - 1) * subsampling;
    (0..=last)
        .map(|i| {
            let (whole, part) = (i / subsampling, i % subsampling);
            let x = i as f64 / subsampling as f64;
            let y = if part == 0 {
                sig[whole]
            } else {
                let t = part as f64 / subsampling as f64;
                sig[whole] + (sig[whole + 1] - sig[whole]) * t
            };
            (x, y)
        })
        .collect()
}

/// Slope of the least-squares line through `(x, y)`
fn linear_fit_slope(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;
    let (covariance, spread) = x
        .iter()
        .zip(y)
        .fold((0.0, 0.0), |(c, s), (xi, yi)| {
            let dx = xi - mean_x;
            (c + dx * (yi - mean_y), s + dx * dx)
        });
    covariance / spread
}

/// Box-counting dimension of every window
pub fn box_counting_windows(
    windows: &StridedWindows<'_>,
    y_box_size_multiplier: f64,
    subsampling: usize,
) -> EmgResult<Array1<f64>> {
    let mut values = Array1::zeros(windows.len());
    for (value, row) in values.iter_mut().zip(windows.rows()) {
        *value = with_row_slice(row, |sig| {
            box_counting_dimension(sig, y_box_size_multiplier, subsampling)
        })?;
    }
    Ok(values)
}

/// Box-counting dimension of every window's power spectrum
pub fn power_spectrum_fractal_dimension(
    density: &SpectralDensity,
    power_box_size_multiplier: f64,
    subsampling: usize,
) -> EmgResult<Array1<f64>> {
    let mut values = Array1::zeros(density.len());
    for (value, power) in values.iter_mut().zip(density.power.rows()) {
        *value = with_row_slice(power, |sig| {
            box_counting_dimension(sig, power_box_size_multiplier, subsampling)
        })?;
    }
    Ok(values)
}
