//! Time domain feature extraction for EMG signals
//!
//! Every function reduces each row of a [`StridedWindows`] view to one value.

use ndarray::{Array1, ArrayView1, Axis};

use crate::config::constants::features as consts;
use crate::error::EmgResult;
use crate::processing::windowing::{
    hamming_window, quarter_band_window, trapezoidal_window, StridedWindows,
};

fn per_window(windows: &StridedWindows<'_>, f: impl Fn(ArrayView1<'_, f64>) -> f64) -> Array1<f64> {
    windows.view().map_axis(Axis(1), f)
}

/// Consecutive differences of one window
fn diffs<'a>(row: &'a ArrayView1<'_, f64>) -> impl Iterator<Item = f64> + 'a {
    row.iter().zip(row.iter().skip(1)).map(|(a, b)| b - a)
}

fn mean(row: &ArrayView1<'_, f64>) -> f64 {
    row.sum() / row.len() as f64
}

/// Central moments 2, 3 and 4 (biased)
fn central_moments(row: &ArrayView1<'_, f64>) -> (f64, f64, f64) {
    let mu = mean(row);
    let n = row.len() as f64;
    let (m2, m3, m4) = row.iter().fold((0.0, 0.0, 0.0), |(m2, m3, m4), &x| {
        let d = x - mu;
        let d2 = d * d;
        (m2 + d2, m3 + d2 * d, m4 + d2 * d2)
    });
    (m2 / n, m3 / n, m4 / n)
}

/// Integral Absolute Value
pub fn integral_absolute_value(windows: &StridedWindows<'_>) -> Array1<f64> {
    per_window(windows, |row| row.iter().map(|x| x.abs()).sum())
}

/// Average Amplitude Change
pub fn average_amplitude_change(windows: &StridedWindows<'_>) -> Array1<f64> {
    let window = windows.window() as f64;
    per_window(windows, |row| diffs(&row).map(f64::abs).sum::<f64>() / window)
}

/// Difference Absolute Standard Deviation Value
pub fn difference_absolute_std(windows: &StridedWindows<'_>) -> Array1<f64> {
    per_window(windows, |row| {
        let count = row.len().saturating_sub(1) as f64;
        (diffs(&row).map(|d| d * d).sum::<f64>() / count).sqrt()
    })
}

/// Excess (Fisher) kurtosis, biased estimator
pub fn kurtosis(windows: &StridedWindows<'_>) -> Array1<f64> {
    per_window(windows, |row| {
        let (m2, _, m4) = central_moments(&row);
        m4 / (m2 * m2) - 3.0
    })
}

/// Skewness, biased estimator
pub fn skewness(windows: &StridedWindows<'_>) -> Array1<f64> {
    per_window(windows, |row| {
        let (m2, m3, _) = central_moments(&row);
        m3 / m2.powf(1.5)
    })
}

/// Population variance
pub fn variance(windows: &StridedWindows<'_>) -> Array1<f64> {
    per_window(windows, |row| central_moments(&row).0)
}

/// Log Detector
pub fn log_detector(windows: &StridedWindows<'_>) -> Array1<f64> {
    per_window(windows, |row| {
        (row.iter().map(|x| x.abs().ln()).sum::<f64>() / row.len() as f64).exp()
    })
}

/// Mean Absolute Value
pub fn mean_absolute_value(windows: &StridedWindows<'_>) -> Array1<f64> {
    per_window(windows, |row| row.iter().map(|x| x.abs()).sum::<f64>() / row.len() as f64)
}

fn weighted_mean_absolute(windows: &StridedWindows<'_>, weights: &Array1<f64>) -> Array1<f64> {
    per_window(windows, |row| {
        row.iter()
            .zip(weights.iter())
            .map(|(x, w)| x.abs() * w)
            .sum::<f64>()
            / row.len() as f64
    })
}

/// Modified Mean Absolute Value Type 1 (quarter-band edge weights)
pub fn modified_mav_type1(windows: &StridedWindows<'_>) -> Array1<f64> {
    weighted_mean_absolute(windows, &quarter_band_window(windows.window()))
}

/// Modified Mean Absolute Value Type 2 (trapezoidal edge weights)
pub fn modified_mav_type2(windows: &StridedWindows<'_>) -> EmgResult<Array1<f64>> {
    let weights = trapezoidal_window(windows.window(), consts::MAV2_SLOPE_FRACTION)?;
    Ok(weighted_mean_absolute(windows, &weights))
}

/// Mean Absolute Value Slope: one value fewer than there are windows
pub fn mav_slope(windows: &StridedWindows<'_>) -> Array1<f64> {
    let mav = mean_absolute_value(windows);
    mav.iter().zip(mav.iter().skip(1)).map(|(a, b)| b - a).collect()
}

/// Multiple Hamming Windows energy
pub fn multiple_hamming_windows(windows: &StridedWindows<'_>) -> Array1<f64> {
    let hamming = hamming_window(windows.window());
    per_window(windows, |row| {
        row.iter()
            .zip(hamming.iter())
            .map(|(x, w)| (x * w).powi(2))
            .sum()
    })
}

/// Multiple Trapezoidal Windows energy
pub fn multiple_trapezoidal_windows(
    windows: &StridedWindows<'_>,
    window_slope: f64,
) -> EmgResult<Array1<f64>> {
    let weights = trapezoidal_window(windows.window(), window_slope)?;
    Ok(per_window(windows, |row| {
        row.iter()
            .zip(weights.iter())
            .map(|(x, w)| x * x * w)
            .sum()
    }))
}

/// Myopulse Percentage Rate
pub fn myopulse_rate(windows: &StridedWindows<'_>, threshold: f64) -> Array1<f64> {
    let window = windows.window() as f64;
    per_window(windows, |row| {
        row.iter().filter(|&&x| x > threshold).count() as f64 / window
    })
}

/// Root Mean Square
pub fn root_mean_square(windows: &StridedWindows<'_>) -> Array1<f64> {
    per_window(windows, |row| (row.iter().map(|x| x * x).sum::<f64>() / row.len() as f64).sqrt())
}

/// Simple Square Integral
pub fn simple_square_integral(windows: &StridedWindows<'_>) -> Array1<f64> {
    per_window(windows, |row| row.iter().map(|x| x * x).sum())
}

/// Absolute Temporal Moment of the given order
pub fn temporal_moment(windows: &StridedWindows<'_>, order: i32) -> Array1<f64> {
    per_window(windows, |row| {
        (row.iter().map(|x| x.powi(order)).sum::<f64>() / row.len() as f64).abs()
    })
}

/// V-Order: generalised power mean of order `v`
pub fn v_order(windows: &StridedWindows<'_>, v: f64) -> Array1<f64> {
    per_window(windows, |row| {
        let moment = row.iter().map(|x| x.powf(v)).sum::<f64>() / row.len() as f64;
        moment.abs().powf(1.0 / v)
    })
}

/// Willison Amplitude: rising differences of at least `threshold`
pub fn willison_amplitude(windows: &StridedWindows<'_>, threshold: f64) -> Array1<f64> {
    per_window(windows, |row| diffs(&row).filter(|&d| d >= threshold).count() as f64)
}

/// Waveform Length as the signed sum of consecutive differences
pub fn waveform_length(windows: &StridedWindows<'_>) -> Array1<f64> {
    per_window(windows, |row| diffs(&row).sum())
}

/// Zero Crossing with hysteresis
///
/// Samples inside `[-threshold, threshold]` are dropped; sign changes are
/// counted between the remaining consecutive samples.
pub fn zero_crossings(windows: &StridedWindows<'_>, threshold: f64) -> Array1<f64> {
    per_window(windows, |row| {
        let mut count = 0usize;
        let mut previous: Option<bool> = None;
        for &x in row.iter().filter(|&&x| x < -threshold || x > threshold) {
            let positive = x > 0.0;
            if previous.is_some_and(|p| p != positive) {
                count += 1;
            }
            previous = Some(positive);
        }
        count as f64
    })
}

/// Slope Sign Change with hysteresis
pub fn slope_sign_changes(windows: &StridedWindows<'_>, threshold: f64) -> Array1<f64> {
    per_window(windows, |row| {
        let d: Vec<f64> = diffs(&row).collect();
        d.iter()
            .zip(d.iter().skip(1))
            .filter(|(a, b)| *a * *b <= -threshold)
            .count() as f64
    })
}
