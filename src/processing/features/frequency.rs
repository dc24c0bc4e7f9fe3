//! Frequency domain feature extraction for EMG signals
//!
//! All spectral features reduce the one-sided periodogram of each window:
//! constant detrend, rectangular window, density scaling `|X|^2 / (fs W)`
//! with every bin except DC (and Nyquist for even `W`) doubled.
//!
//! A window without power (constant after detrending) yields NaN for every
//! ratio of band powers or moments rather than an error.

use ndarray::{s, Array1, Array2, ArrayView1, Axis};
use rustfft::{num_complex::Complex, FftPlanner};

use crate::config::constants::features as consts;
use crate::error::{EmgError, EmgErrorBuilder, EmgResult, ProcessingStage};
use crate::processing::filters::IirFilter;
use crate::processing::windowing::{stride_windows, with_row_slice, StridedWindows};

/// Periodogram of every window: shared bin frequencies and `(N, W/2 + 1)` power
#[derive(Debug, Clone)]
pub struct SpectralDensity {
    /// Bin centres in Hz
    pub frequencies: Array1<f64>,
    /// One row of density per window
    pub power: Array2<f64>,
}

/// Bin frequencies `k * fs / W` for `k = 0..=W/2`
pub fn periodogram_frequencies(window: usize, sample_rate_hz: f64) -> Array1<f64> {
    (0..=window / 2)
        .map(|k| k as f64 * sample_rate_hz / window as f64)
        .collect()
}

/// Compute the periodogram of every window
pub fn periodogram(windows: &StridedWindows<'_>, sample_rate_hz: f64) -> SpectralDensity {
    let window = windows.window();
    let bins = window / 2 + 1;
    let frequencies = periodogram_frequencies(window, sample_rate_hz);
    let mut power = Array2::zeros((windows.len(), bins));

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(window);
    let scale = 1.0 / (sample_rate_hz * window as f64);
    // Nyquist bin has no mirror image when W is even
    let doubled_end = if window % 2 == 0 { bins - 1 } else { bins };

    let mut buffer: Vec<Complex<f64>> = Vec::with_capacity(window);
    for (row, mut out) in windows.rows().zip(power.rows_mut()) {
        let mean = row.sum() / window as f64;
        buffer.clear();
        buffer.extend(row.iter().map(|&x| Complex::new(x - mean, 0.0)));
        fft.process(&mut buffer);

        for (k, slot) in out.iter_mut().enumerate() {
            let density = buffer[k].norm_sqr() * scale;
            *slot = if k > 0 && k < doubled_end { 2.0 * density } else { density };
        }
    }

    SpectralDensity { frequencies, power }
}

impl SpectralDensity {
    /// Number of windows
    pub fn len(&self) -> usize {
        self.power.nrows()
    }

    /// True when there are no windows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn per_window(&self, f: impl Fn(ArrayView1<'_, f64>) -> f64) -> Array1<f64> {
        self.power.map_axis(Axis(1), f)
    }

    /// `sum(P f^order)` of one window
    fn moment(&self, power: &ArrayView1<'_, f64>, order: i32) -> f64 {
        power
            .iter()
            .zip(self.frequencies.iter())
            .map(|(p, f)| p * f.powi(order))
            .sum()
    }

    /// Mask of bins strictly inside `(low, high)`
    fn band_mask(&self, band: (f64, f64)) -> Vec<bool> {
        self.frequencies
            .iter()
            .map(|&f| band.0 < f && f < band.1)
            .collect()
    }

    fn band_power(power: &ArrayView1<'_, f64>, mask: &[bool]) -> f64 {
        power
            .iter()
            .zip(mask)
            .filter(|&(_, &inside)| inside)
            .map(|(p, _)| p)
            .sum()
    }
}

fn argmax(values: &ArrayView1<'_, f64>) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best, best_value), (i, &v)| {
            if v > best_value {
                (i, v)
            } else {
                (best, best_value)
            }
        })
        .0
}

/// Mean Frequency
pub fn mean_frequency(density: &SpectralDensity) -> Array1<f64> {
    density.per_window(|p| density.moment(&p, 1) / p.sum())
}

/// Median Frequency: first bin whose cumulative power exceeds half the total
///
/// Zero when the window carries no power.
pub fn median_frequency(density: &SpectralDensity) -> Array1<f64> {
    density.per_window(|p| {
        let half = p.sum() / 2.0;
        let mut cumulative = 0.0;
        for (power, frequency) in p.iter().zip(density.frequencies.iter()) {
            cumulative += power;
            if cumulative > half {
                return *frequency;
            }
        }
        0.0
    })
}

/// Peak Frequency
pub fn peak_frequency(density: &SpectralDensity) -> Array1<f64> {
    density.per_window(|p| density.frequencies[argmax(&p)])
}

/// Mean Power
pub fn mean_power(density: &SpectralDensity) -> Array1<f64> {
    density.per_window(|p| p.sum() / p.len() as f64)
}

/// Total Power
pub fn total_power(density: &SpectralDensity) -> Array1<f64> {
    density.per_window(|p| p.sum())
}

/// Spectral Moment of the given order
pub fn spectral_moment(density: &SpectralDensity, order: i32) -> Array1<f64> {
    density.per_window(|p| density.moment(&p, order))
}

/// Frequency Ratio of the power in two open bands
pub fn frequency_ratio(density: &SpectralDensity, low_band: (f64, f64), high_band: (f64, f64)) -> Array1<f64> {
    let low = density.band_mask(low_band);
    let high = density.band_mask(high_band);
    density.per_window(|p| SpectralDensity::band_power(&p, &low) / SpectralDensity::band_power(&p, &high))
}

/// Variance of Central Frequency
pub fn variance_central_frequency(density: &SpectralDensity) -> Array1<f64> {
    density.per_window(|p| {
        let sm0 = density.moment(&p, 0);
        let sm1 = density.moment(&p, 1);
        let sm2 = density.moment(&p, 2);
        sm2 / sm0 - (sm1 / sm0).powi(2)
    })
}

/// Power Spectrum Ratio: power within `half_width` bins of the peak over total power
pub fn power_spectrum_ratio(density: &SpectralDensity, window: usize, half_width: usize) -> Array1<f64> {
    density.per_window(|p| {
        let peak = argmax(&p);
        let low = peak.saturating_sub(half_width);
        let high = (peak + half_width).min(window).min(p.len());
        p.slice(s![low..high]).sum() / p.sum()
    })
}

/// Signal-to-Noise Ratio
pub fn signal_to_noise_ratio(
    density: &SpectralDensity,
    power_band: (f64, f64),
    noise_band: (f64, f64),
) -> Array1<f64> {
    let signal = density.band_mask(power_band);
    let noise = density.band_mask(noise_band);
    let max_frequency = density
        .frequencies
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    density.per_window(|p| {
        SpectralDensity::band_power(&p, &signal)
            / (SpectralDensity::band_power(&p, &noise) * max_frequency)
    })
}

/// Moving means of length `n` over a run of bins
fn moving_means(values: &[f64], n: usize) -> EmgResult<Vec<f64>> {
    let strided = stride_windows(values, n, 1)?;
    Ok(strided.rows().map(|w| w.sum() / n as f64).collect())
}

/// Number of periodogram bins strictly inside `band`
pub fn bins_in_band(window: usize, sample_rate_hz: f64, band: (f64, f64)) -> usize {
    periodogram_frequencies(window, sample_rate_hz)
        .iter()
        .filter(|&&f| band.0 < f && f < band.1)
        .count()
}

/// Maximum-to-minimum drop in power density ratio
pub fn power_density_drop_ratio(density: &SpectralDensity, band: (f64, f64), n: usize) -> EmgResult<Array1<f64>> {
    let mask = density.band_mask(band);
    let in_band = mask.iter().filter(|&&inside| inside).count();
    if n == 0 || in_band < n {
        return Err(EmgError::invalid_parameter(
            "dpr",
            "n",
            format!("band {:?} holds {} bins, need at least n = {} (n >= 1)", band, in_band, n),
        ));
    }

    let mut values = Array1::zeros(density.len());
    for (value, p) in values.iter_mut().zip(density.power.rows()) {
        let band_power: Vec<f64> = p
            .iter()
            .zip(&mask)
            .filter(|&(_, &inside)| inside)
            .map(|(&power, _)| power)
            .collect();
        let means = moving_means(&band_power, n)?;
        let max = means.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = means.iter().copied().fold(f64::INFINITY, f64::min);
        *value = max / min;
    }
    Ok(values)
}

/// Power Spectrum Deformation
pub fn power_spectrum_deformation(density: &SpectralDensity) -> Array1<f64> {
    density.per_window(|p| {
        let sm0 = density.moment(&p, 0);
        let sm1 = density.moment(&p, 1);
        let sm2 = density.moment(&p, 2);
        (sm2 / sm0).sqrt() / (sm1 / sm0)
    })
}

/// Signal-to-Motion artifact Ratio
///
/// Unverified estimator kept as published: a line through the origin and the
/// peak of the smoothed spectrum above 35 Hz separates artifact power from
/// signal power below 600 Hz.
pub fn signal_to_motion_ratio(density: &SpectralDensity, n: usize) -> EmgResult<Array1<f64>> {
    let above_floor: Vec<bool> = density
        .frequencies
        .iter()
        .map(|&f| f > consts::SMR_PEAK_SEARCH_FLOOR_HZ)
        .collect();
    let first_above = above_floor.iter().position(|&inside| inside).unwrap_or(0);
    let available = above_floor.iter().filter(|&&inside| inside).count();
    if n == 0 || available < n {
        return Err(EmgError::invalid_parameter(
            "smr",
            "n",
            format!("{} bins above {} Hz, need at least n = {} (n >= 1)", available, consts::SMR_PEAK_SEARCH_FLOOR_HZ, n),
        ));
    }

    let frequencies = &density.frequencies;
    let mut values = Array1::zeros(density.len());
    for (value, p) in values.iter_mut().zip(density.power.rows()) {
        let band_power: Vec<f64> = p
            .iter()
            .zip(&above_floor)
            .filter(|&(_, &inside)| inside)
            .map(|(&power, _)| power)
            .collect();
        let means = Array1::from(moving_means(&band_power, n)?);
        let peak = argmax(&means.view());
        let peak_bin = peak + n / 2 + first_above;
        let slope = means[peak] / frequencies[peak_bin];

        let signal: f64 = p
            .iter()
            .zip(frequencies.iter())
            .filter(|&(_, &f)| f < consts::SMR_SIGNAL_CEILING_HZ)
            .map(|(power, _)| power)
            .sum();
        let artifact: f64 = p
            .iter()
            .zip(frequencies.iter())
            .filter(|&(&power, &f)| power > f * slope)
            .map(|(power, _)| power)
            .sum();
        *value = signal / artifact;
    }
    Ok(values)
}

/// Maximum of the low-pass filtered rectified window
///
/// Every window is filtered on its own from zero initial state.
pub fn filtered_maximum(
    windows: &StridedWindows<'_>,
    order: usize,
    cutoff_hz: f64,
    sample_rate_hz: f64,
) -> EmgResult<Array1<f64>> {
    let mut filter = IirFilter::butterworth_lowpass(order, cutoff_hz, sample_rate_hz)?;

    let mut values = Array1::zeros(windows.len());
    for (value, row) in values.iter_mut().zip(windows.rows()) {
        let rectified: Vec<f64> = with_row_slice(row, |x| x.iter().map(|v| v.abs()).collect());
        let filtered = filter.filter(&rectified);
        if filtered.iter().any(|y| !y.is_finite()) {
            return Err(EmgErrorBuilder::new("frequency", "filtered_maximum")
                .processing(ProcessingStage::Filtering, "low-pass output is not finite"));
        }
        *value = filtered.into_iter().fold(f64::NEG_INFINITY, f64::max);
    }
    Ok(values)
}
