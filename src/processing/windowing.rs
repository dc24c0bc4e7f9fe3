// src/processing/windowing.rs
//! Strided sliding windows and the weight vectors applied to them
//!
//! [`stride_windows`] never copies samples: the returned view has shape
//! `(N, W)` and strides `(S, 1)` over the caller's buffer, so overlapping
//! windows share memory. The view is read-only; anything that needs scratch
//! space copies a single row.

use ndarray::{Array1, ArrayView1, ArrayView2, Axis, ShapeBuilder};

use crate::config::constants::features as consts;
use crate::error::{EmgError, EmgErrorBuilder, EmgResult};

/// Overlapping windows over a borrowed signal
#[derive(Debug, Clone)]
pub struct StridedWindows<'a> {
    view: ArrayView2<'a, f64>,
    window: usize,
    step: usize,
}

/// Build the `(N, W)` window view of `signal` with hop `step`
///
/// `N = (len - window) / step + 1`, or zero windows when the signal is
/// shorter than `window`.
pub fn stride_windows(signal: &[f64], window: usize, step: usize) -> EmgResult<StridedWindows<'_>> {
    if window == 0 {
        return Err(EmgError::invalid_parameter("windowing", "window", "must be at least 1"));
    }
    if step == 0 {
        return Err(EmgError::invalid_parameter("windowing", "step", "must be at least 1"));
    }

    let count = window_count(signal.len(), window, step);
    let view = if count == 0 {
        ArrayView2::from_shape((0, window), &[]).map_err(|e| {
            EmgErrorBuilder::new("windowing", "stride_windows")
                .invalid_data("window view", &e.to_string())
        })?
    } else {
        debug_assert!((count - 1) * step + window <= signal.len());
        // SAFETY: the furthest element reached is (count - 1) * step + window - 1,
        // which is inside `signal`; strides are non-negative and the view is
        // immutable, so rows may overlap.
        unsafe { ArrayView2::from_shape_ptr((count, window).strides((step, 1)), signal.as_ptr()) }
    };

    Ok(StridedWindows { view, window, step })
}

/// Number of complete windows that fit in `len` samples
pub fn window_count(len: usize, window: usize, step: usize) -> usize {
    if window == 0 || step == 0 || len < window {
        0
    } else {
        (len - window) / step + 1
    }
}

impl<'a> StridedWindows<'a> {
    /// The `(N, W)` view, aliasing the source signal
    pub fn view(&self) -> ArrayView2<'a, f64> {
        self.view
    }

    /// Row `i` of the view
    pub fn row(&self, i: usize) -> ArrayView1<'a, f64> {
        self.view.index_axis_move(Axis(0), i)
    }

    /// Every window in order
    pub fn rows(&self) -> impl Iterator<Item = ArrayView1<'a, f64>> + '_ {
        (0..self.len()).map(move |i| self.row(i))
    }

    /// Number of windows `N`
    pub fn len(&self) -> usize {
        self.view.nrows()
    }

    /// True when the signal was shorter than one window
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Samples per window
    pub fn window(&self) -> usize {
        self.window
    }

    /// Hop between window starts
    pub fn step(&self) -> usize {
        self.step
    }

    /// Source position of the last sample of every window
    pub fn last_positions(&self) -> Vec<usize> {
        (0..self.len())
            .map(|i| i * self.step + self.window - 1)
            .collect()
    }
}

/// Run `f` on a window row as a plain slice
///
/// Rows of a [`StridedWindows`] view are contiguous, so this only copies for
/// views built some other way.
pub fn with_row_slice<R>(row: ArrayView1<'_, f64>, f: impl FnOnce(&[f64]) -> R) -> R {
    match row.as_slice() {
        Some(slice) => f(slice),
        None => f(&row.to_vec()),
    }
}

/// Trapezoidal weights: linear ramp up over the first `floor(slope_fraction * size)`
/// samples, ones in the middle, ramp down over the same number of last samples
pub fn trapezoidal_window(size: usize, slope_fraction: f64) -> EmgResult<Array1<f64>> {
    if !(0.0..=0.5).contains(&slope_fraction) {
        return Err(EmgError::invalid_parameter(
            "windowing",
            "slope_fraction",
            format!("must lie in [0, 0.5], got {}", slope_fraction),
        ));
    }

    let ramp = (slope_fraction * size as f64).floor() as usize;
    let mut weights = Array1::ones(size);
    if ramp == 0 {
        return Ok(weights);
    }

    for i in 0..ramp {
        let value = linspace_point(i, ramp);
        weights[i] = value;
        weights[size - 1 - i] = value;
    }

    Ok(weights)
}

/// `i`-th point of `linspace(0, 1, n)`
fn linspace_point(i: usize, n: usize) -> f64 {
    if n <= 1 {
        0.0
    } else {
        i as f64 / (n - 1) as f64
    }
}

/// Weights of the type 1 modified mean absolute value
pub fn quarter_band_window(size: usize) -> Array1<f64> {
    if size < consts::MAV1_MIN_BANDED_WINDOW {
        return Array1::ones(size);
    }

    let low = consts::MAV1_BAND_LOW * size as f64;
    let high = consts::MAV1_BAND_HIGH * size as f64;
    (1..=size)
        .map(|i| {
            let i = i as f64;
            if low <= i && i <= high {
                1.0
            } else {
                consts::MAV1_EDGE_WEIGHT
            }
        })
        .collect()
}

/// Symmetric Hamming window
pub fn hamming_window(size: usize) -> Array1<f64> {
    if size == 1 {
        return Array1::ones(1);
    }
    (0..size)
        .map(|i| 0.54 - 0.46 * (2.0 * std::f64::consts::PI * i as f64 / (size - 1) as f64).cos())
        .collect()
}
