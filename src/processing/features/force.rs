//! Window summaries of force channels

use ndarray::{Array1, ArrayView1, Axis};

use crate::processing::windowing::StridedWindows;

/// Mean of every window
pub fn force_mean(windows: &StridedWindows<'_>) -> Array1<f64> {
    windows
        .view()
        .mean_axis(Axis(1))
        .unwrap_or_else(|| Array1::zeros(0))
}

/// Median of every window; even lengths average the middle pair
pub fn force_median(windows: &StridedWindows<'_>) -> Array1<f64> {
    windows.view().map_axis(Axis(1), median)
}

/// Last sample of every window
pub fn force_last(windows: &StridedWindows<'_>) -> Array1<f64> {
    windows
        .view()
        .map_axis(Axis(1), |row| match row.len() {
            0 => f64::NAN,
            len => row[len - 1],
        })
}

fn median(row: ArrayView1<'_, f64>) -> f64 {
    let mut sorted = row.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    match sorted.len() {
        0 => f64::NAN,
        len if len % 2 == 1 => sorted[mid],
        _ => (sorted[mid - 1] + sorted[mid]) / 2.0,
    }
}
