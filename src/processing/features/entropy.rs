//! Embedding-based regularity estimators (approximate and sample entropy)

use ndarray::{Array1, ArrayView1, Axis};

use crate::config::constants::features::SAMPLE_ENTROPY_FLOOR;
use crate::error::EmgResult;
use crate::processing::windowing::{stride_windows, with_row_slice, StridedWindows};

/// Chebyshev distance test between two embedded patterns
fn within_tolerance(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>, r: f64) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() <= r)
}

/// Approximate entropy of one sequence
///
/// Self matches are counted, so every match ratio is positive and the
/// logarithms are always defined.
pub fn approximate_entropy(x: &[f64], m: usize, r: f64) -> EmgResult<f64> {
    let n = x.len();
    let embedded = stride_windows(x, m, 1)?;
    let templates = embedded.len();
    if templates < 2 {
        return Ok(f64::NAN);
    }

    // in_range[i][j]: length-m patterns i and j match
    let mut in_range = vec![vec![false; templates]; templates];
    for i in 0..templates {
        in_range[i][i] = true;
        for j in (i + 1)..templates {
            let matched = within_tolerance(embedded.row(i), embedded.row(j), r);
            in_range[i][j] = matched;
            in_range[j][i] = matched;
        }
    }

    let phi_m: f64 = (0..templates)
        .map(|j| {
            let count = (0..templates).filter(|&i| in_range[i][j]).count();
            (count as f64 / templates as f64).ln()
        })
        .sum();

    // Length m+1 patterns match when the first m samples match and so does the next one
    let extended = n - m;
    let phi_m1: f64 = (0..extended)
        .map(|j| {
            let count = (0..extended)
                .filter(|&i| in_range[i][j] && (x[m + i] - x[m + j]).abs() <= r)
                .count();
            (count as f64 / extended as f64).ln()
        })
        .sum();

    Ok((phi_m - phi_m1) / extended as f64)
}

/// Sample entropy of one sequence
///
/// Self matches are excluded. Each per-template count starts from a tiny
/// floor, so a sequence without recurring patterns returns a finite value
/// instead of `ln(0)`.
pub fn sample_entropy(x: &[f64], m: usize, r: f64) -> EmgResult<f64> {
    let n = x.len();
    if n < m + 2 {
        return Ok(f64::NAN);
    }

    let embedded = stride_windows(x, m, 1)?;
    let slots = n - m - 1;
    let mut matches_m = vec![SAMPLE_ENTROPY_FLOOR; slots];
    let mut matches_m1 = vec![SAMPLE_ENTROPY_FLOOR; slots];

    for i in 0..(n - m) {
        for j in (i + 1)..(n - m) {
            if within_tolerance(embedded.row(i), embedded.row(j), r) {
                matches_m[i] += 1.0;
                if (x[i + m] - x[j + m]).abs() <= r {
                    matches_m1[i] += 1.0;
                }
            }
        }
    }

    let total_m: f64 = matches_m.iter().sum();
    let total_m1: f64 = matches_m1.iter().sum();
    Ok((total_m / total_m1).ln())
}

fn per_window(
    windows: &StridedWindows<'_>,
    f: impl Fn(&[f64]) -> EmgResult<f64>,
) -> EmgResult<Array1<f64>> {
    let mut values = Array1::zeros(windows.len());
    for (value, row) in values.iter_mut().zip(windows.view().axis_iter(Axis(0))) {
        *value = with_row_slice(row, &f)?;
    }
    Ok(values)
}

/// Approximate entropy of every window
pub fn approximate_entropy_windows(windows: &StridedWindows<'_>, m: usize, r: f64) -> EmgResult<Array1<f64>> {
    per_window(windows, |row| approximate_entropy(row, m, r))
}

/// Sample entropy of every window
pub fn sample_entropy_windows(windows: &StridedWindows<'_>, m: usize, r: f64) -> EmgResult<Array1<f64>> {
    per_window(windows, |row| sample_entropy(row, m, r))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_entropy_without_matches_is_finite() {
        // strictly spread samples never fall within r of each other
        let x: Vec<f64> = (0..20).map(|v| v as f64 * 10.0).collect();
        let value = sample_entropy(&x, 2, 0.5).unwrap();

        assert!(value.is_finite());
        assert!(value.abs() < 1e-12);
    }

    #[test]
    fn test_sample_entropy_periodic_signal() {
        let x: Vec<f64> = (0..60).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let value = sample_entropy(&x, 2, 0.1).unwrap();

        // every length-2 match extends to length 3
        assert!(value.abs() < 1e-9);
    }

    #[test]
    fn test_sample_entropy_known_counts() {
        // templates (m=1): 0,0,1,0 ; matches among i<j in 0..3 -> (0,1) only
        // and the next samples x[1]=0, x[2]=1 differ
        let x = vec![0.0, 0.0, 1.0, 0.0];
        let value = sample_entropy(&x, 1, 0.5).unwrap();

        let expected = ((1.0 + 2.0 * SAMPLE_ENTROPY_FLOOR) / (2.0 * SAMPLE_ENTROPY_FLOOR)).ln();
        assert!((value - expected).abs() < 1e-9);
    }

    #[test]
    fn test_approximate_entropy_regular_vs_random() {
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(7);
        let regular: Vec<f64> = (0..100).map(|i| (i % 4) as f64).collect();
        let irregular: Vec<f64> = (0..100).map(|_| rng.gen::<f64>()).collect();

        let low = approximate_entropy(&regular, 2, 0.2).unwrap();
        let high = approximate_entropy(&irregular, 2, 0.2).unwrap();

        assert!(low.is_finite() && high.is_finite());
        assert!(low < high);
        assert!(low.abs() < 0.05);
    }

    #[test]
    fn test_constant_sequence() {
        let x = vec![1.0; 30];
        assert!(approximate_entropy(&x, 2, 0.1).unwrap().abs() < 1e-12);
        assert!(sample_entropy(&x, 2, 0.1).unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_windowed_entropy() {
        let x: Vec<f64> = (0..64).map(|i| (i as f64 * 0.3).sin()).collect();
        let windows = crate::processing::windowing::stride_windows(&x, 32, 16).unwrap();

        let values = sample_entropy_windows(&windows, 2, 0.2).unwrap();
        assert_eq!(values.len(), 3);
        assert!(values.iter().all(|v| v.is_finite()));
    }
}
