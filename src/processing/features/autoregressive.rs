//! Autoregressive coefficients and their cepstral transform

use nalgebra::{DMatrix, DVector, SVD};
use ndarray::{Array2, ArrayView1};

use crate::error::{EmgErrorBuilder, EmgResult, ProcessingStage};
use crate::processing::windowing::{stride_windows, with_row_slice, StridedWindows};

/// Least-squares AR fit of one window
///
/// Regresses `x[t]` on the `p` samples before it for `t = p..W-1`. Component
/// `k` of the returned vector multiplies `x[t-p+k]`, so the first component is
/// the lag-`p` coefficient and the last one the lag-1 coefficient.
pub fn fit_autoregressive(x: &[f64], order: usize) -> EmgResult<Vec<f64>> {
    let n = x.len();
    if order == 0 || order >= n {
        return Err(EmgErrorBuilder::new("autoregressive", "fit")
            .processing(ProcessingStage::Regression, "order must satisfy 1 <= order < window"));
    }

    // lagged.row(r) == x[r..r+order], the samples preceding target x[r+order]
    let lagged = stride_windows(&x[..n - 1], order, 1)?;
    let lagged = lagged.view();
    let rows = n - order;

    let design = DMatrix::from_fn(rows, order, |r, c| lagged[[r, c]]);
    let target = DVector::from_iterator(rows, x[order..].iter().copied());

    let svd = SVD::new(design, true, true);
    let sigma_max = svd.singular_values.max();
    let cutoff = f64::EPSILON * rows.max(order) as f64 * sigma_max;

    let solution = svd.solve(&target, cutoff).map_err(|reason| {
        EmgErrorBuilder::new("autoregressive", "lstsq").processing(ProcessingStage::Regression, reason)
    })?;

    if solution.iter().any(|a| !a.is_finite()) {
        return Err(EmgErrorBuilder::new("autoregressive", "lstsq")
            .processing(ProcessingStage::Regression, "non-finite coefficients"));
    }

    Ok(solution.iter().copied().collect())
}

/// AR coefficients of every window, shape `(N, order)`
pub fn autoregressive_coefficients(windows: &StridedWindows<'_>, order: usize) -> EmgResult<Array2<f64>> {
    let mut coefficients = Array2::zeros((windows.len(), order));
    for (i, row) in windows.rows().enumerate() {
        let fitted = with_row_slice(row, |x| fit_autoregressive(x, order))?;
        coefficients
            .row_mut(i)
            .iter_mut()
            .zip(fitted)
            .for_each(|(slot, a)| *slot = a);
    }
    Ok(coefficients)
}

/// Cepstral coefficients of one AR vector
///
/// `c_0 = -a_0`, then `c_k = -a_k - a_k c_{k-1} sum_{l=1..k}(1 - l/(k+1))`.
pub fn cepstral_from_ar(ar: ArrayView1<'_, f64>) -> Vec<f64> {
    let mut cepstral: Vec<f64> = Vec::with_capacity(ar.len());
    for (k, &a) in ar.iter().enumerate() {
        let value = match cepstral.last() {
            None => -a,
            Some(&previous) => {
                let weight: f64 = (1..=k).map(|l| 1.0 - l as f64 / (k + 1) as f64).sum();
                -a - a * previous * weight
            }
        };
        cepstral.push(value);
    }
    cepstral
}

/// Cepstral coefficients for every window; the AR matrix is left untouched
pub fn cepstral_coefficients(ar: &Array2<f64>) -> Array2<f64> {
    let mut cepstral = Array2::zeros(ar.raw_dim());
    for (mut out, row) in cepstral.rows_mut().into_iter().zip(ar.rows()) {
        out.iter_mut()
            .zip(cepstral_from_ar(row))
            .for_each(|(slot, c)| *slot = c);
    }
    cepstral
}
