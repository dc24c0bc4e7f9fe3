// src/processing/filters/mod.rs
//! Digital filters applied inside feature computations

pub mod iir;

pub use iir::*;

/// Transfer function coefficients, highest power first, `a[0] == 1`
#[derive(Debug, Clone, PartialEq)]
pub struct IirCoefficients {
    /// Numerator coefficients
    pub b: Vec<f64>,
    /// Denominator coefficients
    pub a: Vec<f64>,
}
