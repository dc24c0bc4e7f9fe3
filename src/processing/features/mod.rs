//! EMG signal feature extraction module
//!
//! Every feature is a variant of the closed [`Feature`] registry carrying its
//! own typed parameters:
//! - Time domain features (RMS, MAV, ZC, SSC, WL, ...)
//! - Regularity (approximate and sample entropy)
//! - Autoregressive and cepstral coefficients
//! - Frequency domain features computed from the periodogram
//! - Box-counting fractal dimensions
//!
//! Force channels use the separate [`ForceFeature`] registry.

pub mod autoregressive;
pub mod entropy;
pub mod force;
pub mod fractal;
pub mod frequency;
pub mod time_domain;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::config::constants::features as consts;
use crate::config::WindowingConfig;
use crate::error::{EmgError, EmgResult};
use crate::processing::windowing::{stride_windows, StridedWindows};

/// A frequency band `(low, high)` in Hz, both edges exclusive
pub type Band = (f64, f64);

/// Result of one feature on one channel
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureOutput {
    /// Source sample position of every output row
    pub positions: Vec<usize>,
    /// Computed values, one row per position
    pub values: FeatureValues,
}

/// One value per window, or a fixed-width vector per window
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValues {
    /// Shape `(N,)`
    Scalar(Array1<f64>),
    /// Shape `(N, components)`
    Vector(Array2<f64>),
}

impl FeatureOutput {
    fn scalar(windows: &StridedWindows<'_>, values: Array1<f64>) -> Self {
        Self {
            positions: windows.last_positions(),
            values: FeatureValues::Scalar(values),
        }
    }

    fn vector(windows: &StridedWindows<'_>, values: Array2<f64>) -> Self {
        Self {
            positions: windows.last_positions(),
            values: FeatureValues::Vector(values),
        }
    }

    /// Number of windows
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True when the channel was shorter than one window
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Output column labels for channel `channel_id`
    ///
    /// Scalars give `<name>_<id>`, vectors `<name>_<id>_<component>`.
    pub fn labels(&self, name: &str, channel_id: &str) -> Vec<String> {
        match &self.values {
            FeatureValues::Scalar(_) => vec![format!("{}_{}", name, channel_id)],
            FeatureValues::Vector(values) => (0..values.ncols())
                .map(|component| format!("{}_{}_{}", name, channel_id, component))
                .collect(),
        }
    }

    /// Values split into one column per label
    pub fn columns(&self) -> Vec<Vec<f64>> {
        match &self.values {
            FeatureValues::Scalar(values) => vec![values.to_vec()],
            FeatureValues::Vector(values) => values.columns().into_iter().map(|c| c.to_vec()).collect(),
        }
    }
}

/// Registry of EMG features and their parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum Feature {
    /// Integrated absolute value
    Iav,
    /// Average amplitude change
    Aac,
    /// Approximate entropy
    Apen {
        /// Template length
        m: usize,
        /// Match tolerance as a fraction of the window standard deviation
        r: f64,
    },
    /// Autoregressive coefficients, oldest lag first
    Ar {
        /// Model order `p`
        order: usize,
    },
    /// Cepstral coefficients of the AR model
    Cc {
        /// Model order `p`
        order: usize,
    },
    /// Difference absolute standard deviation value
    Dasdv,
    /// Kurtosis
    Kurt,
    /// Log detector
    Log,
    /// Modified mean absolute value, type 1
    Mav1,
    /// Modified mean absolute value, type 2
    Mav2,
    /// Mean absolute value
    Mav,
    /// Difference of mean absolute values of consecutive windows
    Mavslp,
    /// Multiple Hamming windows
    Mhw,
    /// Multiple trapezoidal windows
    Mtw {
        /// Ramp length as a fraction of the window, in `[0, 0.5]`
        windowslope: f64,
    },
    /// Myopulse percentage rate
    Myop {
        /// Samples above this count as active
        threshold: f64,
    },
    /// Root mean square
    Rms,
    /// Sample entropy
    Sampleen {
        /// Template length
        m: usize,
        /// Match tolerance as a fraction of the window standard deviation
        r: f64,
    },
    /// Skewness
    Skew,
    /// Slope sign changes
    Ssc {
        /// Neighbouring differences count when their product is at most `-threshold`
        threshold: f64,
    },
    /// Simple square integral
    Ssi,
    /// Absolute temporal moment
    Tm {
        /// Moment order
        order: i32,
    },
    /// Variance
    Var,
    /// V-order
    V {
        /// Order of the generalised mean, non-zero
        v: f64,
    },
    /// Willison amplitude
    Wamp {
        /// Minimum rising difference between neighbours
        threshold: f64,
    },
    /// Waveform length
    Wl,
    /// Zero crossings
    Zc {
        /// Samples inside `[-threshold, threshold]` are ignored
        threshold: f64,
    },
    /// Mean frequency
    Mnf,
    /// Median frequency
    Mdf,
    /// Peak frequency
    Pkf,
    /// Mean power
    Mnp,
    /// Total power
    Ttp,
    /// Spectral moment
    Sm {
        /// Moment order
        order: i32,
    },
    /// Frequency ratio
    Fr {
        /// Low band
        flb: Band,
        /// High band
        fhb: Band,
    },
    /// Variance of central frequency
    Vcf,
    /// Power spectrum ratio around the peak
    Psr {
        /// Accepted for compatibility; the band is always
        /// [`PSR_PEAK_HALF_WIDTH_BINS`](crate::config::constants::features::PSR_PEAK_HALF_WIDTH_BINS)
        /// bins either side of the peak
        n: usize,
    },
    /// Signal-to-noise ratio
    Snr {
        /// Band holding the signal
        powerband: Band,
        /// Band holding the noise
        noiseband: Band,
    },
    /// Power spectrum density drop ratio
    Dpr {
        /// Band searched
        band: Band,
        /// Moving-mean length in bins
        n: usize,
    },
    /// Power spectrum deformation
    Ohm,
    /// Maximum of the rectified, low-pass filtered window
    Max {
        /// Butterworth order
        order: usize,
        /// Cutoff in Hz, below Nyquist
        cutoff: f64,
    },
    /// Signal-to-motion artifact ratio
    Smr {
        /// Moving-mean length in bins
        n: usize,
    },
    /// Box-counting dimension of the waveform
    Bc {
        /// Vertical box size relative to the horizontal one
        y_box_size_multiplier: f64,
        /// Keep every `subsampling`-th sample
        subsampling: usize,
    },
    /// Box-counting dimension of the power spectrum
    Psdfd {
        /// Vertical box size relative to the horizontal one
        power_box_size_multiplier: f64,
        /// Keep every `subsampling`-th bin
        subsampling: usize,
    },
}

impl Feature {
    /// Every registered feature name
    pub const NAMES: [&'static str; 42] = [
        "iav", "aac", "apen", "ar", "cc", "dasdv", "kurt", "log", "mav1", "mav2", "mav",
        "mavslp", "mhw", "mtw", "myop", "rms", "sampleen", "skew", "ssc", "ssi", "tm", "var",
        "v", "wamp", "wl", "zc", "mnf", "mdf", "pkf", "mnp", "ttp", "sm", "fr", "vcf", "psr",
        "snr", "dpr", "ohm", "max", "smr", "bc", "psdfd",
    ];

    /// Look a feature up by name and build it from a parameter table
    pub fn from_params(name: &str, params: toml::Table) -> EmgResult<Self> {
        let lowered = name.to_ascii_lowercase();
        if !Self::NAMES.contains(&lowered.as_str()) {
            return Err(EmgError::UnknownFeature { name: name.to_string() });
        }

        let mut table = params;
        table.insert("name".to_string(), toml::Value::String(lowered.clone()));
        toml::Value::Table(table)
            .try_into()
            .map_err(|e: toml::de::Error| EmgError::invalid_parameter(&lowered, "parameters", e.message()))
    }

    /// Look a parameterless feature up by name
    pub fn from_name(name: &str) -> EmgResult<Self> {
        Self::from_params(name, toml::Table::new())
    }

    /// Registry name, also the output label prefix
    pub fn name(&self) -> &'static str {
        match self {
            Feature::Iav => "iav",
            Feature::Aac => "aac",
            Feature::Apen { .. } => "apen",
            Feature::Ar { .. } => "ar",
            Feature::Cc { .. } => "cc",
            Feature::Dasdv => "dasdv",
            Feature::Kurt => "kurt",
            Feature::Log => "log",
            Feature::Mav1 => "mav1",
            Feature::Mav2 => "mav2",
            Feature::Mav => "mav",
            Feature::Mavslp => "mavslp",
            Feature::Mhw => "mhw",
            Feature::Mtw { .. } => "mtw",
            Feature::Myop { .. } => "myop",
            Feature::Rms => "rms",
            Feature::Sampleen { .. } => "sampleen",
            Feature::Skew => "skew",
            Feature::Ssc { .. } => "ssc",
            Feature::Ssi => "ssi",
            Feature::Tm { .. } => "tm",
            Feature::Var => "var",
            Feature::V { .. } => "v",
            Feature::Wamp { .. } => "wamp",
            Feature::Wl => "wl",
            Feature::Zc { .. } => "zc",
            Feature::Mnf => "mnf",
            Feature::Mdf => "mdf",
            Feature::Pkf => "pkf",
            Feature::Mnp => "mnp",
            Feature::Ttp => "ttp",
            Feature::Sm { .. } => "sm",
            Feature::Fr { .. } => "fr",
            Feature::Vcf => "vcf",
            Feature::Psr { .. } => "psr",
            Feature::Snr { .. } => "snr",
            Feature::Dpr { .. } => "dpr",
            Feature::Ohm => "ohm",
            Feature::Max { .. } => "max",
            Feature::Smr { .. } => "smr",
            Feature::Bc { .. } => "bc",
            Feature::Psdfd { .. } => "psdfd",
        }
    }

    /// Human readable name, used in progress messages
    pub fn description(&self) -> &'static str {
        match self {
            Feature::Iav => "Integral Absolute Value",
            Feature::Aac => "Average Amplitude Change",
            Feature::Apen { .. } => "Approximate Entropy",
            Feature::Ar { .. } => "Autoregressive Coefficients",
            Feature::Cc { .. } => "Cepstral Coefficients",
            Feature::Dasdv => "Difference Absolute Standard Deviation Value",
            Feature::Kurt => "Kurtosis",
            Feature::Log => "Log Detector",
            Feature::Mav1 => "Modified Mean Absolute Value Type 1",
            Feature::Mav2 => "Modified Mean Absolute Value Type 2",
            Feature::Mav => "Mean Absolute Value",
            Feature::Mavslp => "Mean Absolute Value Slope",
            Feature::Mhw => "Multiple Hamming Windows",
            Feature::Mtw { .. } => "Multiple Trapezoidal Windows",
            Feature::Myop { .. } => "Myopulse Percentage Rate",
            Feature::Rms => "Root Mean Square",
            Feature::Sampleen { .. } => "Sample Entropy",
            Feature::Skew => "Skewness",
            Feature::Ssc { .. } => "Slope Sign Change",
            Feature::Ssi => "Simple Square Integral",
            Feature::Tm { .. } => "Absolute Temporal Moment",
            Feature::Var => "Variance",
            Feature::V { .. } => "V-Order",
            Feature::Wamp { .. } => "Willison Amplitude",
            Feature::Wl => "Waveform Length",
            Feature::Zc { .. } => "Zero Crossing",
            Feature::Mnf => "Mean Frequency",
            Feature::Mdf => "Median Frequency",
            Feature::Pkf => "Peak Frequency",
            Feature::Mnp => "Mean Power",
            Feature::Ttp => "Total Power",
            Feature::Sm { .. } => "Spectral Moment",
            Feature::Fr { .. } => "Frequency Ratio",
            Feature::Vcf => "Variance of Central Frequency",
            Feature::Psr { .. } => "Power Spectrum Ratio",
            Feature::Snr { .. } => "Signal-to-Noise Ratio",
            Feature::Dpr { .. } => "Maximum-to-minimum Drop in Power Density Ratio",
            Feature::Ohm => "Power Spectrum Deformation",
            Feature::Max { .. } => "Maximum Amplitude",
            Feature::Smr { .. } => "Signal-to-Motion Artifact Ratio",
            Feature::Bc { .. } => "Box-Counting Dimension",
            Feature::Psdfd { .. } => "Power Spectral Density Fractal Dimension",
        }
    }

    /// Check the parameters against the shared windowing
    pub fn validate(&self, windowing: &WindowingConfig) -> EmgResult<()> {
        let name = self.name();
        let window = windowing.window;
        let fs = windowing.sampling_rate_hz;
        let invalid = |parameter: &str, reason: String| Err(EmgError::invalid_parameter(name, parameter, reason));

        match *self {
            Feature::Apen { m, r } | Feature::Sampleen { m, r } => {
                if m == 0 || m + 1 >= window {
                    return invalid("m", format!("need 1 <= m and m + 1 < window ({}), got {}", window, m));
                }
                if !(r >= 0.0) {
                    return invalid("r", format!("must be non-negative, got {}", r));
                }
            }
            Feature::Ar { order } | Feature::Cc { order } => {
                if order == 0 || order >= window {
                    return invalid("order", format!("need 1 <= order < window ({}), got {}", window, order));
                }
            }
            Feature::Mtw { windowslope } => {
                if !(0.0..=0.5).contains(&windowslope) {
                    return invalid("windowslope", format!("must lie in [0, 0.5], got {}", windowslope));
                }
            }
            Feature::Myop { threshold }
            | Feature::Ssc { threshold }
            | Feature::Wamp { threshold }
            | Feature::Zc { threshold } => {
                if !threshold.is_finite() {
                    return invalid("threshold", format!("must be finite, got {}", threshold));
                }
            }
            Feature::V { v } => {
                if v == 0.0 || !v.is_finite() {
                    return invalid("v", format!("must be finite and non-zero, got {}", v));
                }
            }
            Feature::Fr { flb, fhb } => {
                check_band(name, "flb", flb)?;
                check_band(name, "fhb", fhb)?;
            }
            Feature::Snr { powerband, noiseband } => {
                check_band(name, "powerband", powerband)?;
                check_band(name, "noiseband", noiseband)?;
            }
            Feature::Dpr { band, n } => {
                check_band(name, "band", band)?;
                let available = frequency::bins_in_band(window, fs, band);
                if n == 0 || available < n {
                    return invalid("n", format!("need 1 <= n <= {} bins inside {:?}, got {}", available, band, n));
                }
            }
            Feature::Smr { n } => {
                let available = frequency::bins_in_band(window, fs, (consts::SMR_PEAK_SEARCH_FLOOR_HZ, f64::INFINITY));
                if n == 0 || available < n {
                    return invalid("n", format!("need 1 <= n <= {} bins above {} Hz, got {}", available, consts::SMR_PEAK_SEARCH_FLOOR_HZ, n));
                }
            }
            Feature::Max { order, cutoff } => {
                if order == 0 {
                    return invalid("order", "must be at least 1".to_string());
                }
                let nyquist = windowing.nyquist_hz();
                if !(cutoff > 0.0 && cutoff < nyquist) {
                    return invalid("cutoff", format!("must lie in (0, {}) Hz, got {}", nyquist, cutoff));
                }
            }
            Feature::Bc { y_box_size_multiplier: multiplier, subsampling } => {
                check_box_counting(name, "y_box_size_multiplier", multiplier, subsampling, window)?;
            }
            Feature::Psdfd { power_box_size_multiplier: multiplier, subsampling } => {
                check_box_counting(name, "power_box_size_multiplier", multiplier, subsampling, window / 2 + 1)?;
            }
            _ => {}
        }

        Ok(())
    }

    /// Window `signal` and compute this feature on every window
    pub fn compute(&self, signal: &[f64], windowing: &WindowingConfig) -> EmgResult<FeatureOutput> {
        self.validate(windowing)?;

        let windows = stride_windows(signal, windowing.window, windowing.step)?;
        let fs = windowing.sampling_rate_hz;

        let output = match *self {
            Feature::Iav => FeatureOutput::scalar(&windows, time_domain::integral_absolute_value(&windows)),
            Feature::Aac => FeatureOutput::scalar(&windows, time_domain::average_amplitude_change(&windows)),
            Feature::Apen { m, r } => {
                FeatureOutput::scalar(&windows, entropy::approximate_entropy_windows(&windows, m, r)?)
            }
            Feature::Ar { order } => {
                FeatureOutput::vector(&windows, autoregressive::autoregressive_coefficients(&windows, order)?)
            }
            Feature::Cc { order } => {
                let ar = autoregressive::autoregressive_coefficients(&windows, order)?;
                FeatureOutput::vector(&windows, autoregressive::cepstral_coefficients(&ar))
            }
            Feature::Dasdv => FeatureOutput::scalar(&windows, time_domain::difference_absolute_std(&windows)),
            Feature::Kurt => FeatureOutput::scalar(&windows, time_domain::kurtosis(&windows)),
            Feature::Log => FeatureOutput::scalar(&windows, time_domain::log_detector(&windows)),
            Feature::Mav1 => FeatureOutput::scalar(&windows, time_domain::modified_mav_type1(&windows)),
            Feature::Mav2 => FeatureOutput::scalar(&windows, time_domain::modified_mav_type2(&windows)?),
            Feature::Mav => FeatureOutput::scalar(&windows, time_domain::mean_absolute_value(&windows)),
            Feature::Mavslp => FeatureOutput {
                positions: windows.last_positions().into_iter().skip(1).collect(),
                values: FeatureValues::Scalar(time_domain::mav_slope(&windows)),
            },
            Feature::Mhw => FeatureOutput::scalar(&windows, time_domain::multiple_hamming_windows(&windows)),
            Feature::Mtw { windowslope } => FeatureOutput::scalar(
                &windows,
                time_domain::multiple_trapezoidal_windows(&windows, windowslope)?,
            ),
            Feature::Myop { threshold } => {
                FeatureOutput::scalar(&windows, time_domain::myopulse_rate(&windows, threshold))
            }
            Feature::Rms => FeatureOutput::scalar(&windows, time_domain::root_mean_square(&windows)),
            Feature::Sampleen { m, r } => {
                FeatureOutput::scalar(&windows, entropy::sample_entropy_windows(&windows, m, r)?)
            }
            Feature::Skew => FeatureOutput::scalar(&windows, time_domain::skewness(&windows)),
            Feature::Ssc { threshold } => {
                FeatureOutput::scalar(&windows, time_domain::slope_sign_changes(&windows, threshold))
            }
            Feature::Ssi => FeatureOutput::scalar(&windows, time_domain::simple_square_integral(&windows)),
            Feature::Tm { order } => FeatureOutput::scalar(&windows, time_domain::temporal_moment(&windows, order)),
            Feature::Var => FeatureOutput::scalar(&windows, time_domain::variance(&windows)),
            Feature::V { v } => FeatureOutput::scalar(&windows, time_domain::v_order(&windows, v)),
            Feature::Wamp { threshold } => {
                FeatureOutput::scalar(&windows, time_domain::willison_amplitude(&windows, threshold))
            }
            Feature::Wl => FeatureOutput::scalar(&windows, time_domain::waveform_length(&windows)),
            Feature::Zc { threshold } => {
                FeatureOutput::scalar(&windows, time_domain::zero_crossings(&windows, threshold))
            }
            Feature::Max { order, cutoff } => {
                FeatureOutput::scalar(&windows, frequency::filtered_maximum(&windows, order, cutoff, fs)?)
            }
            Feature::Bc { y_box_size_multiplier, subsampling } => FeatureOutput::scalar(
                &windows,
                fractal::box_counting_windows(&windows, y_box_size_multiplier, subsampling)?,
            ),
            _ => {
                let density = frequency::periodogram(&windows, fs);
                FeatureOutput::scalar(&windows, self.spectral(&density, windowing.window)?)
            }
        };

        Ok(output)
    }

    /// Reductions of the periodogram
    fn spectral(&self, density: &frequency::SpectralDensity, window: usize) -> EmgResult<Array1<f64>> {
        let values = match *self {
            Feature::Mnf => frequency::mean_frequency(density),
            Feature::Mdf => frequency::median_frequency(density),
            Feature::Pkf => frequency::peak_frequency(density),
            Feature::Mnp => frequency::mean_power(density),
            Feature::Ttp => frequency::total_power(density),
            Feature::Sm { order } => frequency::spectral_moment(density, order),
            Feature::Fr { flb, fhb } => frequency::frequency_ratio(density, flb, fhb),
            Feature::Vcf => frequency::variance_central_frequency(density),
            // `n` is parsed for configuration compatibility; the band width is fixed
            Feature::Psr { .. } => frequency::power_spectrum_ratio(density, window, consts::PSR_PEAK_HALF_WIDTH_BINS),
            Feature::Snr { powerband, noiseband } => frequency::signal_to_noise_ratio(density, powerband, noiseband),
            Feature::Dpr { band, n } => frequency::power_density_drop_ratio(density, band, n)?,
            Feature::Ohm => frequency::power_spectrum_deformation(density),
            Feature::Smr { n } => frequency::signal_to_motion_ratio(density, n)?,
            Feature::Psdfd { power_box_size_multiplier, subsampling } => {
                fractal::power_spectrum_fractal_dimension(density, power_box_size_multiplier, subsampling)?
            }
            _ => {
                return Err(EmgError::invalid_parameter(
                    self.name(),
                    "name",
                    "not a spectral feature",
                ))
            }
        };
        Ok(values)
    }
}

fn check_band(feature: &str, parameter: &str, band: Band) -> EmgResult<()> {
    if band.0 < band.1 {
        Ok(())
    } else {
        Err(EmgError::invalid_parameter(
            feature,
            parameter,
            format!("low edge must be below high edge, got {:?}", band),
        ))
    }
}

fn check_box_counting(
    feature: &str,
    parameter: &str,
    multiplier: f64,
    subsampling: usize,
    curve_len: usize,
) -> EmgResult<()> {
    if !(multiplier > 0.0) {
        return Err(EmgError::invalid_parameter(feature, parameter, format!("must be positive, got {}", multiplier)));
    }
    if subsampling == 0 {
        return Err(EmgError::invalid_parameter(feature, "subsampling", "must be at least 1"));
    }
    if curve_len < consts::MIN_BOX_COUNTING_SAMPLES {
        return Err(EmgError::invalid_parameter(
            feature,
            "window",
            format!("box counting needs {} points, the curve has {}", consts::MIN_BOX_COUNTING_SAMPLES, curve_len),
        ));
    }
    Ok(())
}

/// Registry of force-channel features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum ForceFeature {
    /// Mean of the window
    Mean,
    /// Median of the window
    Median,
    /// Last sample of the window
    Last,
}

impl ForceFeature {
    /// Every registered force feature name
    pub const NAMES: [&'static str; 3] = ["mean", "median", "last"];

    /// Case-insensitive lookup
    pub fn from_name(name: &str) -> EmgResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "mean" => Ok(ForceFeature::Mean),
            "median" => Ok(ForceFeature::Median),
            "last" => Ok(ForceFeature::Last),
            _ => Err(EmgError::UnknownFeature { name: name.to_string() }),
        }
    }

    /// Registry name
    pub fn name(&self) -> &'static str {
        match self {
            ForceFeature::Mean => "mean",
            ForceFeature::Median => "median",
            ForceFeature::Last => "last",
        }
    }

    /// Window `signal` and summarise every window
    pub fn compute(&self, signal: &[f64], windowing: &WindowingConfig) -> EmgResult<FeatureOutput> {
        let windows = stride_windows(signal, windowing.window, windowing.step)?;
        let values = match self {
            ForceFeature::Mean => force::force_mean(&windows),
            ForceFeature::Median => force::force_median(&windows),
            ForceFeature::Last => force::force_last(&windows),
        };
        Ok(FeatureOutput::scalar(&windows, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(content: &str) -> toml::Table {
        content.parse::<toml::Table>().unwrap()
    }

    #[test]
    fn test_names_round_trip() {
        for name in Feature::NAMES {
            // parameterless lookup either succeeds or reports the missing parameter
            match Feature::from_name(name) {
                Ok(feature) => assert_eq!(feature.name(), name),
                Err(err) => assert!(matches!(err, EmgError::InvalidParameter { .. }), "{}: {}", name, err),
            }
        }
    }

    #[test]
    fn test_from_params() {
        let feature = Feature::from_params("ZC", params("threshold = 0.01")).unwrap();
        assert_eq!(feature, Feature::Zc { threshold: 0.01 });

        let feature = Feature::from_params("fr", params("flb = [20, 80]\nfhb = [100.0, 500.0]")).unwrap();
        assert_eq!(feature, Feature::Fr { flb: (20.0, 80.0), fhb: (100.0, 500.0) });
    }

    #[test]
    fn test_unknown_and_invalid_lookups() {
        assert!(matches!(
            Feature::from_name("spectral_flux"),
            Err(EmgError::UnknownFeature { .. })
        ));
        assert!(matches!(
            Feature::from_params("ar", params("order = \"four\"")),
            Err(EmgError::InvalidParameter { .. })
        ));
        assert!(matches!(Feature::from_name("zc"), Err(EmgError::InvalidParameter { .. })));
    }

    #[test]
    fn test_validation_against_window() {
        let windowing = WindowingConfig::new(64, 32);

        assert!(Feature::Ar { order: 8 }.validate(&windowing).is_ok());
        assert!(Feature::Ar { order: 64 }.validate(&windowing).is_err());
        assert!(Feature::Sampleen { m: 2, r: -0.1 }.validate(&windowing).is_err());
        assert!(Feature::Mtw { windowslope: 0.6 }.validate(&windowing).is_err());
        assert!(Feature::Max { order: 2, cutoff: 3000.0 }.validate(&windowing).is_err());
        // cutoff must stay strictly below Nyquist of the configured rate
        let slow = WindowingConfig::new(64, 32).with_sampling_rate(2000.0);
        assert!(Feature::Max { order: 2, cutoff: 900.0 }.validate(&slow).is_ok());
        assert!(Feature::Max { order: 2, cutoff: 1000.0 }.validate(&slow).is_err());
        assert!(Feature::Fr { flb: (80.0, 20.0), fhb: (100.0, 200.0) }.validate(&windowing).is_err());
        // 80 Hz bins: (0, 200) holds two bins
        assert!(Feature::Dpr { band: (0.0, 200.0), n: 3 }.validate(&windowing).is_err());
        assert!(Feature::Dpr { band: (0.0, 200.0), n: 2 }.validate(&windowing).is_ok());
        assert!(Feature::Psdfd { power_box_size_multiplier: 1.0, subsampling: 1 }
            .validate(&WindowingConfig::new(12, 6))
            .is_err());
    }

    #[test]
    fn test_psr_band_ignores_n() {
        let signal: Vec<f64> = (0..512)
            .map(|i| {
                let t = i as f64;
                (t * 0.31).sin() + 0.6 * (t * 0.9).sin() + 0.4 * (t * 1.7).cos() + 0.2 * (t * 2.6).sin()
            })
            .collect();
        let windowing = WindowingConfig::new(256, 128);

        let values = |n| match (Feature::Psr { n }).compute(&signal, &windowing).unwrap().values {
            FeatureValues::Scalar(values) => values,
            FeatureValues::Vector(_) => panic!("psr is a scalar feature"),
        };
        let narrow = values(1);
        assert_eq!(narrow, values(20));
        assert_eq!(narrow, values(200));

        let windows = stride_windows(&signal, 256, 128).unwrap();
        let density = frequency::periodogram(&windows, windowing.sampling_rate_hz);
        assert_eq!(narrow, frequency::power_spectrum_ratio(&density, 256, 20));
        // a one-bin band would capture less of the spread spectrum
        let one_bin = frequency::power_spectrum_ratio(&density, 256, 1);
        assert!(narrow.iter().zip(one_bin.iter()).all(|(wide, tight)| wide > tight));
    }

    #[test]
    fn test_vector_output_labels() {
        let signal: Vec<f64> = (0..200).map(|i| (i as f64 * 0.7).sin() + (i as f64 * 0.13).cos()).collect();
        let windowing = WindowingConfig::new(100, 50);

        let output = Feature::Ar { order: 3 }.compute(&signal, &windowing).unwrap();
        assert_eq!(output.positions, vec![99, 149, 199]);
        assert_eq!(output.labels("ar", "3"), vec!["ar_3_0", "ar_3_1", "ar_3_2"]);
        assert_eq!(output.columns().len(), 3);

        let output = Feature::Rms.compute(&signal, &windowing).unwrap();
        assert_eq!(output.labels("rms", "3"), vec!["rms_3"]);
    }

    #[test]
    fn test_mav_slope_positions() {
        let signal: Vec<f64> = (0..20).map(|v| v as f64).collect();
        let output = Feature::Mavslp.compute(&signal, &WindowingConfig::new(5, 5)).unwrap();

        assert_eq!(output.positions, vec![9, 14, 19]);
        assert_eq!(output.len(), 3);
    }

    #[test]
    fn test_short_signal_gives_empty_output() {
        let output = Feature::Cc { order: 2 }.compute(&[1.0, 2.0], &WindowingConfig::new(10, 5)).unwrap();
        assert!(output.is_empty());
        assert_eq!(output.labels("cc", "1").len(), 2);
    }

    #[test]
    fn test_force_registry() {
        let signal = vec![1.0, 2.0, 3.0, 4.0];
        let output = ForceFeature::Last.compute(&signal, &WindowingConfig::new(2, 2)).unwrap();
        assert_eq!(output.values, FeatureValues::Scalar(ndarray::array![2.0, 4.0]));

        assert_eq!(ForceFeature::from_name("Median").unwrap(), ForceFeature::Median);
        assert!(ForceFeature::from_name("max").is_err());
    }
}
