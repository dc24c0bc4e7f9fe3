// src/config/constants.rs
//! Crate-wide configuration constants

/// Signal and windowing constants
pub mod signal {
    /// Sampling rate assumed by every spectral feature unless configured otherwise
    pub const DEFAULT_SAMPLING_RATE_HZ: f64 = 5120.0;
    /// Samples per window when none is configured
    pub const DEFAULT_WINDOW_SAMPLES: usize = 500;
    /// Hop between windows when none is configured
    pub const DEFAULT_STEP_SAMPLES: usize = 250;
}

/// Channel family naming
pub mod channels {
    /// EMG channel columns are `EMG_<n>`
    pub const EMG_PREFIX: &str = "EMG_";
    /// Force channel columns are `FORCE_<n>`
    pub const FORCE_PREFIX: &str = "FORCE_";
    /// Prepended to force feature labels so they never collide with EMG labels
    pub const FORCE_LABEL_PREFIX: &str = "FORCE_";
}

/// Feature algorithm constants
pub mod features {
    /// Edge ramp used by the type 2 modified mean absolute value
    pub const MAV2_SLOPE_FRACTION: f64 = 0.25;
    /// Lower edge of the quarter band used by the type 1 modified mean absolute value
    pub const MAV1_BAND_LOW: f64 = 0.25;
    /// Upper edge of the same band
    pub const MAV1_BAND_HIGH: f64 = 0.75;
    /// Weight outside the band
    pub const MAV1_EDGE_WEIGHT: f64 = 0.5;
    /// Windows this short have no separate centre band
    pub const MAV1_MIN_BANDED_WINDOW: usize = 5;

    /// Per-template floor of the sample entropy counts
    pub const SAMPLE_ENTROPY_FLOOR: f64 = 1e-100;

    /// Smallest signal that still yields two box sizes for the fractal fit
    pub const MIN_BOX_COUNTING_SAMPLES: usize = 8;

    /// Motion-artifact ratio: spectrum above this frequency is searched for the peak
    pub const SMR_PEAK_SEARCH_FLOOR_HZ: f64 = 35.0;
    /// Motion-artifact ratio: signal power is summed below this frequency
    pub const SMR_SIGNAL_CEILING_HZ: f64 = 600.0;

    /// Power spectrum ratio: bins summed on either side of the peak
    pub const PSR_PEAK_HALF_WIDTH_BINS: usize = 20;
}

/// Environment and file naming
pub mod paths {
    /// Environment variables overriding the feature set start with this
    pub const ENV_PREFIX: &str = "EMG_FEATURES";
    /// Nesting separator in environment variable names
    pub const ENV_SEPARATOR: &str = "__";
}
