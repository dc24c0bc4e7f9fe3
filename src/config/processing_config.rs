// src/config/processing_config.rs
//! Windowing and pipeline configuration structures

use serde::{Deserialize, Serialize};

use crate::config::constants::signal;

/// Windowing shared by every feature of a batch
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct WindowingConfig {
    /// Samples per window
    #[serde(default = "defaults::window")]
    pub window: usize,

    /// Samples between consecutive window starts
    #[serde(default = "defaults::step")]
    pub step: usize,

    /// Sampling rate used by the spectral features
    #[serde(default = "defaults::sampling_rate_hz")]
    pub sampling_rate_hz: f64,
}

/// Driver behaviour
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Evaluate the channels of one feature concurrently
    #[serde(default = "defaults::parallel_channels")]
    pub parallel_channels: bool,
}

mod defaults {
    use super::signal;

    pub fn window() -> usize { signal::DEFAULT_WINDOW_SAMPLES }
    pub fn step() -> usize { signal::DEFAULT_STEP_SAMPLES }
    pub fn sampling_rate_hz() -> f64 { signal::DEFAULT_SAMPLING_RATE_HZ }
    pub fn parallel_channels() -> bool { true }
}

impl WindowingConfig {
    /// Windowing at the default sampling rate
    pub fn new(window: usize, step: usize) -> Self {
        Self {
            window,
            step,
            ..Self::default()
        }
    }

    /// Override the sampling rate
    pub fn with_sampling_rate(mut self, sampling_rate_hz: f64) -> Self {
        self.sampling_rate_hz = sampling_rate_hz;
        self
    }

    /// Nyquist frequency of the configured sampling rate; the low-pass
    /// cutoff of the filtered maximum must stay below it
    pub fn nyquist_hz(&self) -> f64 {
        self.sampling_rate_hz / 2.0
    }
}

impl Default for WindowingConfig {
    fn default() -> Self {
        Self {
            window: defaults::window(),
            step: defaults::step(),
            sampling_rate_hz: defaults::sampling_rate_hz(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            parallel_channels: defaults::parallel_channels(),
        }
    }
}

/// Validate windowing configuration
pub fn validate_windowing_config(config: &WindowingConfig) -> Result<(), String> {
    if config.window == 0 {
        return Err("Window length must be greater than 0".to_string());
    }
    if config.step == 0 {
        return Err("Step length must be greater than 0".to_string());
    }
    if !(config.sampling_rate_hz.is_finite() && config.sampling_rate_hz > 0.0) {
        return Err(format!(
            "Sampling rate must be a positive number, got {}",
            config.sampling_rate_hz
        ));
    }

    Ok(())
}
