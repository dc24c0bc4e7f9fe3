//! EMG-Features: windowed feature extraction for multichannel EMG recordings
//!
//! This library turns a recording of EMG and force channels into a table of
//! per-window descriptors. It features:
//!
//! - Zero-copy strided window views over each channel
//! - Time domain, entropy, autoregressive, spectral and fractal features
//! - Force channel summaries
//! - Parallel multi-channel evaluation with outer-joined results
//! - TOML feature sets with environment overrides
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use emg_features::config::ConfigLoader;
//! use emg_features::processing::FeaturePipeline;
//! use emg_features::table::Recording;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let request = ConfigLoader::from_toml_str(
//!         r#"
//!         [windowing]
//!         window = 500
//!         step = 250
//!
//!         [[feature]]
//!         name = "rms"
//!
//!         [[feature]]
//!         name = "ar"
//!         order = 4
//!         "#,
//!     )?;
//!
//!     let samples: Vec<f64> = (0..5120).map(|i| (i as f64 * 0.05).sin()).collect();
//!     let recording = Recording::new((0..5120).collect())?
//!         .with_column("EMG_1", samples)?;
//!
//!     let table = FeaturePipeline::from_config(&request).run(&recording, &request)?;
//!     println!("{}", serde_json::to_string(&table)?);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod error;
pub mod processing;
pub mod table;

// Re-export commonly used types for convenience
pub use config::{ConfigLoader, FeatureSetConfig, PipelineConfig, WindowingConfig};
pub use error::{EmgError, EmgResult, ProcessingStage};
pub use processing::{Feature, FeaturePipeline, ForceFeature};
pub use table::{FeatureTable, Recording};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
