// src/processing/mod.rs
//! Windowing, feature algorithms and the channel drivers built on them

pub mod features;
pub mod filters;
pub mod pipeline;
pub mod windowing;

pub use features::{Feature, FeatureOutput, FeatureValues, ForceFeature};
pub use pipeline::*;
pub use windowing::*;
