// src/table/mod.rs
//! Tabular inputs and outputs of the feature engine
//!
//! A [`Recording`] is the read-only input: named sample columns over one
//! strictly increasing index. A [`FeatureTable`] is the output: feature
//! columns keyed by the index key of each window's last sample, outer-joined
//! across channels and features.

pub mod feature_table;
pub mod recording;

pub use feature_table::{FeatureColumn, FeatureTable};
pub use recording::{Channel, ChannelFamily, Recording};
