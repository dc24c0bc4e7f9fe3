// src/config/mod.rs
//! Feature-set configuration: shared windowing plus the ordered feature requests

pub mod constants;
pub mod loader;
pub mod processing_config;

pub use constants::*;
pub use loader::{ConfigError, ConfigLoader};
pub use processing_config::*;

use serde::{Deserialize, Serialize};

use crate::error::{EmgError, EmgResult};
use crate::processing::features::{Feature, ForceFeature};

/// Complete batch request: one windowing for every feature, EMG features in
/// request order, then force features in request order
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct FeatureSetConfig {
    /// Windowing shared by every request
    #[serde(default)]
    pub windowing: WindowingConfig,

    /// Driver settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// EMG feature requests, `[[feature]]` tables
    #[serde(default, rename = "feature")]
    pub features: Vec<Feature>,

    /// Force feature requests, `[[force_feature]]` tables
    #[serde(default, rename = "force_feature")]
    pub force_features: Vec<ForceFeature>,
}

impl FeatureSetConfig {
    /// Empty request list over `windowing`
    pub fn new(windowing: WindowingConfig) -> Self {
        Self {
            windowing,
            ..Self::default()
        }
    }

    /// Append an EMG feature request
    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.push(feature);
        self
    }

    /// Append a force feature request
    pub fn with_force_feature(mut self, feature: ForceFeature) -> Self {
        self.force_features.push(feature);
        self
    }

    /// Every problem in the request, windowing first
    fn problems(&self) -> Vec<EmgError> {
        if let Err(reason) = validate_windowing_config(&self.windowing) {
            return vec![EmgError::Configuration {
                component: "windowing".to_string(),
                reason,
            }];
        }

        self.features
            .iter()
            .filter_map(|feature| feature.validate(&self.windowing).err())
            .collect()
    }

    /// Collect every problem in the request list instead of stopping at the first
    pub fn validate_consistency(&self) -> Result<(), Vec<String>> {
        let errors: Vec<String> = self.problems().iter().map(ToString::to_string).collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate the whole request before any feature runs
    ///
    /// A single problem is returned as is; several are reported together.
    pub fn validate(&self) -> EmgResult<()> {
        let mut problems = self.problems();
        match problems.len() {
            0 => Ok(()),
            1 => Err(problems.remove(0)),
            _ => Err(EmgError::Configuration {
                component: "feature_set".to_string(),
                reason: problems.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "),
            }),
        }
    }
}
