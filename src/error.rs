// src/error.rs
//! Unified error handling for feature extraction
//!
//! Every fallible operation in the crate returns [`EmgResult`]. Parameter and
//! lookup problems are reported before any computation starts; numerical
//! failures carry the [`ProcessingStage`] they happened in.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the feature extraction engine
#[derive(Debug, Clone, Error)]
pub enum EmgError {
    /// Feature name not present in the registry
    #[error("[FEATURE] Unknown feature '{name}'")]
    UnknownFeature {
        /// Name as requested
        name: String,
    },

    /// Missing, mistyped or out-of-range feature parameter
    #[error("[PARAM] Invalid parameter '{parameter}' for feature '{feature}': {reason}")]
    InvalidParameter {
        /// Registry name of the feature
        feature: String,
        /// Offending parameter
        parameter: String,
        /// What was wrong with it
        reason: String,
    },

    /// Configuration and setup errors
    #[error("[CONFIG] Configuration error in {component}: {reason}")]
    Configuration {
        /// Configuration section at fault
        component: String,
        /// What was wrong with it
        reason: String,
    },

    /// Signal processing errors
    #[error("[PROCESSING] {stage:?} stage error: {reason} ({operation})")]
    Processing {
        /// Stage that failed
        stage: ProcessingStage,
        /// `component::operation` that raised the error
        operation: String,
        /// Failure description
        reason: String,
    },

    /// Invalid input data errors
    #[error("[DATA] Invalid {data_type}: {reason}")]
    InvalidData {
        /// Kind of input rejected
        data_type: String,
        /// Why it was rejected
        reason: String,
    },

    /// Two results would land in the same output column
    #[error("[TABLE] Column '{0}' already exists")]
    DuplicateColumn(String),
}

/// Processing stages for error tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingStage {
    /// Autoregressive least-squares fit
    Regression,
    /// Low-pass filtering ahead of the filtered maximum
    Filtering,
    /// Box-counting dimension fit
    Fractal,
}

/// Result type alias for feature operations
pub type EmgResult<T> = Result<T, EmgError>;

impl EmgError {
    /// Shorthand for [`EmgError::InvalidParameter`]
    pub fn invalid_parameter(feature: &str, parameter: &str, reason: impl Into<String>) -> Self {
        EmgError::InvalidParameter {
            feature: feature.to_string(),
            parameter: parameter.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors raised before any signal was touched
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            EmgError::UnknownFeature { .. }
                | EmgError::InvalidParameter { .. }
                | EmgError::Configuration { .. }
        )
    }
}

/// Error builder for convenient error construction
pub struct EmgErrorBuilder {
    component: String,
    operation: String,
}

impl EmgErrorBuilder {
    /// Builder tagging errors with `component::operation`
    pub fn new(component: &str, operation: &str) -> Self {
        Self {
            component: component.to_string(),
            operation: operation.to_string(),
        }
    }

    /// Numerical failure in `stage`
    pub fn processing(self, stage: ProcessingStage, reason: &str) -> EmgError {
        EmgError::Processing {
            stage,
            operation: format!("{}::{}", self.component, self.operation),
            reason: reason.to_string(),
        }
    }

    /// Rejected input data
    pub fn invalid_data(self, data_type: &str, reason: &str) -> EmgError {
        EmgError::InvalidData {
            data_type: data_type.to_string(),
            reason: format!("{} ({}::{})", reason, self.component, self.operation),
        }
    }
}
