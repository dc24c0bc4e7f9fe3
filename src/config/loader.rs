// src/config/loader.rs
//! Feature-set loader: TOML files layered with environment overrides

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::{constants::paths, FeatureSetConfig};
use crate::error::EmgError;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A listed file does not exist
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Malformed TOML, unknown feature or mistyped parameter
    #[error("Configuration parse error: {0}")]
    ParseError(String),

    /// Well-formed request rejected against its windowing
    #[error("Configuration validation error: {0}")]
    ValidationError(#[from] EmgError),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Loads a [`FeatureSetConfig`] from one or more TOML files; later files
/// override earlier ones and `EMG_FEATURES_*` variables override both
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Loader without files; only defaults and the environment apply
    pub fn new() -> Self {
        Self {
            config_paths: Vec::new(),
            env_prefix: Some(paths::ENV_PREFIX.to_string()),
        }
    }

    /// Create loader with custom paths
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths: paths,
            ..Self::new()
        }
    }

    /// Ignore environment overrides
    pub fn without_environment(mut self) -> Self {
        self.env_prefix = None;
        self
    }

    /// Load, merge and validate the configured sources
    pub fn load(&self) -> Result<FeatureSetConfig, ConfigError> {
        let mut builder = config::Config::builder();

        for path in &self.config_paths {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.display().to_string()));
            }
            debug!(path = %path.display(), "adding configuration file");
            builder = builder.add_source(config::File::new(
                &path.to_string_lossy(),
                config::FileFormat::Toml,
            ));
        }

        if let Some(prefix) = &self.env_prefix {
            builder = builder.add_source(
                config::Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator(paths::ENV_SEPARATOR)
                    .try_parsing(true),
            );
        }

        let config: FeatureSetConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        info!(
            features = config.features.len(),
            force_features = config.force_features.len(),
            window = config.windowing.window,
            step = config.windowing.step,
            "feature set loaded"
        );

        Ok(config)
    }

    /// Parse and validate a feature set held in memory
    pub fn from_toml_str(content: &str) -> Result<FeatureSetConfig, ConfigError> {
        let config: FeatureSetConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
