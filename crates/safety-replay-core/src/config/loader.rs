//! Configuration loading and management

use crate::config::env_loader::load_overrides_from_env;
use crate::config::file_loader::load_from_file;
use crate::config::model::{ConfigOverrides, ReplayConfig};
use crate::error::ReplayResult;
use std::path::{Path, PathBuf};

/// Source of configuration data
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Configuration from a file, replacing everything loaded before it
    File(PathBuf),
    /// Overrides from `REPLAY_*` environment variables
    Environment,
    /// Overrides from command line arguments
    CommandLine(ConfigOverrides),
    /// Default configuration
    Default,
}

/// Configuration loader with support for multiple sources
///
/// Sources are applied in the order they were added, later ones winning.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    sources: Vec<ConfigSource>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Add a configuration source
    pub fn add_source(mut self, source: ConfigSource) -> Self {
        self.sources.push(source);
        self
    }

    /// Add a file source
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Self {
        self.add_source(ConfigSource::File(path.as_ref().to_path_buf()))
    }

    /// Add environment variables source
    pub fn with_env(self) -> Self {
        self.add_source(ConfigSource::Environment)
    }

    /// Add command line overrides
    pub fn with_args(self, overrides: ConfigOverrides) -> Self {
        self.add_source(ConfigSource::CommandLine(overrides))
    }

    /// Add default configuration source
    pub fn with_defaults(self) -> Self {
        self.add_source(ConfigSource::Default)
    }

    /// Load configuration from all sources and validate the result
    pub fn load(self) -> ReplayResult<ReplayConfig> {
        let mut config = ReplayConfig::default();

        for source in self.sources {
            match source {
                ConfigSource::Default => config = ReplayConfig::default(),
                ConfigSource::File(path) => {
                    tracing::debug!("Loading config file {}", path.display());
                    config = load_from_file(&path)?;
                }
                ConfigSource::Environment => config.apply(load_overrides_from_env()?),
                ConfigSource::CommandLine(overrides) => config.apply(overrides),
            }
        }

        config.validate()?;
        tracing::debug!(
            "Loaded config: base_url={}, data_dir={}, cases={}",
            config.base_url,
            config.data_dir.display(),
            config.cases.len()
        );
        Ok(config)
    }
}
