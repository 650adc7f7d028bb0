//! CLI configuration file

use morph_export::ExportConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading the configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Settings read from `--config`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Tracing filter directive, e.g. `morph_mapping=debug`
    pub log_filter: Option<String>,

    /// Extra label and annotation prefixes removed on export
    pub clean_prefixes: Vec<String>,

    /// Keep `status` on exported objects
    pub keep_status: bool,
}

impl CliConfig {
    /// Load a YAML configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Parse configuration from YAML text. An empty document gives the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    /// Export settings: the default prefixes plus the configured ones
    pub fn export_config(&self) -> ExportConfig {
        let config = self
            .clean_prefixes
            .iter()
            .fold(ExportConfig::new(), |config, prefix| {
                config.clean_prefix(prefix.as_str())
            });
        if self.keep_status {
            config.keep_status()
        } else {
            config
        }
    }
}
