//! Export configuration options

use serde::{Deserialize, Serialize};

/// Label and annotation prefixes owned by tooling rather than by users
const DEFAULT_CLEAN_PREFIXES: &[&str] = &["kubectl.kubernetes.io/", "apply.acorn.io/"];

/// Configuration for manifest export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Label and annotation keys starting with any of these are dropped
    #[serde(default = "default_clean_prefixes")]
    pub clean_prefixes: Vec<String>,

    /// Drop `status` from exported objects (default: true)
    #[serde(default = "default_true")]
    pub drop_status: bool,
}

fn default_clean_prefixes() -> Vec<String> {
    DEFAULT_CLEAN_PREFIXES.iter().map(|p| p.to_string()).collect()
}

fn default_true() -> bool {
    true
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            clean_prefixes: default_clean_prefixes(),
            drop_status: true,
        }
    }
}

impl ExportConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a prefix to clean
    pub fn clean_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.clean_prefixes.push(prefix.into());
        self
    }

    /// Keep `status` in exported objects
    pub fn keep_status(mut self) -> Self {
        self.drop_status = false;
        self
    }

    /// Whether a label or annotation key is owned by tooling
    pub fn is_cleaned(&self, key: &str) -> bool {
        self.clean_prefixes
            .iter()
            .any(|prefix| key.starts_with(prefix.as_str()))
    }
}
