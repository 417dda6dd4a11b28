//! Index configuration.
//!
//! Loaded from a TOML file such as:
//!
//! ```toml
//! [sync]
//! strategy = "manual"
//!
//! [logging]
//! filter = "info"
//!
//! [index]
//! libraries = true
//! ```
//!
//! Every section and key is optional; unknown keys are rejected.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How the project reacts when a hand-edited bundle manifest changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestSyncStrategy {
    /// Ignore manifest changes.
    Never,
    /// Reindex and flag that dependencies need a user-triggered resync.
    #[default]
    Manual,
    /// Reindex and request a resync right away.
    Automatic,
}

impl fmt::Display for ManifestSyncStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Never => write!(f, "never"),
            Self::Manual => write!(f, "manual"),
            Self::Automatic => write!(f, "automatic"),
        }
    }
}

/// Manifest synchronization settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    #[serde(default)]
    pub strategy: ManifestSyncStrategy,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`.
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

/// What a full reindex covers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexSection {
    /// Whether project-level libraries are indexed.
    #[serde(default = "default_true")]
    pub libraries: bool,
}

fn default_true() -> bool {
    true
}

impl Default for IndexSection {
    fn default() -> Self {
        Self { libraries: true }
    }
}

/// Top-level configuration of the bundle index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexConfig {
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub index: IndexSection,
}

impl IndexConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// [`Error::ConfigNotFound`] if the file does not exist,
    /// [`Error::InvalidConfig`] if it cannot be parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| Error::InvalidConfig {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load configuration, or the defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn with_strategy(mut self, strategy: ManifestSyncStrategy) -> Self {
        self.sync.strategy = strategy;
        self
    }
}
