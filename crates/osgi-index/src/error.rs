//! Error types for osgi-index

use std::path::PathBuf;

use crate::holder::HolderKey;

/// Result type for osgi-index operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in osgi-index operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The module or library behind a manifest holder has been removed.
    ///
    /// Always recoverable: callers drop the holder from their results.
    #[error("manifest holder {key} is disposed")]
    HolderDisposed { key: HolderKey },

    /// Configuration file not found at expected path
    #[error("configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration file could not be interpreted
    #[error("invalid configuration at {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    /// Bundle metadata error from osgi-meta
    #[error(transparent)]
    Meta(#[from] osgi_meta::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}
