//! Error types for osgi-meta

/// Result type for osgi-meta operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while interpreting bundle metadata
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A `Bundle-Version` or range endpoint is not a valid OSGi version.
    #[error("invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// A `bundle-version` attribute is not a valid OSGi version range.
    #[error("invalid version range '{range}': {reason}")]
    InvalidVersionRange { range: String, reason: String },

    /// A `Require-Bundle` or `Fragment-Host` item could not be parsed.
    #[error("invalid bundle specifier '{specifier}': {reason}")]
    InvalidRequirement { specifier: String, reason: String },

    /// Failed to deserialize a structured manifest.
    #[error("failed to parse bundle manifest: {0}")]
    ManifestParse(#[from] toml::de::Error),
}
