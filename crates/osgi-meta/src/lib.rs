//! OSGi bundle metadata for the bundle index.
//!
//! This crate holds the value objects the resolver works on: the structured
//! [`BundleManifest`] produced by an external manifest parser, OSGi
//! [`Version`]s and [`VersionRange`]s, and parsed `Require-Bundle` /
//! `Fragment-Host` specifiers ([`BundleRequirement`]).
//!
//! # Example
//!
//! ```
//! use osgi_meta::{BundleManifest, BundleRequirement, Version};
//!
//! let host = BundleManifest::new("org.example.core", "1.2.0");
//! let requirement = BundleRequirement::parse(
//!     r#"org.example.core;bundle-version="[1.0,2.0)""#,
//! ).unwrap();
//!
//! assert!(requirement.matches("org.example.core", &Version::new(1, 2, 0)));
//! assert!(requirement.matches_manifest(&host));
//! ```

pub mod error;
pub mod manifest;
pub mod requirement;
pub mod version;

pub use error::{Error, Result};
pub use manifest::BundleManifest;
pub use requirement::{BundleRequirement, Resolution, Visibility};
pub use version::{Version, VersionRange};
