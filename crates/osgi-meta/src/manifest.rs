//! Structured bundle manifests.
//!
//! A [`BundleManifest`] is the already-parsed view of a bundle's
//! `META-INF/MANIFEST.MF` headers. Reading manifest text is done by an
//! external parser; this type only carries the result and answers the
//! questions the resolver asks about it.
//!
//! Manifests can also be written as TOML, which is how project
//! descriptions and test fixtures embed them:
//!
//! ```toml
//! symbolic-name = "org.example.app"
//! version = "1.0.0"
//! imports = ["org.osgi.framework"]
//! required-bundles = ['org.example.core;bundle-version="[1.0,2.0)"']
//! exported-packages = ["org.example.app.api"]
//! bundle-class-path = [".", "lib/commons-io.jar"]
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::requirement::BundleRequirement;
use crate::version::Version;

fn default_version() -> String {
    "0.0.0".to_string()
}

/// The headers of a single bundle relevant to dependency resolution.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct BundleManifest {
    /// `Bundle-SymbolicName`; `None` means the jar or module is not a bundle.
    #[serde(default)]
    pub symbolic_name: Option<String>,
    /// `Bundle-Version` as written.
    #[serde(default = "default_version")]
    pub version: String,
    /// Package names from `Import-Package`.
    #[serde(default)]
    pub imports: Vec<String>,
    /// Items of `Require-Bundle`.
    #[serde(default)]
    pub required_bundles: Vec<String>,
    /// The `Require-Bundle` items marked `visibility:=reexport`.
    #[serde(default)]
    pub re_exported_bundles: Vec<String>,
    /// Package names from `Export-Package`.
    #[serde(default)]
    pub exported_packages: BTreeSet<String>,
    /// `Fragment-Host`, present only on fragment bundles.
    #[serde(default)]
    pub fragment_host: Option<String>,
    /// Entries of `Bundle-ClassPath`.
    #[serde(default)]
    pub bundle_class_path: Vec<String>,
}

impl Default for BundleManifest {
    fn default() -> Self {
        Self {
            symbolic_name: None,
            version: default_version(),
            imports: Vec::new(),
            required_bundles: Vec::new(),
            re_exported_bundles: Vec::new(),
            exported_packages: BTreeSet::new(),
            fragment_host: None,
            bundle_class_path: Vec::new(),
        }
    }
}

impl BundleManifest {
    /// Create a manifest for a bundle with the given name and version.
    pub fn new(symbolic_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            symbolic_name: Some(symbolic_name.into()),
            version: version.into(),
            ..Self::default()
        }
    }

    /// Parse a manifest from its TOML representation.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Add an `Import-Package` entry.
    pub fn importing(mut self, package: impl Into<String>) -> Self {
        self.imports.push(package.into());
        self
    }

    /// Add an `Export-Package` entry.
    pub fn exporting(mut self, package: impl Into<String>) -> Self {
        self.exported_packages.insert(package.into());
        self
    }

    /// Add a `Require-Bundle` entry.
    pub fn requiring(mut self, specifier: impl Into<String>) -> Self {
        self.required_bundles.push(specifier.into());
        self
    }

    /// Add a `Require-Bundle` entry with `visibility:=reexport`.
    pub fn re_exporting(mut self, specifier: impl Into<String>) -> Self {
        let specifier = specifier.into();
        self.required_bundles.push(specifier.clone());
        self.re_exported_bundles.push(specifier);
        self
    }

    /// Turn this manifest into a fragment of `host_specifier`.
    pub fn fragment_of(mut self, host_specifier: impl Into<String>) -> Self {
        self.fragment_host = Some(host_specifier.into());
        self
    }

    /// Add a `Bundle-ClassPath` entry.
    pub fn with_class_path(mut self, entry: impl Into<String>) -> Self {
        self.bundle_class_path.push(entry.into());
        self
    }

    /// Wrap in an [`Arc`] for sharing between holders and the index.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// The symbolic name without directives such as `;singleton:=true`.
    pub fn symbolic_name(&self) -> Option<&str> {
        self.symbolic_name
            .as_deref()
            .map(|name| name.split(';').next().unwrap_or_default().trim())
            .filter(|name| !name.is_empty())
    }

    /// Whether this manifest describes a bundle at all.
    pub fn is_bundle(&self) -> bool {
        self.symbolic_name().is_some()
    }

    pub fn is_fragment_bundle(&self) -> bool {
        self.fragment_host.is_some()
    }

    /// `Bundle-Version`, with malformed values ranking as `0.0.0`.
    pub fn parsed_version(&self) -> Version {
        Version::parse_lenient(&self.version)
    }

    /// The parsed `Fragment-Host`, if present and well formed.
    pub fn fragment_host_requirement(&self) -> Option<BundleRequirement> {
        let host = self.fragment_host.as_deref()?;
        match BundleRequirement::parse(host) {
            Ok(requirement) => Some(requirement),
            Err(e) => {
                tracing::debug!(bundle = ?self.symbolic_name(), "ignoring Fragment-Host: {e}");
                None
            }
        }
    }

    /// Whether this bundle re-exports `other` via `Require-Bundle`.
    ///
    /// Only direct re-exports count; re-exports of re-exports are the
    /// resolver's business.
    pub fn reexports_bundle(&self, other: &BundleManifest) -> bool {
        self.re_exported_bundles.iter().any(|specifier| {
            BundleRequirement::parse(specifier).is_ok_and(|req| req.matches_manifest(other))
        })
    }

    /// Whether `fragment` declares this bundle as its host.
    pub fn is_fragment_host_for(&self, fragment: &BundleManifest) -> bool {
        fragment
            .fragment_host_requirement()
            .is_some_and(|host| host.matches_manifest(self))
    }
}
