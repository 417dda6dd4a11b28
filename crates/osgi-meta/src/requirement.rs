//! `Require-Bundle` and `Fragment-Host` specifiers.
//!
//! Both headers name another bundle by symbolic name, optionally narrowed
//! by a `bundle-version` attribute and decorated with directives:
//!
//! ```text
//! org.example.core;bundle-version="[1.0,2.0)";visibility:=reexport
//! ```
//!
//! The manifest parser hands the resolver one such item per string;
//! splitting the header on top-level commas happens before that.

use std::fmt;

use crate::error::{Error, Result};
use crate::manifest::BundleManifest;
use crate::version::{Version, VersionRange};

const BUNDLE_VERSION_ATTRIBUTE: &str = "bundle-version";
const VISIBILITY_DIRECTIVE: &str = "visibility";
const RESOLUTION_DIRECTIVE: &str = "resolution";

/// Whether a required bundle's exports are passed on to dependents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// Exports are visible to the requiring bundle only.
    #[default]
    Private,
    /// `visibility:=reexport`
    Reexport,
}

/// Whether a missing required bundle is acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Resolution {
    #[default]
    Mandatory,
    /// `resolution:=optional`
    Optional,
}

/// A parsed bundle specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRequirement {
    symbolic_name: String,
    version_range: Option<VersionRange>,
    visibility: Visibility,
    resolution: Resolution,
}

impl BundleRequirement {
    /// Parse a single specifier.
    ///
    /// Unknown attributes and directives are ignored. Quoted values may
    /// contain `;` and `,`.
    pub fn parse(specifier: &str) -> Result<Self> {
        let mut clauses = split_clauses(specifier).into_iter();

        let symbolic_name = clauses.next().unwrap_or_default().trim();
        if symbolic_name.is_empty() {
            return Err(Error::InvalidRequirement {
                specifier: specifier.to_string(),
                reason: "missing bundle symbolic name".to_string(),
            });
        }

        let mut requirement = Self {
            symbolic_name: symbolic_name.to_string(),
            version_range: None,
            visibility: Visibility::Private,
            resolution: Resolution::Mandatory,
        };

        for clause in clauses {
            if let Some((key, value)) = clause.split_once(":=") {
                let value = unquote(value);
                match key.trim() {
                    VISIBILITY_DIRECTIVE if value == "reexport" => {
                        requirement.visibility = Visibility::Reexport;
                    }
                    RESOLUTION_DIRECTIVE if value == "optional" => {
                        requirement.resolution = Resolution::Optional;
                    }
                    _ => {}
                }
            } else if let Some((key, value)) = clause.split_once('=') {
                if key.trim() == BUNDLE_VERSION_ATTRIBUTE {
                    let range = VersionRange::parse(unquote(value)).map_err(|e| {
                        Error::InvalidRequirement {
                            specifier: specifier.to_string(),
                            reason: e.to_string(),
                        }
                    })?;
                    requirement.version_range = Some(range);
                }
            }
        }

        Ok(requirement)
    }

    /// Create a requirement on any version of `symbolic_name`.
    pub fn any_version(symbolic_name: impl Into<String>) -> Self {
        Self {
            symbolic_name: symbolic_name.into(),
            version_range: None,
            visibility: Visibility::Private,
            resolution: Resolution::Mandatory,
        }
    }

    pub fn symbolic_name(&self) -> &str {
        &self.symbolic_name
    }

    pub fn version_range(&self) -> Option<&VersionRange> {
        self.version_range.as_ref()
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn is_reexport(&self) -> bool {
        self.visibility == Visibility::Reexport
    }

    pub fn is_optional(&self) -> bool {
        self.resolution == Resolution::Optional
    }

    /// Check whether a bundle with this name and version satisfies the requirement.
    pub fn matches(&self, symbolic_name: &str, version: &Version) -> bool {
        self.symbolic_name == symbolic_name
            && self
                .version_range
                .as_ref()
                .is_none_or(|range| range.includes(version))
    }

    /// Check whether `manifest` satisfies the requirement.
    pub fn matches_manifest(&self, manifest: &BundleManifest) -> bool {
        manifest
            .symbolic_name()
            .is_some_and(|name| self.matches(name, &manifest.parsed_version()))
    }
}

impl fmt::Display for BundleRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbolic_name)?;
        if let Some(range) = &self.version_range {
            write!(f, ";{BUNDLE_VERSION_ATTRIBUTE}=\"{range}\"")?;
        }
        if self.is_reexport() {
            write!(f, ";{VISIBILITY_DIRECTIVE}:=reexport")?;
        }
        if self.is_optional() {
            write!(f, ";{RESOLUTION_DIRECTIVE}:=optional")?;
        }
        Ok(())
    }
}

/// Split on `;` outside of double quotes.
fn split_clauses(input: &str) -> Vec<&str> {
    let mut clauses = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                clauses.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    clauses.push(&input[start..]);
    clauses
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
        .trim()
}
