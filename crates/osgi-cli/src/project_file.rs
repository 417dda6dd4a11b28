//! Project description files.
//!
//! The CLI has no IDE project model to ask, so modules and libraries are
//! described in TOML with their manifests already parsed:
//!
//! ```toml
//! name = "demo"
//!
//! [[modules]]
//! name = "app"
//! manually-edited = true
//! [modules.manifest]
//! symbolic-name = "org.example.app"
//! imports = ["org.example.api"]
//!
//! [[libraries]]
//! name = "felix"
//! [[libraries.roots]]
//! url = "jar:///libs/felix.jar!/"
//! [libraries.roots.manifest]
//! symbolic-name = "org.apache.felix.framework"
//! version = "7.0.5"
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use osgi_index::{BundleFacet, LibraryRoot, Project};
use osgi_meta::BundleManifest;
use serde::Deserialize;

use crate::error::{CliError, Result};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProjectFile {
    pub name: String,
    #[serde(default)]
    pub modules: Vec<ModuleEntry>,
    #[serde(default)]
    pub libraries: Vec<LibraryEntry>,
}

/// A module; without `manifest` it has no bundle facet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ModuleEntry {
    pub name: String,
    #[serde(default)]
    pub manifest: Option<BundleManifest>,
    #[serde(default)]
    pub manually_edited: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct LibraryEntry {
    pub name: String,
    #[serde(default)]
    pub roots: Vec<RootEntry>,
}

/// A library class root; `manifest` is set for bundle jars.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RootEntry {
    pub url: String,
    #[serde(default)]
    pub manifest: Option<BundleManifest>,
}

impl ProjectFile {
    pub fn parse(content: &str) -> Result<Self> {
        let file: Self = toml::from_str(content).map_err(|e| CliError::user(e.to_string()))?;
        file.validate()?;
        Ok(file)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CliError::user(format!(
                "project file not found: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| {
            CliError::user(format!("invalid project file {}: {e}", path.display()))
        })
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for module in &self.modules {
            if !seen.insert(module.name.as_str()) {
                return Err(CliError::user(format!(
                    "duplicate module name '{}'",
                    module.name
                )));
            }
        }
        Ok(())
    }

    /// Build the in-memory project model.
    pub fn build(&self) -> Arc<Project> {
        let project = Project::new(self.name.as_str());
        for module in &self.modules {
            match &module.manifest {
                Some(manifest) => {
                    let mut facet = BundleFacet::new(manifest.clone());
                    facet.manually_edited = module.manually_edited;
                    project.add_bundle_module(module.name.as_str(), facet);
                }
                None => {
                    project.add_module(module.name.as_str());
                }
            }
        }
        for library in &self.libraries {
            let roots = library
                .roots
                .iter()
                .map(|root| match &root.manifest {
                    Some(manifest) => LibraryRoot::bundle(root.url.as_str(), manifest.clone()),
                    None => LibraryRoot::jar(root.url.as_str()),
                })
                .collect();
            project.add_library(library.name.as_str(), roots);
        }
        tracing::debug!(
            project = %self.name,
            modules = self.modules.len(),
            libraries = self.libraries.len(),
            "project model built"
        );
        project
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DEMO: &str = r#"
name = "demo"

[[modules]]
name = "app"
manually-edited = true
[modules.manifest]
symbolic-name = "org.example.app"
imports = ["org.example.api"]

[[modules]]
name = "docs"

[[libraries]]
name = "felix"
[[libraries.roots]]
url = "jar:///libs/readme.jar!/"
[[libraries.roots]]
url = "jar:///libs/felix.jar!/"
[libraries.roots.manifest]
symbolic-name = "org.apache.felix.framework"
version = "7.0.5"
"#;

    #[test]
    fn test_parse_and_build() {
        let file = ProjectFile::parse(DEMO).unwrap();
        assert_eq!(file.name, "demo");
        assert_eq!(file.modules.len(), 2);
        assert!(file.modules[0].manually_edited);
        assert!(file.modules[1].manifest.is_none());

        let project = file.build();
        let app = project.find_module("app").unwrap();
        assert!(app.facet().unwrap().manually_edited);
        assert!(!project.find_module("docs").unwrap().has_bundle_facet());

        let felix = &project.libraries()[0];
        assert_eq!(felix.root_count(), 2);
        assert!(felix.manifest_at(0).is_none());
        assert_eq!(
            felix.manifest_at(1).unwrap().symbolic_name(),
            Some("org.apache.felix.framework")
        );
    }

    #[test]
    fn test_duplicate_module_rejected() {
        let content = "name = \"p\"\n[[modules]]\nname = \"a\"\n[[modules]]\nname = \"a\"\n";
        let err = ProjectFile::parse(content).unwrap_err();
        assert!(err.to_string().contains("duplicate module name 'a'"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(ProjectFile::parse("name = \"p\"\nversion = 2\n").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = ProjectFile::load(Path::new("/nonexistent/osgi-project.toml")).unwrap_err();
        assert!(err.to_string().contains("project file not found"));
    }
}
