//! Loading the project and index for a command run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use osgi_index::{BoundObject, BundleManager, HolderRegistry, IndexConfig, ManifestHolder, Module};
use serde::Serialize;

use crate::error::{CliError, Result};
use crate::project_file::ProjectFile;

/// Config file looked up next to the project file when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "osgi-index.toml";

/// Resolve and load the index configuration.
///
/// An explicit `--config` must exist; the implicit one is optional.
pub fn load_config(project: &Path, explicit: Option<&Path>) -> Result<IndexConfig> {
    match explicit {
        Some(path) => Ok(IndexConfig::load(path)?),
        None => Ok(IndexConfig::load_or_default(&default_config_path(project))?),
    }
}

fn default_config_path(project: &Path) -> PathBuf {
    project
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(DEFAULT_CONFIG_FILE)
}

/// An indexed project, ready to answer queries.
pub struct Context {
    pub manager: BundleManager,
    pub json: bool,
}

impl Context {
    pub fn open(project_path: &Path, config: IndexConfig, json: bool) -> Result<Self> {
        let project = ProjectFile::load(project_path)?.build();
        let mut manager = BundleManager::with_config(project, Arc::new(HolderRegistry::new()), config);
        manager.reindex_all();
        Ok(Self { manager, json })
    }

    pub fn find_module(&self, name: &str) -> Result<Arc<Module>> {
        self.manager
            .project()
            .find_module(name)
            .ok_or_else(|| CliError::user(format!("module '{name}' not found in project")))
    }

    /// Describe an entity, including its bundle identity if indexed.
    pub fn summarize(&self, object: &BoundObject) -> EntitySummary {
        let manifest = self
            .manager
            .manifest_by_object(object)
            .filter(|m| m.is_bundle());
        EntitySummary {
            name: object.name().to_string(),
            kind: kind_of(object),
            bundle: manifest
                .as_ref()
                .and_then(|m| m.symbolic_name().map(str::to_string)),
            version: manifest.map(|m| m.version.clone()),
        }
    }

    /// Describe the bundle behind a specific holder.
    pub fn summarize_holder(&self, holder: &ManifestHolder) -> Option<BundleSummary> {
        let owner = holder.bound_object().ok()?;
        let manifest = self.manager.cache().indexed_manifest(holder.key())?;
        let bundle = manifest.symbolic_name()?.to_string();
        Some(BundleSummary {
            bundle,
            version: manifest.version.clone(),
            owner: owner.name().to_string(),
            kind: kind_of(&owner),
            fragment_host: manifest.fragment_host.clone(),
        })
    }

    /// Print `value` as pretty JSON.
    pub fn print_json(&self, value: &impl Serialize) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

fn kind_of(object: &BoundObject) -> &'static str {
    match object {
        BoundObject::Module(_) => "module",
        BoundObject::Library(_) => "library",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct EntitySummary {
    pub kind: &'static str,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct BundleSummary {
    pub bundle: String,
    pub version: String,
    pub owner: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment_host: Option<String>,
}
