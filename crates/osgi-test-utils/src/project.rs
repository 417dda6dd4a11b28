//! In-memory project fixtures.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use osgi_index::{
    BoundObject, BundleEvent, BundleFacet, BundleManager, HolderRegistry, IndexConfig, Library,
    LibraryRoot, Module, Project,
};
use osgi_meta::BundleManifest;

/// A project plus the holder registry its managers share.
///
/// # Example
///
/// ```rust
/// use osgi_test_utils::{ProjectFixture, manifests};
///
/// let fixture = ProjectFixture::new("demo");
/// fixture.bundle(manifests::exporter("core", "1.0.0", &["core.api"]));
/// let app = fixture.bundle(manifests::importer("app", &["core.api"]));
///
/// let manager = fixture.indexed_manager();
/// assert_eq!(manager.resolve_dependencies_of(&app).len(), 1);
/// ```
pub struct ProjectFixture {
    project: Arc<Project>,
    registry: Arc<HolderRegistry>,
}

impl ProjectFixture {
    pub fn new(name: &str) -> Self {
        Self {
            project: Project::new(name),
            registry: Arc::new(HolderRegistry::new()),
        }
    }

    pub fn project(&self) -> &Arc<Project> {
        &self.project
    }

    pub fn registry(&self) -> &Arc<HolderRegistry> {
        &self.registry
    }

    /// Add a bundle module named after the manifest's symbolic name.
    pub fn bundle(&self, manifest: BundleManifest) -> Arc<Module> {
        let name = manifest
            .symbolic_name()
            .unwrap_or("unnamed")
            .to_string();
        self.module(&name, manifest)
    }

    /// Add a bundle module with an explicit module name.
    pub fn module(&self, name: &str, manifest: BundleManifest) -> Arc<Module> {
        self.project
            .add_bundle_module(name, BundleFacet::new(manifest))
    }

    /// Add a bundle module whose manifest is maintained by hand.
    pub fn edited_module(&self, name: &str, manifest: BundleManifest) -> Arc<Module> {
        self.project
            .add_bundle_module(name, BundleFacet::new(manifest).manually_edited())
    }

    /// Add a module without bundle facet.
    pub fn plain_module(&self, name: &str) -> Arc<Module> {
        self.project.add_module(name)
    }

    pub fn library(&self, name: &str, roots: Vec<LibraryRoot>) -> Arc<Library> {
        self.project.add_library(name, roots)
    }

    /// Add a library holding one plain jar at `url`.
    pub fn jar_library(&self, name: &str, url: &str) -> Arc<Library> {
        self.library(name, vec![LibraryRoot::jar(url)])
    }

    /// Add a library holding one bundle jar.
    pub fn bundle_library(&self, name: &str, url: &str, manifest: BundleManifest) -> Arc<Library> {
        self.library(name, vec![LibraryRoot::bundle(url, manifest)])
    }

    /// A manager with the default configuration and an empty index.
    pub fn manager(&self) -> BundleManager {
        self.manager_with(IndexConfig::default())
    }

    pub fn manager_with(&self, config: IndexConfig) -> BundleManager {
        BundleManager::with_config(
            Arc::clone(&self.project),
            Arc::clone(&self.registry) as Arc<dyn osgi_index::ManifestHolderRegistry>,
            config,
        )
    }

    /// A manager that has already run a full reindex.
    pub fn indexed_manager(&self) -> BundleManager {
        let mut manager = self.manager();
        manager.reindex_all();
        manager
    }
}

/// Names of resolved entities, sorted for stable assertions.
pub fn sorted_names(objects: &HashSet<BoundObject>) -> Vec<String> {
    let mut names: Vec<String> = objects.iter().map(|o| o.name().to_string()).collect();
    names.sort();
    names
}

/// Collects the events a manager publishes.
#[derive(Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<BundleEvent>>>,
}

impl EventRecorder {
    /// Subscribe a new recorder to `manager`.
    pub fn attach(manager: &BundleManager) -> Self {
        let recorder = Self::default();
        let events = Arc::clone(&recorder.events);
        manager.subscribe(move |event: BundleEvent| events.lock().unwrap().push(event));
        recorder
    }

    pub fn events(&self) -> Vec<BundleEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, event: BundleEvent) -> usize {
        self.events().iter().filter(|e| **e == event).count()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}
