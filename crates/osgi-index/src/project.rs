//! Project model adapter.
//!
//! The bundle index does not own modules or libraries; the host project
//! model does. This module is the in-process view of that model: a
//! [`Project`] holding [`Module`]s and project-level [`Library`]s, each
//! with a disposal flag that flips when the entity is removed.
//!
//! Resolver results refer back to these entities through [`BoundObject`],
//! a tagged variant over the two kinds.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use osgi_meta::BundleManifest;

static NEXT_PROJECT_ID: AtomicU64 = AtomicU64::new(1);
/// Shared by modules and libraries of every project, so an id never
/// names entities of two projects.
static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies a project instance within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProjectId(u64);

/// Identifies a module within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId(u64);

/// Identifies a project-level library within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LibraryId(u64);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "project#{}", self.0)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module#{}", self.0)
    }
}

impl fmt::Display for LibraryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "library#{}", self.0)
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// OSGi configuration attached to a module.
#[derive(Debug, Clone)]
pub struct BundleFacet {
    /// The module's manifest, as last produced by the manifest parser.
    pub manifest: Arc<BundleManifest>,
    /// Whether the manifest is maintained by hand rather than generated.
    pub manually_edited: bool,
}

impl BundleFacet {
    pub fn new(manifest: impl Into<Arc<BundleManifest>>) -> Self {
        Self {
            manifest: manifest.into(),
            manually_edited: false,
        }
    }

    pub fn manually_edited(mut self) -> Self {
        self.manually_edited = true;
        self
    }
}

/// A project module.
#[derive(Debug)]
pub struct Module {
    id: ModuleId,
    project: ProjectId,
    name: String,
    facet: RwLock<Option<BundleFacet>>,
    disposed: AtomicBool,
}

impl Module {
    pub fn id(&self) -> ModuleId {
        self.id
    }

    pub fn project_id(&self) -> ProjectId {
        self.project
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    pub fn facet(&self) -> Option<BundleFacet> {
        read(&self.facet).clone()
    }

    pub fn has_bundle_facet(&self) -> bool {
        read(&self.facet).is_some()
    }

    /// Attach, replace or (with `None`) remove the bundle facet.
    pub fn set_facet(&self, facet: Option<BundleFacet>) {
        *write(&self.facet) = facet;
    }

    /// The manifest of the bundle facet, if any.
    pub fn bundle_manifest(&self) -> Option<Arc<BundleManifest>> {
        read(&self.facet).as_ref().map(|f| Arc::clone(&f.manifest))
    }

    fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
    }
}

/// One class root of a library, typically a jar.
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryRoot {
    /// Class root URL, e.g. `jar:///libs/felix.jar!/`.
    pub url: String,
    /// The jar's bundle manifest, if the jar has one.
    pub manifest: Option<Arc<BundleManifest>>,
}

impl LibraryRoot {
    /// A plain jar without bundle metadata.
    pub fn jar(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            manifest: None,
        }
    }

    /// A jar carrying a bundle manifest.
    pub fn bundle(url: impl Into<String>, manifest: impl Into<Arc<BundleManifest>>) -> Self {
        Self {
            url: url.into(),
            manifest: Some(manifest.into()),
        }
    }
}

/// A project-level library.
#[derive(Debug)]
pub struct Library {
    id: LibraryId,
    project: ProjectId,
    name: String,
    roots: RwLock<Vec<LibraryRoot>>,
    disposed: AtomicBool,
}

impl Library {
    pub fn id(&self) -> LibraryId {
        self.id
    }

    pub fn project_id(&self) -> ProjectId {
        self.project
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    pub fn roots(&self) -> Vec<LibraryRoot> {
        read(&self.roots).clone()
    }

    pub fn root_count(&self) -> usize {
        read(&self.roots).len()
    }

    /// The manifest of the root at `index`, if that root exists and is a bundle.
    pub fn manifest_at(&self, index: usize) -> Option<Arc<BundleManifest>> {
        read(&self.roots)
            .get(index)
            .and_then(|root| root.manifest.clone())
    }

    /// The class root URLs, in order.
    pub fn class_urls(&self) -> Vec<String> {
        read(&self.roots).iter().map(|r| r.url.clone()).collect()
    }

    pub fn set_roots(&self, roots: Vec<LibraryRoot>) {
        *write(&self.roots) = roots;
    }

    fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
    }
}

/// Identity of a module or library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectKey {
    Module(ModuleId),
    Library(LibraryId),
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module(id) => write!(f, "{id}"),
            Self::Library(id) => write!(f, "{id}"),
        }
    }
}

impl From<&Module> for ObjectKey {
    fn from(module: &Module) -> Self {
        Self::Module(module.id())
    }
}

impl From<&Arc<Module>> for ObjectKey {
    fn from(module: &Arc<Module>) -> Self {
        Self::Module(module.id())
    }
}

impl From<&Library> for ObjectKey {
    fn from(library: &Library) -> Self {
        Self::Library(library.id())
    }
}

impl From<&Arc<Library>> for ObjectKey {
    fn from(library: &Arc<Library>) -> Self {
        Self::Library(library.id())
    }
}

impl From<&BoundObject> for ObjectKey {
    fn from(object: &BoundObject) -> Self {
        object.key()
    }
}

/// The entity a manifest belongs to.
///
/// Equality and hashing go by identity ([`ObjectKey`]), not by content.
#[derive(Debug, Clone)]
pub enum BoundObject {
    Module(Arc<Module>),
    Library(Arc<Library>),
}

impl BoundObject {
    pub fn key(&self) -> ObjectKey {
        match self {
            Self::Module(module) => ObjectKey::Module(module.id()),
            Self::Library(library) => ObjectKey::Library(library.id()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Module(module) => module.name(),
            Self::Library(library) => library.name(),
        }
    }

    pub fn is_disposed(&self) -> bool {
        match self {
            Self::Module(module) => module.is_disposed(),
            Self::Library(library) => library.is_disposed(),
        }
    }

    pub fn as_module(&self) -> Option<&Arc<Module>> {
        match self {
            Self::Module(module) => Some(module),
            Self::Library(_) => None,
        }
    }

    pub fn as_library(&self) -> Option<&Arc<Library>> {
        match self {
            Self::Library(library) => Some(library),
            Self::Module(_) => None,
        }
    }
}

impl PartialEq for BoundObject {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for BoundObject {}

impl Hash for BoundObject {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// A project: the set of modules and project-level libraries that are
/// indexed together.
#[derive(Debug)]
pub struct Project {
    id: ProjectId,
    name: String,
    modules: RwLock<Vec<Arc<Module>>>,
    libraries: RwLock<Vec<Arc<Library>>>,
    disposed: AtomicBool,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: ProjectId(NEXT_PROJECT_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
            modules: RwLock::new(Vec::new()),
            libraries: RwLock::new(Vec::new()),
            disposed: AtomicBool::new(false),
        })
    }

    pub fn id(&self) -> ProjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Add a module without bundle facet.
    pub fn add_module(&self, name: impl Into<String>) -> Arc<Module> {
        let module = Arc::new(Module {
            id: ModuleId(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed)),
            project: self.id,
            name: name.into(),
            facet: RwLock::new(None),
            disposed: AtomicBool::new(false),
        });
        write(&self.modules).push(Arc::clone(&module));
        module
    }

    /// Add a module carrying a bundle facet.
    pub fn add_bundle_module(&self, name: impl Into<String>, facet: BundleFacet) -> Arc<Module> {
        let module = self.add_module(name);
        module.set_facet(Some(facet));
        module
    }

    pub fn add_library(&self, name: impl Into<String>, roots: Vec<LibraryRoot>) -> Arc<Library> {
        let library = Arc::new(Library {
            id: LibraryId(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed)),
            project: self.id,
            name: name.into(),
            roots: RwLock::new(roots),
            disposed: AtomicBool::new(false),
        });
        write(&self.libraries).push(Arc::clone(&library));
        library
    }

    /// Snapshot of the live modules.
    pub fn modules(&self) -> Vec<Arc<Module>> {
        read(&self.modules).clone()
    }

    /// Snapshot of the live project-level libraries.
    pub fn libraries(&self) -> Vec<Arc<Library>> {
        read(&self.libraries).clone()
    }

    pub fn module(&self, id: ModuleId) -> Option<Arc<Module>> {
        read(&self.modules).iter().find(|m| m.id() == id).cloned()
    }

    pub fn find_module(&self, name: &str) -> Option<Arc<Module>> {
        read(&self.modules).iter().find(|m| m.name() == name).cloned()
    }

    pub fn library(&self, id: LibraryId) -> Option<Arc<Library>> {
        read(&self.libraries).iter().find(|l| l.id() == id).cloned()
    }

    /// Remove a module from the project and mark it disposed.
    pub fn remove_module(&self, id: ModuleId) -> Option<Arc<Module>> {
        let mut modules = write(&self.modules);
        let pos = modules.iter().position(|m| m.id() == id)?;
        let module = modules.remove(pos);
        module.dispose();
        Some(module)
    }

    /// Remove a library from the project and mark it disposed.
    pub fn remove_library(&self, id: LibraryId) -> Option<Arc<Library>> {
        let mut libraries = write(&self.libraries);
        let pos = libraries.iter().position(|l| l.id() == id)?;
        let library = libraries.remove(pos);
        library.dispose();
        Some(library)
    }

    /// Close the project; every module and library becomes disposed.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
        for module in write(&self.modules).drain(..) {
            module.dispose();
        }
        for library in write(&self.libraries).drain(..) {
            library.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique_within_project() {
        let project = Project::new("p");
        let a = project.add_module("a");
        let b = project.add_module("b");
        let lib = project.add_library("lib", vec![]);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.project_id(), project.id());
        assert_eq!(lib.project_id(), project.id());
    }

    #[test]
    fn test_projects_get_distinct_ids() {
        assert_ne!(Project::new("a").id(), Project::new("b").id());
    }

    #[test]
    fn test_entity_ids_are_unique_across_projects() {
        let mine = Project::new("mine");
        let theirs = Project::new("theirs");
        let local = mine.add_module("app");
        let foreign = theirs.add_module("app");

        assert_ne!(local.id(), foreign.id());
        assert_ne!(ObjectKey::from(&local), ObjectKey::from(&foreign));
    }

    #[test]
    fn test_remove_module_disposes_it() {
        let project = Project::new("p");
        let module = project.add_module("a");
        let removed = project.remove_module(module.id()).unwrap();
        assert!(removed.is_disposed());
        assert!(module.is_disposed());
        assert!(project.modules().is_empty());
        assert!(project.remove_module(module.id()).is_none());
    }

    #[test]
    fn test_dispose_project_disposes_everything() {
        let project = Project::new("p");
        let module = project.add_module("a");
        let library = project.add_library("lib", vec![LibraryRoot::jar("file:///a.jar")]);
        project.dispose();
        assert!(project.is_disposed());
        assert!(module.is_disposed());
        assert!(library.is_disposed());
    }

    #[test]
    fn test_facet_roundtrip() {
        let project = Project::new("p");
        let module = project.add_module("a");
        assert!(!module.has_bundle_facet());
        module.set_facet(Some(BundleFacet::new(BundleManifest::new("a", "1.0"))));
        assert!(module.has_bundle_facet());
        assert_eq!(
            module.bundle_manifest().unwrap().symbolic_name(),
            Some("a")
        );
        module.set_facet(None);
        assert!(module.bundle_manifest().is_none());
    }

    #[test]
    fn test_bound_object_identity() {
        let project = Project::new("p");
        let module = project.add_module("a");
        let mut set = HashSet::new();
        set.insert(BoundObject::Module(Arc::clone(&module)));
        set.insert(BoundObject::Module(Arc::clone(&module)));
        assert_eq!(set.len(), 1);
        assert!(set.contains(&BoundObject::Module(module)));
    }

    #[test]
    fn test_library_roots() {
        let project = Project::new("p");
        let library = project.add_library(
            "felix",
            vec![
                LibraryRoot::bundle("jar:///felix.jar!/", BundleManifest::new("org.apache.felix", "7.0")),
                LibraryRoot::jar("jar:///plain.jar!/"),
            ],
        );
        assert_eq!(library.root_count(), 2);
        assert!(library.manifest_at(0).is_some());
        assert!(library.manifest_at(1).is_none());
        assert!(library.manifest_at(5).is_none());
        assert_eq!(library.class_urls(), vec!["jar:///felix.jar!/", "jar:///plain.jar!/"]);
    }
}
