//! The bundle dependency resolver.
//!
//! [`BundleManager`] keeps a [`BundleCache`] in sync with a [`Project`]
//! and computes, for a module, the set of modules and libraries it
//! depends on under OSGi rules:
//!
//! - `Import-Package`: every bundle exporting an imported package;
//! - `Require-Bundle`: the best matching bundle, plus whatever it (or the
//!   newest version of each of its fragments) re-exports, transitively;
//! - `Fragment-Host`: the hosts a fragment attaches to;
//! - `Bundle-ClassPath`: project libraries containing an embedded jar.
//!
//! Missing dependencies are not errors. Resolution returns what it can
//! find; [`BundleManager::unresolved`] reports what it could not.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, LazyLock};

use osgi_meta::{BundleManifest, BundleRequirement};
use regex::Regex;
use serde::Serialize;

use crate::cache::BundleCache;
use crate::config::{IndexConfig, ManifestSyncStrategy};
use crate::events::{BundleEvent, BundleListener, EventBus, SubscriptionId};
use crate::holder::{HolderKey, ManifestHolder, ManifestHolderRegistry};
use crate::project::{BoundObject, Library, Module, ObjectKey, Project};

/// Finds the jar file name in a `Bundle-ClassPath` entry.
static JAR_PATH_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*/)?([^/]+\.jar)$").expect("Invalid jar path regex")
});

/// Separator between a jar URL and the path inside it.
const JAR_ROOT_SEPARATOR: &str = "!/";

/// Whether a reindex is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReindexState {
    #[default]
    Idle,
    Reindexing,
}

/// Result of a full reindex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReindexOutcome {
    Unchanged,
    Changed,
    /// Stopped early. Index updates made so far are kept, but no
    /// notification was sent.
    Cancelled,
}

impl ReindexOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// What [`BundleManager::on_facet_changed`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetChangeOutcome {
    /// The module has no hand-edited manifest.
    Ignored,
    /// Reindexed; synchronization is disabled.
    Reindexed,
    /// Reindexed and flagged for a manual resync.
    ResyncPending,
    /// Reindexed and a resync was requested from listeners.
    ResyncRequested,
}

/// Dependencies of one module that resolution could not satisfy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnresolvedReport {
    pub module: String,
    /// Mandatory `Require-Bundle` items without a live candidate.
    pub missing_bundles: Vec<String>,
    /// `resolution:=optional` items without a live candidate.
    pub missing_optional_bundles: Vec<String>,
    /// Imported packages nobody exports.
    pub missing_packages: Vec<String>,
    pub missing_fragment_host: Option<String>,
}

impl UnresolvedReport {
    /// `true` if nothing mandatory is missing.
    pub fn is_resolved(&self) -> bool {
        self.missing_bundles.is_empty()
            && self.missing_packages.is_empty()
            && self.missing_fragment_host.is_none()
    }
}

/// Project-scoped bundle index and dependency resolver.
///
/// Queries take `&self`; anything that mutates the index takes
/// `&mut self`. Embedders that share a manager across threads wrap it in
/// their own lock.
pub struct BundleManager {
    project: Arc<Project>,
    registry: Arc<dyn ManifestHolderRegistry>,
    cache: BundleCache,
    events: EventBus,
    config: IndexConfig,
    state: ReindexState,
    needs_resync: bool,
}

impl std::fmt::Debug for BundleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleManager")
            .field("project", &self.project.name())
            .field("cache", &self.cache)
            .field("events", &self.events)
            .field("config", &self.config)
            .field("state", &self.state)
            .field("needs_resync", &self.needs_resync)
            .finish_non_exhaustive()
    }
}

impl BundleManager {
    pub fn new(project: Arc<Project>, registry: Arc<dyn ManifestHolderRegistry>) -> Self {
        Self::with_config(project, registry, IndexConfig::default())
    }

    pub fn with_config(
        project: Arc<Project>,
        registry: Arc<dyn ManifestHolderRegistry>,
        config: IndexConfig,
    ) -> Self {
        Self::with_cache(project, registry, config, BundleCache::new())
    }

    /// Create a manager around an existing index.
    pub fn with_cache(
        project: Arc<Project>,
        registry: Arc<dyn ManifestHolderRegistry>,
        config: IndexConfig,
        cache: BundleCache,
    ) -> Self {
        Self {
            project,
            registry,
            cache,
            events: EventBus::new(),
            config,
            state: ReindexState::Idle,
            needs_resync: false,
        }
    }

    pub fn project(&self) -> &Arc<Project> {
        &self.project
    }

    pub fn cache(&self) -> &BundleCache {
        &self.cache
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn state(&self) -> ReindexState {
        self.state
    }

    pub fn subscribe(&self, listener: impl BundleListener + 'static) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    // ------------------------------------------------------------------
    // Indexing
    // ------------------------------------------------------------------

    /// Reindex every module and, unless disabled, every project library.
    ///
    /// Sends at most one [`BundleEvent::BundlesChanged`], after all updates.
    pub fn reindex_all(&mut self) -> bool {
        self.reindex_all_cancellable(|| false).changed()
    }

    /// Like [`reindex_all`](Self::reindex_all), checking `is_cancelled`
    /// before each module and before the libraries.
    pub fn reindex_all_cancellable(&mut self, is_cancelled: impl Fn() -> bool) -> ReindexOutcome {
        let outcome = self.reindexing(|manager| manager.reindex_everything(&is_cancelled));

        match outcome {
            ReindexOutcome::Changed => {
                tracing::info!(
                    project = %self.project.name(),
                    holders = self.cache.len(),
                    "bundle index updated"
                );
                self.notify(BundleEvent::BundlesChanged);
            }
            ReindexOutcome::Unchanged => {
                tracing::debug!(project = %self.project.name(), "bundle index unchanged");
            }
            ReindexOutcome::Cancelled => {
                tracing::info!(project = %self.project.name(), "reindex cancelled");
            }
        }
        outcome
    }

    /// Run `work` with the state set to [`ReindexState::Reindexing`].
    fn reindexing<T>(&mut self, work: impl FnOnce(&mut Self) -> T) -> T {
        self.state = ReindexState::Reindexing;
        let result = work(self);
        self.state = ReindexState::Idle;
        result
    }

    fn reindex_everything(&mut self, is_cancelled: &dyn Fn() -> bool) -> ReindexOutcome {
        let mut changed = false;
        for module in self.project.modules() {
            if is_cancelled() {
                return ReindexOutcome::Cancelled;
            }
            changed |= self.do_reindex_module(&module);
        }

        if self.config.index.libraries {
            if is_cancelled() {
                return ReindexOutcome::Cancelled;
            }
            let libraries = self.project.libraries();
            changed |= self.do_reindex_libraries(&libraries);
        }
        // Removed modules are no longer enumerated; drop what they left behind.
        changed |= self.cleanup();

        if changed {
            ReindexOutcome::Changed
        } else {
            ReindexOutcome::Unchanged
        }
    }

    /// Reindex one module, notifying listeners if the index changed.
    pub fn reindex_module(&mut self, module: &Arc<Module>) -> bool {
        let changed = self.reindexing(|manager| manager.do_reindex_module(module));
        if changed {
            self.notify(BundleEvent::BundlesChanged);
        }
        changed
    }

    /// Reindex the given libraries, notifying listeners if the index changed.
    pub fn reindex_libraries(&mut self, libraries: &[Arc<Library>]) -> bool {
        let changed = self.reindexing(|manager| manager.do_reindex_libraries(libraries));
        if changed {
            self.notify(BundleEvent::BundlesChanged);
        }
        changed
    }

    fn do_reindex_module(&mut self, module: &Arc<Module>) -> bool {
        if module.is_disposed() {
            return false;
        }
        if module.project_id() != self.project.id() {
            tracing::warn!(
                module = %module.name(),
                project = %self.project.name(),
                "refusing to index a module of another project"
            );
            return false;
        }

        let key = HolderKey::Module(module.id());
        let mut changed = if module.has_bundle_facet() {
            let holder = self.registry.manifest_holder(module);
            self.cache.update_with(holder)
        } else {
            // The facet may have been removed since the last reindex.
            self.cache.remove(key)
        };
        changed |= self.cleanup();
        changed
    }

    fn do_reindex_libraries(&mut self, libraries: &[Arc<Library>]) -> bool {
        let mut changed = false;
        for library in libraries {
            if library.is_disposed() {
                continue;
            }
            if library.project_id() != self.project.id() {
                tracing::warn!(
                    library = %library.name(),
                    project = %self.project.name(),
                    "refusing to index a library of another project"
                );
                continue;
            }

            for holder in self.registry.manifest_holders(library) {
                changed |= self.cache.update_with(holder);
            }

            let root_count = library.root_count();
            let stale: Vec<HolderKey> = self
                .cache
                .manifest_holders_of(library)
                .iter()
                .map(|holder| holder.key())
                .filter(|key| matches!(key, HolderKey::Library(_, index) if *index >= root_count))
                .collect();
            for key in stale {
                changed |= self.cache.remove(key);
            }
        }
        changed |= self.cleanup();
        changed
    }

    /// Drop disposed holders from the index and from the registry.
    fn cleanup(&mut self) -> bool {
        let changed = self.cache.cleanup();
        let purged = self.registry.purge_disposed();
        if purged > 0 {
            tracing::debug!(purged, "released disposed manifest holders");
        }
        changed
    }

    fn notify(&self, event: BundleEvent) {
        if !self.project.is_disposed() {
            self.events.publish(event);
        }
    }

    // ------------------------------------------------------------------
    // Manifest change handling
    // ------------------------------------------------------------------

    /// React to a changed bundle facet configuration.
    ///
    /// Only modules with a hand-edited manifest react: the module is
    /// reindexed and the configured [`ManifestSyncStrategy`] decides
    /// whether dependencies should be synchronized.
    pub fn on_facet_changed(&mut self, module: &Arc<Module>) -> FacetChangeOutcome {
        let manually_edited = module.facet().is_some_and(|facet| facet.manually_edited);
        if !manually_edited || module.is_disposed() {
            return FacetChangeOutcome::Ignored;
        }

        self.reindex_module(module);
        tracing::debug!(
            module = %module.name(),
            strategy = %self.config.sync.strategy,
            "hand-edited manifest changed"
        );
        match self.config.sync.strategy {
            ManifestSyncStrategy::Never => FacetChangeOutcome::Reindexed,
            ManifestSyncStrategy::Manual => {
                self.needs_resync = true;
                FacetChangeOutcome::ResyncPending
            }
            ManifestSyncStrategy::Automatic => {
                self.needs_resync = false;
                self.notify(BundleEvent::ResyncRequested);
                FacetChangeOutcome::ResyncRequested
            }
        }
    }

    /// Whether a hand-edited manifest changed since the last resync.
    pub fn needs_resync(&self) -> bool {
        self.needs_resync
    }

    pub fn acknowledge_resync(&mut self) {
        self.needs_resync = false;
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// The modules and libraries `module` depends on.
    ///
    /// Empty if the module is not an indexed bundle. Never contains
    /// disposed entities.
    pub fn resolve_dependencies_of(&self, module: &Module) -> HashSet<BoundObject> {
        let Some(manifest) = self.manifest_by_object(module) else {
            return HashSet::new();
        };

        let mut holders: BTreeMap<HolderKey, Arc<ManifestHolder>> = BTreeMap::new();
        let mut add = |found: Vec<Arc<ManifestHolder>>| {
            for holder in found {
                holders.entry(holder.key()).or_insert(holder);
            }
        };

        for package in &manifest.imports {
            add(self.cache.who_provides(package));
        }
        add(self.resolve_required_bundles(&manifest.required_bundles));
        if let Some(own) = self.cache.manifest_holder(module) {
            add(self.cache.fragment_hosts(own.key()));
        }

        let mut result: HashSet<BoundObject> = holders
            .values()
            .filter_map(|holder| holder.bound_object().ok())
            .collect();
        result.extend(
            self.resolve_bundle_class_path(&manifest.bundle_class_path)
                .into_iter()
                .map(BoundObject::Library),
        );

        tracing::debug!(
            module = %module.name(),
            dependencies = result.len(),
            "resolved dependencies"
        );
        result
    }

    /// Close a list of `Require-Bundle` items over re-exports.
    ///
    /// Depth-first with an explicit stack; holders come out in the order
    /// a recursive walk would visit them, each at most once.
    fn resolve_required_bundles(&self, specifiers: &[String]) -> Vec<Arc<ManifestHolder>> {
        let mut resolved: Vec<Arc<ManifestHolder>> = Vec::new();
        let mut visited: HashSet<HolderKey> = HashSet::new();
        let mut pending: Vec<String> = specifiers.iter().rev().cloned().collect();

        while let Some(specifier) = pending.pop() {
            let Some(holder) = self.cache.who_is_required_bundle(&specifier) else {
                tracing::debug!(%specifier, "required bundle not found");
                continue;
            };
            if visited.contains(&holder.key()) {
                continue;
            }
            let Ok(Some(manifest)) = holder.bundle_manifest() else {
                continue;
            };
            visited.insert(holder.key());

            let mut next = manifest.re_exported_bundles.clone();
            let fragments = self.cache.fragments_for_bundle(holder.key());
            for fragment in BundleCache::candidates_with_highest_versions(&fragments) {
                if let Ok(Some(fragment_manifest)) = fragment.bundle_manifest() {
                    next.extend(fragment_manifest.re_exported_bundles.iter().cloned());
                }
            }
            pending.extend(next.into_iter().rev());
            resolved.push(holder);
        }
        resolved
    }

    /// Project libraries containing a jar named in `Bundle-ClassPath`.
    fn resolve_bundle_class_path(&self, entries: &[String]) -> Vec<Arc<Library>> {
        let jar_names: Vec<&str> = entries.iter().filter_map(|entry| jar_name(entry)).collect();
        if jar_names.is_empty() {
            return Vec::new();
        }

        self.project
            .libraries()
            .into_iter()
            .filter(|library| !library.is_disposed())
            .filter(|library| {
                library.class_urls().iter().any(|url| {
                    let url = url.strip_suffix(JAR_ROOT_SEPARATOR).unwrap_or(url);
                    jar_names.iter().any(|jar| url.ends_with(jar))
                })
            })
            .collect()
    }

    /// Every entity carrying bundle `symbolic_name`, newest first.
    pub fn who_is(&self, symbolic_name: &str) -> Vec<BoundObject> {
        self.cache
            .who_is(symbolic_name)
            .iter()
            .filter_map(|holder| holder.bound_object().ok())
            .collect()
    }

    /// The current manifest of an indexed module or library.
    pub fn manifest_by_object(&self, object: impl Into<ObjectKey>) -> Option<Arc<BundleManifest>> {
        self.cache
            .manifest_holder(object)?
            .bundle_manifest()
            .ok()
            .flatten()
    }

    /// The manifest of the newest bundle named `symbolic_name`.
    pub fn manifest_by_symbolic_name(&self, symbolic_name: &str) -> Option<Arc<BundleManifest>> {
        let newest = self.who_is(symbolic_name).into_iter().next()?;
        self.manifest_by_object(&newest)
    }

    /// Whether `module` directly re-exports `dependency`.
    pub fn is_re_exported(
        &self,
        dependency: impl Into<ObjectKey>,
        module: impl Into<ObjectKey>,
    ) -> bool {
        let Some(dependency) = self.manifest_by_object(dependency) else {
            return false;
        };
        let Some(module) = self.manifest_by_object(module) else {
            return false;
        };
        module.reexports_bundle(&dependency)
    }

    /// Whether `fragment` is a fragment bundle attaching to `host`.
    pub fn is_fragment_host(&self, host: impl Into<ObjectKey>, fragment: impl Into<ObjectKey>) -> bool {
        let Some(fragment) = self.manifest_by_object(fragment) else {
            return false;
        };
        if !fragment.is_fragment_bundle() {
            return false;
        }
        self.manifest_by_object(host)
            .is_some_and(|host| host.is_fragment_host_for(&fragment))
    }

    /// What resolution could not find for `module`.
    pub fn unresolved(&self, module: &Module) -> UnresolvedReport {
        let mut report = UnresolvedReport {
            module: module.name().to_string(),
            ..UnresolvedReport::default()
        };
        let Some(manifest) = self.manifest_by_object(module) else {
            return report;
        };

        for specifier in &manifest.required_bundles {
            match BundleRequirement::parse(specifier) {
                Ok(requirement) if self.cache.best_match(&requirement).is_some() => {}
                Ok(requirement) if requirement.is_optional() => {
                    report.missing_optional_bundles.push(specifier.clone());
                }
                _ => report.missing_bundles.push(specifier.clone()),
            }
        }

        for package in &manifest.imports {
            let provided = self
                .cache
                .who_provides(package)
                .iter()
                .any(|holder| holder.is_live());
            if !provided {
                report.missing_packages.push(package.clone());
            }
        }

        if let Some(host) = &manifest.fragment_host {
            let attached = self
                .cache
                .manifest_holder(module)
                .map(|own| self.cache.fragment_hosts(own.key()))
                .is_some_and(|hosts| hosts.iter().any(|h| h.is_live()));
            if !attached {
                report.missing_fragment_host = Some(host.clone());
            }
        }
        report
    }
}

/// The jar file name of a `Bundle-ClassPath` entry, if it names a jar.
fn jar_name(entry: &str) -> Option<&str> {
    JAR_PATH_REGEX
        .captures(entry.trim())
        .and_then(|captures| captures.get(2))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holder::HolderRegistry;
    use crate::project::{BundleFacet, LibraryRoot};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::sync::Mutex;

    fn manager(project: &Arc<Project>) -> BundleManager {
        BundleManager::new(Arc::clone(project), Arc::new(HolderRegistry::new()))
    }

    fn bundle(project: &Project, manifest: BundleManifest) -> Arc<Module> {
        let name = manifest.symbolic_name().unwrap_or("module").to_string();
        project.add_bundle_module(name, BundleFacet::new(manifest))
    }

    fn names(objects: &HashSet<BoundObject>) -> Vec<String> {
        let mut names: Vec<String> = objects.iter().map(|o| o.name().to_string()).collect();
        names.sort();
        names
    }

    #[rstest]
    #[case("lib/foo.jar", Some("foo.jar"))]
    #[case("foo.jar", Some("foo.jar"))]
    #[case("a/b/c/foo-1.0.jar", Some("foo-1.0.jar"))]
    #[case(".", None)]
    #[case("lib/", None)]
    #[case("lib/classes", None)]
    #[case("lib/foo.jarx", None)]
    fn test_jar_name(#[case] entry: &str, #[case] expected: Option<&str>) {
        assert_eq!(jar_name(entry), expected);
    }

    #[test]
    fn test_required_bundles_visited_in_depth_first_order() {
        let project = Project::new("p");
        bundle(&project, BundleManifest::new("a", "1.0").re_exporting("a1"));
        bundle(&project, BundleManifest::new("a1", "1.0"));
        bundle(&project, BundleManifest::new("b", "1.0"));
        let mut manager = manager(&project);
        manager.reindex_all();

        let resolved = manager.resolve_required_bundles(&["a".to_string(), "b".to_string()]);
        let order: Vec<String> = resolved
            .iter()
            .map(|h| h.bound_object().unwrap().name().to_string())
            .collect();
        assert_eq!(order, vec!["a", "a1", "b"]);
    }

    #[test]
    fn test_require_bundle_cycle_terminates() {
        let project = Project::new("p");
        let app = bundle(&project, BundleManifest::new("app", "1.0").requiring("a"));
        bundle(&project, BundleManifest::new("a", "1.0").re_exporting("b"));
        bundle(&project, BundleManifest::new("b", "1.0").re_exporting("a"));
        let mut manager = manager(&project);
        manager.reindex_all();

        let resolved = manager.resolve_required_bundles(&app.bundle_manifest().unwrap().required_bundles);
        assert_eq!(resolved.len(), 2);
        assert_eq!(names(&manager.resolve_dependencies_of(&app)), vec!["a", "b"]);
    }

    #[test]
    fn test_reindex_all_is_idempotent() {
        let project = Project::new("p");
        bundle(&project, BundleManifest::new("a", "1.0"));
        let mut manager = manager(&project);
        let events = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&events);
        manager.subscribe(move |event: BundleEvent| seen.lock().unwrap().push(event));

        assert!(manager.reindex_all());
        assert!(!manager.reindex_all());
        assert_eq!(*events.lock().unwrap(), vec![BundleEvent::BundlesChanged]);
        assert_eq!(manager.state(), ReindexState::Idle);
    }

    #[test]
    fn test_incremental_reindex_runs_in_reindexing_state() {
        let project = Project::new("p");
        let module = bundle(&project, BundleManifest::new("a", "1.0"));
        let mut manager = manager(&project);

        let during = manager.reindexing(|manager| {
            manager.do_reindex_module(&module);
            manager.state()
        });
        assert_eq!(during, ReindexState::Reindexing);
        assert_eq!(manager.state(), ReindexState::Idle);

        assert!(!manager.reindex_module(&module));
        assert!(!manager.reindex_libraries(&project.libraries()));
        assert_eq!(manager.state(), ReindexState::Idle);
    }

    #[test]
    fn test_cancelled_reindex_sends_nothing() {
        let project = Project::new("p");
        bundle(&project, BundleManifest::new("a", "1.0"));
        bundle(&project, BundleManifest::new("b", "1.0"));
        let mut manager = manager(&project);
        let events = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&events);
        manager.subscribe(move |event: BundleEvent| seen.lock().unwrap().push(event));

        let checks = std::cell::Cell::new(0);
        let outcome = manager.reindex_all_cancellable(|| {
            checks.set(checks.get() + 1);
            checks.get() > 1
        });

        assert_eq!(outcome, ReindexOutcome::Cancelled);
        assert_eq!(manager.cache().len(), 1);
        assert!(events.lock().unwrap().is_empty());
        assert_eq!(manager.state(), ReindexState::Idle);
    }

    #[test]
    fn test_foreign_module_not_indexed() {
        let project = Project::new("mine");
        let other = Project::new("theirs");
        let foreign = bundle(&other, BundleManifest::new("foreign", "1.0"));
        let mut manager = manager(&project);

        assert!(!manager.reindex_module(&foreign));
        assert!(manager.cache().is_empty());
    }

    #[test]
    fn test_removed_facet_drops_module_from_index() {
        let project = Project::new("p");
        let core = bundle(&project, BundleManifest::new("core", "1.0").exporting("core.api"));
        let mut manager = manager(&project);
        manager.reindex_all();
        assert_eq!(manager.cache().who_provides("core.api").len(), 1);

        core.set_facet(None);
        assert!(manager.reindex_all());
        assert!(manager.cache().who_provides("core.api").is_empty());
        assert!(manager.manifest_by_object(&core).is_none());
    }

    #[test]
    fn test_shrunk_library_drops_stale_roots() {
        let project = Project::new("p");
        let library = project.add_library(
            "libs",
            vec![
                LibraryRoot::bundle("jar:///a.jar!/", BundleManifest::new("a", "1.0")),
                LibraryRoot::bundle("jar:///b.jar!/", BundleManifest::new("b", "1.0")),
            ],
        );
        let mut manager = manager(&project);
        manager.reindex_all();
        assert_eq!(manager.who_is("b").len(), 1);

        library.set_roots(vec![LibraryRoot::bundle(
            "jar:///a.jar!/",
            BundleManifest::new("a", "1.0"),
        )]);
        assert!(manager.reindex_libraries(&[Arc::clone(&library)]));
        assert!(manager.who_is("b").is_empty());
        assert_eq!(manager.who_is("a").len(), 1);
    }

    #[test]
    fn test_libraries_skipped_when_disabled() {
        let project = Project::new("p");
        project.add_library(
            "libs",
            vec![LibraryRoot::bundle("jar:///a.jar!/", BundleManifest::new("a", "1.0"))],
        );
        let mut config = IndexConfig::default();
        config.index.libraries = false;
        let mut manager =
            BundleManager::with_config(Arc::clone(&project), Arc::new(HolderRegistry::new()), config);

        assert!(!manager.reindex_all());
        assert!(manager.who_is("a").is_empty());
    }

    #[test]
    fn test_no_notification_after_project_disposed() {
        let project = Project::new("p");
        let module = bundle(&project, BundleManifest::new("a", "1.0"));
        let mut manager = manager(&project);
        manager.reindex_all();
        let events = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&events);
        manager.subscribe(move |event: BundleEvent| seen.lock().unwrap().push(event));

        project.dispose();
        assert!(!manager.reindex_module(&module));
        assert!(manager.reindex_all());
        assert!(events.lock().unwrap().is_empty());
    }

    #[rstest]
    #[case(ManifestSyncStrategy::Never, FacetChangeOutcome::Reindexed, false, vec![BundleEvent::BundlesChanged])]
    #[case(ManifestSyncStrategy::Manual, FacetChangeOutcome::ResyncPending, true, vec![BundleEvent::BundlesChanged])]
    #[case(
        ManifestSyncStrategy::Automatic,
        FacetChangeOutcome::ResyncRequested,
        false,
        vec![BundleEvent::BundlesChanged, BundleEvent::ResyncRequested]
    )]
    fn test_facet_change_follows_sync_strategy(
        #[case] strategy: ManifestSyncStrategy,
        #[case] expected: FacetChangeOutcome,
        #[case] pending: bool,
        #[case] expected_events: Vec<BundleEvent>,
    ) {
        let project = Project::new("p");
        let module = project.add_bundle_module(
            "core",
            BundleFacet::new(BundleManifest::new("core", "1.0")).manually_edited(),
        );
        let mut manager = BundleManager::with_config(
            Arc::clone(&project),
            Arc::new(HolderRegistry::new()),
            IndexConfig::default().with_strategy(strategy),
        );
        let events = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&events);
        manager.subscribe(move |event: BundleEvent| seen.lock().unwrap().push(event));

        assert_eq!(manager.on_facet_changed(&module), expected);
        assert_eq!(manager.needs_resync(), pending);
        assert_eq!(*events.lock().unwrap(), expected_events);
        assert!(manager.manifest_by_object(&module).is_some());

        manager.acknowledge_resync();
        assert!(!manager.needs_resync());
    }

    #[test]
    fn test_generated_manifest_change_ignored() {
        let project = Project::new("p");
        let module = bundle(&project, BundleManifest::new("core", "1.0"));
        let mut manager = manager(&project);

        assert_eq!(manager.on_facet_changed(&module), FacetChangeOutcome::Ignored);
        assert!(manager.cache().is_empty());
        assert!(!manager.needs_resync());
    }

    #[test]
    fn test_unresolved_report() {
        let project = Project::new("p");
        bundle(&project, BundleManifest::new("present", "1.0").exporting("present.api"));
        let app = bundle(
            &project,
            BundleManifest::new("app", "1.0")
                .requiring("present")
                .requiring("absent")
                .requiring("maybe;resolution:=optional")
                .importing("present.api")
                .importing("absent.api")
                .fragment_of("nowhere"),
        );
        let mut manager = manager(&project);
        manager.reindex_all();

        let report = manager.unresolved(&app);
        assert_eq!(
            report,
            UnresolvedReport {
                module: "app".to_string(),
                missing_bundles: vec!["absent".to_string()],
                missing_optional_bundles: vec!["maybe;resolution:=optional".to_string()],
                missing_packages: vec!["absent.api".to_string()],
                missing_fragment_host: Some("nowhere".to_string()),
            }
        );
        assert!(!report.is_resolved());
    }
}
