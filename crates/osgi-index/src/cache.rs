//! The bundle index.
//!
//! [`BundleCache`] keeps reverse lookups over every indexed manifest
//! holder: which bundles export a package, which holders carry a symbolic
//! name, and which fragments attach to which hosts. It is mutated
//! incrementally with [`BundleCache::update_with`] and
//! [`BundleCache::cleanup`]; both report whether the index changed so the
//! caller can decide whether to notify listeners.
//!
//! Each entry keeps the manifest snapshot it was indexed with. Removing a
//! holder's contribution uses that snapshot, so re-indexing after a
//! manifest edit never leaves stale keys behind.

use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::Hash;
use std::sync::Arc;

use osgi_meta::{BundleManifest, BundleRequirement};

use crate::holder::{HolderKey, ManifestHolder};
use crate::project::ObjectKey;
use crate::selection;

#[derive(Debug)]
struct Entry {
    holder: Arc<ManifestHolder>,
    manifest: Option<Arc<BundleManifest>>,
}

/// Reverse indices over the live manifest holders of a project.
#[derive(Debug, Default)]
pub struct BundleCache {
    holders: BTreeMap<HolderKey, Entry>,
    package_providers: HashMap<String, BTreeSet<HolderKey>>,
    by_symbolic_name: HashMap<String, BTreeSet<HolderKey>>,
    fragments_by_host: HashMap<HolderKey, BTreeSet<HolderKey>>,
    hosts_by_fragment: HashMap<HolderKey, BTreeSet<HolderKey>>,
    /// Fragments keyed by the host name they ask for, matched or not.
    fragments_by_host_name: HashMap<String, BTreeSet<HolderKey>>,
}

impl BundleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or refresh a holder's contribution to the index.
    ///
    /// Returns `true` if the index changed. A disposed holder is removed
    /// if it was indexed.
    pub fn update_with(&mut self, holder: Arc<ManifestHolder>) -> bool {
        let key = holder.key();
        let manifest = match holder.bundle_manifest() {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::debug!("{e}; dropping it from the bundle index");
                return self.remove(key);
            }
        };

        if let Some(entry) = self.holders.get_mut(&key) {
            if entry.manifest == manifest {
                entry.holder = holder;
                return false;
            }
        }

        if let Some(previous) = self.holders.remove(&key) {
            self.unlink(key, previous.manifest.as_deref());
        }
        tracing::debug!(
            holder = %key,
            bundle = ?manifest.as_deref().and_then(BundleManifest::symbolic_name),
            "indexing manifest holder"
        );
        self.holders.insert(key, Entry { holder, manifest });
        self.link(key);
        true
    }

    /// Remove every holder whose module or library is gone.
    ///
    /// Returns `true` if anything was removed.
    pub fn cleanup(&mut self) -> bool {
        let disposed: Vec<HolderKey> = self
            .holders
            .iter()
            .filter(|(_, entry)| entry.holder.is_disposed())
            .map(|(key, _)| *key)
            .collect();
        for key in &disposed {
            self.remove(*key);
        }
        if !disposed.is_empty() {
            tracing::debug!(removed = disposed.len(), "purged disposed manifest holders");
        }
        !disposed.is_empty()
    }

    /// Remove a single holder from every index.
    pub fn remove(&mut self, key: HolderKey) -> bool {
        match self.holders.remove(&key) {
            Some(entry) => {
                self.unlink(key, entry.manifest.as_deref());
                true
            }
            None => false,
        }
    }

    /// Holders exporting `package`, in key order.
    pub fn who_provides(&self, package: &str) -> Vec<Arc<ManifestHolder>> {
        self.holders_for(self.package_providers.get(package))
    }

    /// The holder a `Require-Bundle` specifier resolves to.
    ///
    /// Among live candidates within the version range the highest version
    /// wins. Unparseable or unmatched specifiers resolve to `None`.
    pub fn who_is_required_bundle(&self, specifier: &str) -> Option<Arc<ManifestHolder>> {
        let requirement = match BundleRequirement::parse(specifier) {
            Ok(requirement) => requirement,
            Err(e) => {
                tracing::debug!("{e}");
                return None;
            }
        };
        self.best_match(&requirement)
    }

    /// The holder a parsed requirement resolves to.
    pub fn best_match(&self, requirement: &BundleRequirement) -> Option<Arc<ManifestHolder>> {
        let keys = self.by_symbolic_name.get(requirement.symbolic_name())?;
        let candidates: Vec<(&Entry, &BundleManifest)> = keys
            .iter()
            .filter_map(|key| self.bundle_entry(*key))
            .filter(|(entry, manifest)| {
                entry.holder.is_live() && requirement.matches_manifest(manifest)
            })
            .collect();
        selection::select_preferred(
            candidates
                .into_iter()
                .map(|(entry, manifest)| (&entry.holder, entry.holder.key(), manifest)),
        )
        .cloned()
    }

    /// Every holder with this symbolic name, newest version first.
    pub fn who_is(&self, symbolic_name: &str) -> Vec<Arc<ManifestHolder>> {
        let Some(keys) = self.by_symbolic_name.get(symbolic_name) else {
            return Vec::new();
        };
        selection::sort_by_preference(
            keys.iter()
                .filter_map(|key| self.bundle_entry(*key))
                .map(|(entry, manifest)| (Arc::clone(&entry.holder), entry.holder.key(), manifest)),
        )
    }

    /// The hosts the given fragment attaches to.
    pub fn fragment_hosts(&self, fragment: HolderKey) -> Vec<Arc<ManifestHolder>> {
        self.holders_for(self.hosts_by_fragment.get(&fragment))
    }

    /// The fragments attached to the given host.
    pub fn fragments_for_bundle(&self, host: HolderKey) -> Vec<Arc<ManifestHolder>> {
        self.holders_for(self.fragments_by_host.get(&host))
    }

    /// Reduce holders to one per symbolic name, keeping the highest version.
    ///
    /// Uses each holder's current manifest; disposed holders and non-bundles
    /// are dropped. The result is ordered by symbolic name.
    pub fn candidates_with_highest_versions(
        holders: &[Arc<ManifestHolder>],
    ) -> Vec<Arc<ManifestHolder>> {
        let with_manifests: Vec<(&Arc<ManifestHolder>, Arc<BundleManifest>)> = holders
            .iter()
            .filter_map(|holder| match holder.bundle_manifest() {
                Ok(Some(manifest)) => Some((holder, manifest)),
                _ => None,
            })
            .collect();
        selection::preferred_per_symbolic_name(
            with_manifests
                .iter()
                .map(|(holder, manifest)| (Arc::clone(*holder), holder.key(), &**manifest)),
        )
    }

    /// The holder of a module, or the first bundle holder of a library.
    pub fn manifest_holder(&self, object: impl Into<ObjectKey>) -> Option<Arc<ManifestHolder>> {
        let holders = self.manifest_holders_of(object);
        holders
            .iter()
            .find(|holder| self.bundle_entry(holder.key()).is_some())
            .or_else(|| holders.first())
            .cloned()
    }

    /// Every indexed holder of a module or library.
    pub fn manifest_holders_of(&self, object: impl Into<ObjectKey>) -> Vec<Arc<ManifestHolder>> {
        let entries: Vec<&Entry> = match object.into() {
            ObjectKey::Module(id) => self.holders.get(&HolderKey::Module(id)).into_iter().collect(),
            ObjectKey::Library(id) => self
                .holders
                .range(HolderKey::Library(id, 0)..=HolderKey::Library(id, usize::MAX))
                .map(|(_, entry)| entry)
                .collect(),
        };
        entries.into_iter().map(|e| Arc::clone(&e.holder)).collect()
    }

    /// The manifest a holder was indexed with.
    pub fn indexed_manifest(&self, key: HolderKey) -> Option<Arc<BundleManifest>> {
        self.holders.get(&key).and_then(|e| e.manifest.clone())
    }

    /// All indexed holders, in key order.
    pub fn holders(&self) -> impl Iterator<Item = &Arc<ManifestHolder>> {
        self.holders.values().map(|entry| &entry.holder)
    }

    pub fn contains(&self, key: HolderKey) -> bool {
        self.holders.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.holders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holders.is_empty()
    }

    fn holders_for(&self, keys: Option<&BTreeSet<HolderKey>>) -> Vec<Arc<ManifestHolder>> {
        keys.into_iter()
            .flatten()
            .filter_map(|key| self.holders.get(key))
            .map(|entry| Arc::clone(&entry.holder))
            .collect()
    }

    /// The entry for `key` if its snapshot is a bundle.
    fn bundle_entry(&self, key: HolderKey) -> Option<(&Entry, &BundleManifest)> {
        let entry = self.holders.get(&key)?;
        let manifest = entry.manifest.as_deref().filter(|m| m.is_bundle())?;
        Some((entry, manifest))
    }

    fn link(&mut self, key: HolderKey) {
        let Some(manifest) = self.bundle_entry(key).and_then(|(e, _)| e.manifest.clone()) else {
            return;
        };
        let Some(name) = manifest.symbolic_name() else {
            return;
        };

        for package in &manifest.exported_packages {
            self.package_providers
                .entry(package.clone())
                .or_default()
                .insert(key);
        }
        self.by_symbolic_name
            .entry(name.to_string())
            .or_default()
            .insert(key);

        if let Some(host) = manifest.fragment_host_requirement() {
            self.fragments_by_host_name
                .entry(host.symbolic_name().to_string())
                .or_default()
                .insert(key);
            let hosts: Vec<HolderKey> = self
                .by_symbolic_name
                .get(host.symbolic_name())
                .into_iter()
                .flatten()
                .copied()
                .filter(|candidate| *candidate != key)
                .filter(|candidate| {
                    self.bundle_entry(*candidate)
                        .is_some_and(|(_, m)| host.matches_manifest(m))
                })
                .collect();
            for host_key in hosts {
                self.attach(host_key, key);
            }
        }

        let fragments: Vec<HolderKey> = self
            .fragments_by_host_name
            .get(name)
            .into_iter()
            .flatten()
            .copied()
            .filter(|candidate| *candidate != key)
            .filter(|candidate| {
                self.bundle_entry(*candidate)
                    .and_then(|(_, m)| m.fragment_host_requirement())
                    .is_some_and(|host| host.matches_manifest(&manifest))
            })
            .collect();
        for fragment_key in fragments {
            self.attach(key, fragment_key);
        }
    }

    fn unlink(&mut self, key: HolderKey, manifest: Option<&BundleManifest>) {
        if let Some(fragments) = self.fragments_by_host.remove(&key) {
            for fragment in fragments {
                remove_key(&mut self.hosts_by_fragment, &fragment, key);
            }
        }
        if let Some(hosts) = self.hosts_by_fragment.remove(&key) {
            for host in hosts {
                remove_key(&mut self.fragments_by_host, &host, key);
            }
        }

        let Some(manifest) = manifest else {
            return;
        };
        let Some(name) = manifest.symbolic_name() else {
            return;
        };
        for package in &manifest.exported_packages {
            remove_key(&mut self.package_providers, package.as_str(), key);
        }
        remove_key(&mut self.by_symbolic_name, name, key);
        if let Some(host) = manifest.fragment_host_requirement() {
            remove_key(&mut self.fragments_by_host_name, host.symbolic_name(), key);
        }
    }

    fn attach(&mut self, host: HolderKey, fragment: HolderKey) {
        self.fragments_by_host.entry(host).or_default().insert(fragment);
        self.hosts_by_fragment.entry(fragment).or_default().insert(host);
    }
}

/// Remove `key` from the set under `index`, dropping the set once empty.
fn remove_key<K, Q>(map: &mut HashMap<K, BTreeSet<HolderKey>>, index: &Q, key: HolderKey)
where
    K: Borrow<Q> + Hash + Eq,
    Q: Hash + Eq + ?Sized,
{
    if let Some(keys) = map.get_mut(index) {
        keys.remove(&key);
        if keys.is_empty() {
            map.remove(index);
        }
    }
}
