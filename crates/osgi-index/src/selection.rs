//! Version-based candidate selection.
//!
//! When several bundles could satisfy a lookup, the preferred one is
//! decided by a deterministic total order:
//!
//! 1. higher parsed OSGi version wins;
//! 2. equal parsed versions compare the raw `Bundle-Version` text, higher
//!    wins (so `1.0` and `1.0.0` always resolve the same way);
//! 3. otherwise the lower [`HolderKey`] wins, i.e. modules before
//!    libraries and earlier entities first.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use osgi_meta::{BundleManifest, Version};

use crate::holder::HolderKey;

/// A candidate with its ordering data precomputed.
#[derive(Debug)]
struct Ranked<T> {
    item: T,
    key: HolderKey,
    version: Version,
    raw_version: String,
}

impl<T> Ranked<T> {
    fn new(item: T, key: HolderKey, manifest: &BundleManifest) -> Self {
        Self {
            item,
            key,
            version: manifest.parsed_version(),
            raw_version: manifest.version.clone(),
        }
    }

    /// `Greater` means `self` is preferred over `other`.
    fn preference(&self, other: &Self) -> Ordering {
        self.version
            .cmp(&other.version)
            .then_with(|| self.raw_version.cmp(&other.raw_version))
            .then_with(|| other.key.cmp(&self.key))
    }
}

/// Pick the preferred candidate.
pub(crate) fn select_preferred<'m, T>(
    candidates: impl IntoIterator<Item = (T, HolderKey, &'m BundleManifest)>,
) -> Option<T> {
    candidates
        .into_iter()
        .map(|(item, key, manifest)| Ranked::new(item, key, manifest))
        .max_by(|a, b| a.preference(b))
        .map(|ranked| ranked.item)
}

/// Order candidates from most to least preferred.
pub(crate) fn sort_by_preference<'m, T>(
    candidates: impl IntoIterator<Item = (T, HolderKey, &'m BundleManifest)>,
) -> Vec<T> {
    let mut ranked: Vec<Ranked<T>> = candidates
        .into_iter()
        .map(|(item, key, manifest)| Ranked::new(item, key, manifest))
        .collect();
    ranked.sort_by(|a, b| b.preference(a));
    ranked.into_iter().map(|ranked| ranked.item).collect()
}

/// Keep the preferred candidate per symbolic name, ordered by name.
///
/// Candidates whose manifest is not a bundle are dropped.
pub(crate) fn preferred_per_symbolic_name<'m, T>(
    candidates: impl IntoIterator<Item = (T, HolderKey, &'m BundleManifest)>,
) -> Vec<T> {
    let mut best: BTreeMap<&'m str, Ranked<T>> = BTreeMap::new();
    for (item, key, manifest) in candidates {
        let Some(name) = manifest.symbolic_name() else {
            continue;
        };
        let ranked = Ranked::new(item, key, manifest);
        let replace = best
            .get(name)
            .is_none_or(|current| current.preference(&ranked) == Ordering::Less);
        if replace {
            best.insert(name, ranked);
        }
    }
    best.into_values().map(|ranked| ranked.item).collect()
}
