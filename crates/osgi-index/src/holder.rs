//! Manifest holders.
//!
//! A [`ManifestHolder`] binds a bundle manifest to the module or library
//! root it came from. The holder only keeps a weak back-reference: the
//! project model owns the entity. Once the entity is removed the holder
//! reports itself disposed and refuses to hand out stale data.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use osgi_meta::BundleManifest;

use crate::error::{Error, Result};
use crate::project::{BoundObject, Library, LibraryId, Module, ModuleId, ObjectKey};

/// Index key of a manifest holder.
///
/// A library may contain several bundle jars, so library holders are keyed
/// by library and class root position. The derived order puts modules
/// before libraries and otherwise follows creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HolderKey {
    Module(ModuleId),
    Library(LibraryId, usize),
}

impl HolderKey {
    /// The module or library this holder belongs to.
    pub fn object_key(&self) -> ObjectKey {
        match *self {
            Self::Module(id) => ObjectKey::Module(id),
            Self::Library(id, _) => ObjectKey::Library(id),
        }
    }
}

impl fmt::Display for HolderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module(id) => write!(f, "{id}"),
            Self::Library(id, index) => write!(f, "{id}[{index}]"),
        }
    }
}

#[derive(Debug)]
enum Source {
    Module(Weak<Module>),
    Library(Weak<Library>),
}

/// Binding between a bundle manifest and its owning module or library root.
#[derive(Debug)]
pub struct ManifestHolder {
    key: HolderKey,
    source: Source,
}

impl ManifestHolder {
    pub fn for_module(module: &Arc<Module>) -> Self {
        Self {
            key: HolderKey::Module(module.id()),
            source: Source::Module(Arc::downgrade(module)),
        }
    }

    pub fn for_library_root(library: &Arc<Library>, index: usize) -> Self {
        Self {
            key: HolderKey::Library(library.id(), index),
            source: Source::Library(Arc::downgrade(library)),
        }
    }

    pub fn key(&self) -> HolderKey {
        self.key
    }

    pub fn is_disposed(&self) -> bool {
        self.live_object().is_none()
    }

    pub fn is_live(&self) -> bool {
        !self.is_disposed()
    }

    /// The current manifest, or `None` if the entity is not a bundle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HolderDisposed`] once the entity has been removed.
    pub fn bundle_manifest(&self) -> Result<Option<Arc<BundleManifest>>> {
        let manifest = match self.bound_object()? {
            BoundObject::Module(module) => module.bundle_manifest(),
            BoundObject::Library(library) => match self.key {
                HolderKey::Library(_, index) => library.manifest_at(index),
                HolderKey::Module(_) => None,
            },
        };
        Ok(manifest)
    }

    /// The module or library this holder is bound to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HolderDisposed`] once the entity has been removed.
    pub fn bound_object(&self) -> Result<BoundObject> {
        self.live_object()
            .ok_or(Error::HolderDisposed { key: self.key })
    }

    fn live_object(&self) -> Option<BoundObject> {
        let object = match &self.source {
            Source::Module(module) => BoundObject::Module(module.upgrade()?),
            Source::Library(library) => BoundObject::Library(library.upgrade()?),
        };
        (!object.is_disposed()).then_some(object)
    }
}

impl PartialEq for ManifestHolder {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ManifestHolder {}

/// Supplies manifest holders for modules and libraries.
///
/// This is the seam to the host environment's manifest registry, which
/// owns manifest parsing and caching.
pub trait ManifestHolderRegistry: Send + Sync {
    /// The holder for a module's bundle facet.
    fn manifest_holder(&self, module: &Arc<Module>) -> Arc<ManifestHolder>;

    /// One holder per class root of a library.
    fn manifest_holders(&self, library: &Arc<Library>) -> Vec<Arc<ManifestHolder>>;

    /// Forget holders whose module or library is gone.
    ///
    /// Called after the index drops disposed holders. Returns the number
    /// of holders removed.
    fn purge_disposed(&self) -> usize;
}

/// In-memory [`ManifestHolderRegistry`].
///
/// Holders are created on first request and reused afterwards, so a
/// module keeps the same holder across reindexing.
#[derive(Debug, Default)]
pub struct HolderRegistry {
    holders: Mutex<HashMap<HolderKey, Arc<ManifestHolder>>>,
}

impl HolderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_or_create(
        &self,
        key: HolderKey,
        create: impl FnOnce() -> ManifestHolder,
    ) -> Arc<ManifestHolder> {
        let mut holders = self.holders.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(holders.entry(key).or_insert_with(|| Arc::new(create())))
    }

    pub fn len(&self) -> usize {
        self.holders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ManifestHolderRegistry for HolderRegistry {
    fn manifest_holder(&self, module: &Arc<Module>) -> Arc<ManifestHolder> {
        self.get_or_create(HolderKey::Module(module.id()), || {
            ManifestHolder::for_module(module)
        })
    }

    fn manifest_holders(&self, library: &Arc<Library>) -> Vec<Arc<ManifestHolder>> {
        (0..library.root_count())
            .map(|index| {
                self.get_or_create(HolderKey::Library(library.id(), index), || {
                    ManifestHolder::for_library_root(library, index)
                })
            })
            .collect()
    }

    fn purge_disposed(&self) -> usize {
        let mut holders = self.holders.lock().unwrap_or_else(PoisonError::into_inner);
        let before = holders.len();
        holders.retain(|_, holder| holder.is_live());
        before - holders.len()
    }
}
