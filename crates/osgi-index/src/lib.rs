//! Bundle index and dependency resolver for OSGi projects.
//!
//! The crate indexes the bundle manifests of a project's modules and
//! libraries ([`BundleCache`]) and answers the question "what does this
//! module depend on?" ([`BundleManager::resolve_dependencies_of`]).
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use osgi_index::{BundleFacet, BundleManager, HolderRegistry, Project};
//! use osgi_meta::BundleManifest;
//!
//! let project = Project::new("demo");
//! project.add_bundle_module(
//!     "core",
//!     BundleFacet::new(BundleManifest::new("org.example.core", "1.0.0").exporting("org.example.api")),
//! );
//! let app = project.add_bundle_module(
//!     "app",
//!     BundleFacet::new(BundleManifest::new("org.example.app", "1.0.0").importing("org.example.api")),
//! );
//!
//! let mut manager = BundleManager::new(Arc::clone(&project), Arc::new(HolderRegistry::new()));
//! manager.reindex_all();
//!
//! let deps = manager.resolve_dependencies_of(&app);
//! assert_eq!(deps.len(), 1);
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod holder;
pub mod logging;
pub mod manager;
pub mod project;
mod selection;

pub use cache::BundleCache;
pub use config::{IndexConfig, IndexSection, LoggingConfig, ManifestSyncStrategy, SyncConfig};
pub use error::{Error, Result};
pub use events::{BundleEvent, BundleListener, EventBus, SubscriptionId};
pub use holder::{HolderKey, HolderRegistry, ManifestHolder, ManifestHolderRegistry};
pub use manager::{
    BundleManager, FacetChangeOutcome, ReindexOutcome, ReindexState, UnresolvedReport,
};
pub use project::{
    BoundObject, BundleFacet, Library, LibraryId, LibraryRoot, Module, ModuleId, ObjectKey,
    Project, ProjectId,
};
