//! Shared test fixtures for the osgi-deps workspace.
//!
//! Dev-dependency only, never published.
//!
//! - [`manifests`]: one-line constructors for common manifest shapes
//! - [`project`]: [`ProjectFixture`] for in-memory projects and
//!   [`EventRecorder`] for observing bundle events
//! - [`files`]: [`ProjectDir`], a temporary directory holding project and
//!   config files for CLI tests

pub mod files;
pub mod manifests;
pub mod project;

pub use files::ProjectDir;
pub use project::{EventRecorder, ProjectFixture, sorted_names};
