//! Manifest shortcuts.

use osgi_meta::BundleManifest;

/// A plain bundle.
pub fn bundle(symbolic_name: &str, version: &str) -> BundleManifest {
    BundleManifest::new(symbolic_name, version)
}

/// A bundle exporting `packages`.
pub fn exporter(symbolic_name: &str, version: &str, packages: &[&str]) -> BundleManifest {
    packages
        .iter()
        .fold(bundle(symbolic_name, version), |manifest, package| {
            manifest.exporting(*package)
        })
}

/// A bundle importing `packages`.
pub fn importer(symbolic_name: &str, packages: &[&str]) -> BundleManifest {
    packages
        .iter()
        .fold(bundle(symbolic_name, "1.0.0"), |manifest, package| {
            manifest.importing(*package)
        })
}

/// A fragment of `host`.
pub fn fragment(symbolic_name: &str, version: &str, host: &str) -> BundleManifest {
    bundle(symbolic_name, version).fragment_of(host)
}

/// A manifest without `Bundle-SymbolicName`.
pub fn not_a_bundle() -> BundleManifest {
    BundleManifest::default()
}
