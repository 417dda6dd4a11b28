use criterion::{Criterion, black_box, criterion_group, criterion_main};
use osgi_meta::BundleManifest;
use osgi_test_utils::ProjectFixture;

/// A layered project: every bundle re-exports the one below it and
/// imports a package from two layers down.
fn layered_fixture(layers: usize) -> ProjectFixture {
    let fixture = ProjectFixture::new("bench");
    for i in 0..layers {
        let mut manifest = BundleManifest::new(format!("layer{i}"), "1.0.0")
            .exporting(format!("layer{i}.api"));
        if i > 0 {
            manifest = manifest.re_exporting(format!("layer{}", i - 1));
        }
        if i > 1 {
            manifest = manifest.importing(format!("layer{}.api", i - 2));
        }
        fixture.bundle(manifest);
    }
    fixture
}

fn reindex_benchmark(c: &mut Criterion) {
    c.bench_function("BundleManager::reindex_all (200 bundles)", |b| {
        let fixture = layered_fixture(200);

        b.iter(|| {
            let mut manager = fixture.manager();
            black_box(manager.reindex_all());
        })
    });
}

fn resolve_benchmark(c: &mut Criterion) {
    c.bench_function("BundleManager::resolve_dependencies_of (deep re-export chain)", |b| {
        let fixture = layered_fixture(200);
        let manager = fixture.indexed_manager();
        let top = fixture.project().find_module("layer199").unwrap();

        b.iter(|| {
            let deps = manager.resolve_dependencies_of(black_box(&top));
            assert_eq!(deps.len(), 199);
        })
    });
}

criterion_group!(benches, reindex_benchmark, resolve_benchmark);
criterion_main!(benches);
