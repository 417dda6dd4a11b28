//! Integration tests for the osgi-deps binary.
//!
//! These tests exercise the compiled binary using assert_cmd against
//! project files written to temporary directories.

use assert_cmd::Command;
use osgi_test_utils::ProjectDir;
use predicates::prelude::*;
use pretty_assertions::assert_eq;

/// Get a Command for the osgi-deps binary with colors disabled
fn deps_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("osgi-deps"));
    cmd.env("NO_COLOR", "1")
        .env("CLICOLOR", "0")
        .env_remove("RUST_LOG")
        .env_remove("OSGI_DEPS_PROJECT");
    cmd
}

fn json_output(dir: &ProjectDir, args: &[&str]) -> serde_json::Value {
    let project = dir.root().join("osgi-project.toml");
    let output = deps_cmd()
        .arg("--project")
        .arg(&project)
        .arg("--json")
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success(), "command failed: {output:?}");
    serde_json::from_slice(&output.stdout).unwrap()
}

// ============================================================================
// Help and Arguments
// ============================================================================

#[test]
fn test_help_output() {
    deps_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Resolve OSGi bundle dependencies"))
        .stdout(predicate::str::contains("provides"));
}

#[test]
fn test_version_output() {
    deps_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("osgi-deps"));
}

#[test]
fn test_missing_subcommand_fails() {
    deps_cmd().assert().failure();
}

#[test]
fn test_missing_project_file() {
    let dir = ProjectDir::new();
    deps_cmd()
        .arg("--project")
        .arg(dir.root().join("absent.toml"))
        .arg("bundles")
        .assert()
        .failure()
        .stderr(predicate::str::contains("project file not found"));
}

#[test]
fn test_project_from_environment() {
    let dir = ProjectDir::new();
    let project = dir.copy_fixture("demo.toml");
    deps_cmd()
        .env("OSGI_DEPS_PROJECT", &project)
        .args(["provides", "org.example.api"])
        .assert()
        .success()
        .stdout(predicate::str::contains("org.example.core"));
}

// ============================================================================
// Resolve
// ============================================================================

#[test]
fn test_resolve_text() {
    let dir = ProjectDir::new();
    let project = dir.copy_fixture("demo.toml");
    deps_cmd()
        .arg("-p")
        .arg(&project)
        .args(["resolve", "app"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dependencies of app"))
        .stdout(predicate::str::contains("util"))
        .stdout(predicate::str::contains("felix"))
        .stdout(predicate::str::contains("org.apache.felix.framework 7.0.5"))
        .stdout(predicate::str::contains("commons-text"));
}

#[test]
fn test_resolve_json() {
    let dir = ProjectDir::new();
    dir.copy_fixture("demo.toml");

    let value = json_output(&dir, &["resolve", "app"]);
    assert_eq!(value["module"], "app");

    let dependencies: Vec<(String, String)> = value["dependencies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| {
            (
                d["kind"].as_str().unwrap().to_string(),
                d["name"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(
        dependencies,
        vec![
            ("library".to_string(), "commons-text".to_string()),
            ("library".to_string(), "felix".to_string()),
            ("module".to_string(), "core".to_string()),
            ("module".to_string(), "util".to_string()),
        ]
    );
    assert_eq!(value["dependencies"][0].get("bundle"), None);
    assert_eq!(value["dependencies"][3]["bundle"], "org.example.util");
}

#[test]
fn test_resolve_fragment_depends_on_host() {
    let dir = ProjectDir::new();
    dir.copy_fixture("demo.toml");

    let value = json_output(&dir, &["resolve", "core-nls"]);
    assert_eq!(value["dependencies"][0]["name"], "core");
    assert_eq!(value["dependencies"].as_array().unwrap().len(), 1);
}

#[test]
fn test_resolve_plain_module() {
    let dir = ProjectDir::new();
    let project = dir.copy_fixture("demo.toml");
    deps_cmd()
        .arg("--project")
        .arg(&project)
        .args(["resolve", "docs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("docs is not a bundle"));
}

#[test]
fn test_resolve_unknown_module() {
    let dir = ProjectDir::new();
    let project = dir.copy_fixture("demo.toml");
    deps_cmd()
        .arg("--project")
        .arg(&project)
        .args(["resolve", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("module 'nope' not found"));
}

// ============================================================================
// Provides and Bundles
// ============================================================================

#[test]
fn test_provides_json() {
    let dir = ProjectDir::new();
    dir.copy_fixture("demo.toml");

    let value = json_output(&dir, &["provides", "org.osgi.framework"]);
    let providers = value.as_array().unwrap();
    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0]["bundle"], "org.apache.felix.framework");
    assert_eq!(providers[0]["owner"], "felix");
    assert_eq!(providers[0]["kind"], "library");
}

#[test]
fn test_provides_unknown_package() {
    let dir = ProjectDir::new();
    let project = dir.copy_fixture("demo.toml");
    deps_cmd()
        .arg("--project")
        .arg(&project)
        .args(["provides", "org.example.nothing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No bundle exports org.example.nothing"));
}

#[test]
fn test_bundles_lists_index() {
    let dir = ProjectDir::new();
    dir.copy_fixture("demo.toml");

    let value = json_output(&dir, &["bundles"]);
    let names: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["bundle"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "org.apache.felix.framework",
            "org.example.app",
            "org.example.core",
            "org.example.core.nls",
            "org.example.util",
        ]
    );
    assert_eq!(value[3]["fragment_host"], "org.example.core");
}

#[test]
fn test_bundles_skip_libraries_when_disabled() {
    let dir = ProjectDir::new();
    let project = dir.copy_fixture("demo.toml");
    dir.write_config("[index]\nlibraries = false\n");

    deps_cmd()
        .arg("--project")
        .arg(&project)
        .arg("bundles")
        .assert()
        .success()
        .stdout(predicate::str::contains("4 bundles indexed"))
        .stdout(predicate::str::contains("felix").not());
}

// ============================================================================
// Check
// ============================================================================

#[test]
fn test_check_passes_with_optional_warning() {
    let dir = ProjectDir::new();
    let project = dir.copy_fixture("demo.toml");
    deps_cmd()
        .arg("--project")
        .arg(&project)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("org.example.telemetry;resolution:=optional (optional)"))
        .stdout(predicate::str::contains("All bundle dependencies resolved"));
}

#[test]
fn test_check_reports_missing_dependencies() {
    let dir = ProjectDir::new();
    let project = dir.copy_fixture("broken.toml");
    deps_cmd()
        .arg("--project")
        .arg(&project)
        .arg("check")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Require-Bundle org.example.absent"))
        .stdout(predicate::str::contains("Import-Package org.example.gone"))
        .stdout(predicate::str::contains("Fragment-Host"))
        .stdout(predicate::str::contains("Import-Package org.example.api").not())
        .stderr(predicate::str::contains("2 module(s) with unresolved dependencies"));
}

#[test]
fn test_check_json_still_fails() {
    let dir = ProjectDir::new();
    let project = dir.copy_fixture("broken.toml");
    let output = deps_cmd()
        .arg("--project")
        .arg(&project)
        .args(["--json", "check"])
        .output()
        .unwrap();
    assert!(!output.status.success());

    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reports[0]["module"], "app");
    assert_eq!(reports[0]["missing_packages"][0], "org.example.gone");
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_invalid_config_rejected() {
    let dir = ProjectDir::new();
    let project = dir.copy_fixture("demo.toml");
    dir.write_config("[sync]\nstrategy = \"sometimes\"\n");

    deps_cmd()
        .arg("--project")
        .arg(&project)
        .arg("bundles")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));
}

#[test]
fn test_explicit_config_must_exist() {
    let dir = ProjectDir::new();
    let project = dir.copy_fixture("demo.toml");

    deps_cmd()
        .arg("--project")
        .arg(&project)
        .arg("--config")
        .arg(dir.root().join("elsewhere.toml"))
        .arg("bundles")
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration not found"));
}

#[test]
fn test_invalid_project_file() {
    let dir = ProjectDir::new();
    let project = dir.write_project("name = \"p\"\n[[modules]]\ntitle = \"x\"\n");

    deps_cmd()
        .arg("--project")
        .arg(&project)
        .arg("bundles")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid project file"));
}
