//! Temporary project description files.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Default project description file name.
pub const PROJECT_FILE: &str = "osgi-project.toml";

/// Default index configuration file name.
pub const CONFIG_FILE: &str = "osgi-index.toml";

/// A temporary directory for CLI scenarios.
pub struct ProjectDir {
    temp_dir: TempDir,
}

impl Default for ProjectDir {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectDir {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `content` to `osgi-project.toml` and return its path.
    pub fn write_project(&self, content: &str) -> PathBuf {
        self.write(PROJECT_FILE, content)
    }

    /// Write `content` to `osgi-index.toml` and return its path.
    pub fn write_config(&self, content: &str) -> PathBuf {
        self.write(CONFIG_FILE, content)
    }

    /// Write a file relative to the root, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Copy a fixture from `test-fixtures/projects/` into the directory.
    pub fn copy_fixture(&self, name: &str) -> PathBuf {
        let source = fixtures_dir().join(name);
        let content = fs::read_to_string(&source)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", source.display()));
        self.write_project(&content)
    }
}

/// The workspace's `test-fixtures/projects` directory.
pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../test-fixtures/projects")
}
