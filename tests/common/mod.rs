//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures and helper functions to reduce
//! duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_spec_tree("spec", specs::PACKAGE);
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::specs;
    #[allow(unused_imports)]
    pub use super::GitRepo;
    pub use super::TestFixture;
}

/// Spec trees used across tests, as `(relative path, content)` pairs.
#[allow(dead_code)]
pub mod specs {
    /// Input and integration manifests sharing a common definitions file,
    /// with no root manifest.
    pub const PACKAGE: &[(&str, &str)] = &[
        (
            "input/manifest.spec.yml",
            r#"
spec:
  type: object
  additionalProperties: true
  required: [name, type]
  properties:
    name:
      $ref: "../common.spec.yml#/$defs/name"
    type:
      const: input
"#,
        ),
        (
            "integration/manifest.spec.yml",
            r#"
spec:
  type: object
  additionalProperties: false
  required: [name, type]
  properties:
    name:
      $ref: "../common.spec.yml#/$defs/name"
    type:
      const: integration
    owner:
      $ref: "../common.spec.yml#/$defs/owner^github"
"#,
        ),
        (
            "common.spec.yml",
            r#"
copyright: test
spec:
  $id: ignored-because-it-is-replaced
  $defs:
    name:
      type: string
      pattern: "^[a-z0-9_]+$"
    owner^github:
      type: object
      properties:
        github:
          $id: nested-identity-is-dropped
          type: string
"#,
        ),
    ];

    /// A tree with an authored root manifest.
    pub const WITH_ROOT_MANIFEST: &[(&str, &str)] = &[
        (
            "manifest.spec.yml",
            "spec:\n  title: Authored root\n  type: object\n",
        ),
        (
            "integration/manifest.spec.yml",
            "spec:\n  type: object\n",
        ),
    ];
}

/// A test fixture that provides a temporary directory holding spec trees.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new().with_spec_tree("spec", specs::PACKAGE);
///
/// let mut cmd = fixture.command();
/// cmd.arg("bundle").arg("jsonschema").assert().success();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write every `(path, content)` of `files` under `root`.
    pub fn with_spec_tree(self, root: &str, files: &[(&str, &str)]) -> Self {
        for (path, content) in files {
            self.temp_dir
                .child(root)
                .child(path)
                .write_str(content)
                .expect("Failed to write spec file");
        }
        self
    }

    /// Add a file with the given path and content.
    #[allow(dead_code)]
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command configured to run in this fixture's directory.
    #[allow(dead_code)]
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("spec-jsonschema");
        cmd.current_dir(self.path())
            .env_remove("SPEC_JSONSCHEMA_WORK_DIR")
            .env_remove("SPEC_JSONSCHEMA_REPO")
            .env_remove("SPEC_JSONSCHEMA_BASE_URI")
            .env_remove("RUST_LOG");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A throwaway local git repository with one tagged commit per spec tree.
///
/// Needs a `git` binary on `PATH`; tests using it run only with the
/// `integration-tests` feature.
#[allow(dead_code)]
pub struct GitRepo {
    dir: PathBuf,
}

#[allow(dead_code)]
impl GitRepo {
    /// Initialise an empty repository at `dir`.
    pub fn init(dir: &Path) -> Self {
        std::fs::create_dir_all(dir).expect("Failed to create repository directory");
        let repo = Self {
            dir: dir.to_path_buf(),
        };
        repo.git(&["init", "--quiet"]);
        repo.git(&["config", "user.email", "tests@example.com"]);
        repo.git(&["config", "user.name", "Tests"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo
    }

    /// Replace the tracked tree with `files` under `root`, commit and tag it.
    pub fn commit_tree(&self, tag: &str, root: &str, files: &[(&str, &str)]) -> &Self {
        for stale in ["spec", "versions"] {
            let _ = std::fs::remove_dir_all(self.dir.join(stale));
        }
        for (path, content) in files {
            let full = self.dir.join(root).join(path);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(full, content).unwrap();
        }
        self.git(&["add", "--all"]);
        self.git(&["commit", "--quiet", "--allow-empty", "-m", tag]);
        self.git(&["tag", "-a", tag, "-m", tag]);
        self
    }

    /// `file://` URL of the repository.
    pub fn url(&self) -> String {
        format!("file://{}", self.dir.display())
    }

    fn git(&self, args: &[&str]) {
        let status = Command::new("git")
            .arg("-C")
            .arg(&self.dir)
            .args(args)
            .status()
            .expect("Failed to run git");
        assert!(status.success(), "git {:?} failed", args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_spec_tree() {
        let fixture = TestFixture::new().with_spec_tree("spec", specs::PACKAGE);
        assert!(fixture.path().join("spec/input/manifest.spec.yml").exists());
    }
}
