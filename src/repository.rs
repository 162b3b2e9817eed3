//! # Upstream Repository Access
//!
//! This module provides `SpecRepository`, the source of versioned spec trees.
//! It lists the versions a run should generate and materialises each one by
//! checking it out into a shared working copy.
//!
//! ## Design
//!
//! Git access goes through the `GitOperations` trait. `DefaultGitOperations`
//! wraps the system `git` command (see `crate::git`); tests substitute a mock
//! so that version listing and checkout serialisation can be exercised
//! without a real repository.
//!
//! Checking out a reference mutates the one working copy every version
//! shares, so `with_checkout` holds a lock for the whole time the caller
//! reads from the tree. Callers are expected to copy what they need out of
//! the tree inside the closure and do the rest of their work after it
//! returns, which lets one version's processing overlap the next version's
//! checkout.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::version::{select_release_versions, SpecVersion};

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Makes sure `dir` holds a working copy of `url`, cloning if needed.
    fn open_or_clone(&self, url: &str, dir: &Path) -> Result<()>;

    /// Updates branches and tags from the remote.
    fn fetch(&self, url: &str, dir: &Path) -> Result<()>;

    /// Lists all tags as `(name, commit)` pairs.
    fn list_tags(&self, url: &str, dir: &Path) -> Result<Vec<(String, String)>>;

    /// Resolves a reference (tag, branch, commit) to a commit hash.
    fn resolve_revision(&self, url: &str, dir: &Path, reference: &str) -> Result<String>;

    /// Checks `commit` out into the working copy.
    fn checkout(&self, url: &str, dir: &Path, commit: &str) -> Result<()>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command to perform real Git operations.
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn open_or_clone(&self, url: &str, dir: &Path) -> Result<()> {
        if crate::git::is_repository(dir) {
            debug!("Reusing working copy at {}", dir.display());
            Ok(())
        } else {
            info!("Cloning {} into {}", url, dir.display());
            crate::git::clone(url, dir)
        }
    }

    fn fetch(&self, url: &str, dir: &Path) -> Result<()> {
        crate::git::fetch(dir, url)
    }

    fn list_tags(&self, url: &str, dir: &Path) -> Result<Vec<(String, String)>> {
        crate::git::list_tags(dir, url)
    }

    fn resolve_revision(&self, url: &str, dir: &Path, reference: &str) -> Result<String> {
        crate::git::resolve_revision(dir, url, reference)
            .or_else(|_| crate::git::resolve_revision(dir, url, &format!("origin/{}", reference)))
    }

    fn checkout(&self, url: &str, dir: &Path, commit: &str) -> Result<()> {
        crate::git::checkout(dir, url, commit)
    }
}

/// Versioned access to the upstream spec repository.
pub struct SpecRepository {
    git_ops: Box<dyn GitOperations>,
    url: String,
    work_dir: PathBuf,
    checkout_lock: Mutex<()>,
}

impl SpecRepository {
    /// Opens (cloning if needed) the working copy configured in `config`, and
    /// fetches from the remote when `config.fetch` is set.
    pub fn open(config: &Config) -> Result<Self> {
        Self::open_with_operations(Box::new(DefaultGitOperations), config)
    }

    /// Same as `open`, with custom `GitOperations`.
    pub fn open_with_operations(git_ops: Box<dyn GitOperations>, config: &Config) -> Result<Self> {
        git_ops.open_or_clone(&config.repo_url, &config.work_dir)?;
        if config.fetch {
            info!("Fetching {}", config.repo_url);
            git_ops.fetch(&config.repo_url, &config.work_dir)?;
        }
        Ok(Self {
            git_ops,
            url: config.repo_url.clone(),
            work_dir: config.work_dir.clone(),
            checkout_lock: Mutex::new(()),
        })
    }

    /// The working copy directory.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Lists the versions to generate.
    ///
    /// With an explicit reference, returns exactly that reference (which
    /// need not be semver). Otherwise returns every `v<semver>` tag without a
    /// pre-release component, sorted ascending.
    pub fn list_versions(&self, explicit_ref: Option<&str>) -> Result<Vec<SpecVersion>> {
        if let Some(reference) = explicit_ref {
            let commit = self
                .git_ops
                .resolve_revision(&self.url, &self.work_dir, reference)?;
            return Ok(vec![SpecVersion::explicit(reference, commit)]);
        }

        let tags = self.git_ops.list_tags(&self.url, &self.work_dir)?;
        let versions = select_release_versions(&tags);
        debug!(
            "{} of {} tags are release versions",
            versions.len(),
            tags.len()
        );
        Ok(versions)
    }

    /// Checks `version` out and runs `read` against the worktree while no
    /// other checkout can happen.
    pub fn with_checkout<T, F>(&self, version: &SpecVersion, read: F) -> Result<T>
    where
        F: FnOnce(&Path) -> Result<T>,
    {
        let _guard = self.checkout_lock.lock().map_err(|_| Error::LockPoisoned {
            context: format!("working copy {}", self.work_dir.display()),
        })?;

        debug!("Checking out {} ({})", version.git_ref, version.commit);
        self.git_ops
            .checkout(&self.url, &self.work_dir, &version.commit)?;
        read(&self.work_dir)
    }
}
