//! # Run Configuration
//!
//! This module defines `Config`, the single value that carries every
//! process-wide setting of a generation run: where the working copy and the
//! output live, which dialect and base URI to stamp into documents, where the
//! upstream repository is, and how bundling is performed.
//!
//! A `Config` is built once by the CLI and passed by reference to every stage
//! entry point. Nothing in the library reads flags or environment variables on
//! its own, so several runs with different settings can coexist in one
//! process.
//!
//! The naming conventions of the spec corpus (input and output suffixes, specs
//! root candidates, the root manifest path) are constants of this module.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// Suffix of the YAML pseudo-schema documents in the upstream repository.
pub const INPUT_SUFFIX: &str = ".spec.yml";

/// Suffix of every generated JSON Schema document.
pub const OUTPUT_SUFFIX: &str = ".jsonschema.json";

/// Candidate specs roots inside a source tree, in priority order.
///
/// Older releases keep their specs under `versions/1`.
pub const SPEC_ROOT_CANDIDATES: [&str; 2] = ["spec", "versions/1"];

/// Path of the root manifest document inside a version's corpus.
pub const ROOT_MANIFEST: &str = "manifest.jsonschema.json";

/// Directory (under `<output>/<version>/`) holding the multi-file schemas.
pub const MULTI_FILE_DIR: &str = "jsonschema";

/// Directory (under `<output>/<version>/`) holding the bundles.
pub const BUNDLE_DIR: &str = "bundles";

/// Which bundling oracle resolves cross-file references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolverKind {
    /// Resolve in-process.
    #[default]
    Native,
    /// Shell out to an external bundling utility.
    Command,
}

impl FromStr for ResolverKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "native" => Ok(ResolverKind::Native),
            "command" => Ok(ResolverKind::Command),
            other => Err(format!(
                "unknown resolver '{}' (expected 'native' or 'command')",
                other
            )),
        }
    }
}

impl fmt::Display for ResolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolverKind::Native => write!(f, "native"),
            ResolverKind::Command => write!(f, "command"),
        }
    }
}

/// Settings for one generation run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Working copy of the upstream repository.
    pub work_dir: PathBuf,
    /// Root of the generated output tree.
    pub output_dir: PathBuf,
    /// URI written into every document's `$schema`.
    pub dialect: String,
    /// Prefix of every document's `$id`.
    pub base_uri: String,
    /// URL of the upstream repository.
    pub repo_url: String,
    /// Explicit git reference. `None` means every release tag.
    pub git_ref: Option<String>,
    /// Fetch from the remote before listing tags.
    pub fetch: bool,
    /// Bundling oracle to use.
    pub resolver: ResolverKind,
    /// Program and leading arguments of the command oracle.
    pub resolver_command: Vec<String>,
    /// Upper bound for a single command oracle invocation.
    pub resolver_timeout: Duration,
    /// Skip versions that fail with a configuration error instead of aborting.
    pub keep_going: bool,
}

impl Config {
    /// Creates a configuration with defaults for everything but the paths and
    /// the repository URL.
    pub fn new(
        work_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        repo_url: impl Into<String>,
    ) -> Self {
        Self {
            work_dir: work_dir.into(),
            output_dir: output_dir.into(),
            dialect: crate::defaults::DEFAULT_DIALECT.to_string(),
            base_uri: crate::defaults::DEFAULT_BASE_URI.to_string(),
            repo_url: repo_url.into(),
            git_ref: None,
            fetch: false,
            resolver: ResolverKind::Native,
            resolver_command: crate::defaults::default_resolver_command(),
            resolver_timeout: crate::defaults::DEFAULT_RESOLVER_TIMEOUT,
            keep_going: false,
        }
    }

    /// Checks the settings that the pipeline cannot recover from later.
    pub fn validate(&self) -> Result<()> {
        if self.dialect.trim().is_empty() {
            return Err(Error::configuration("schema dialect URI must not be empty"));
        }

        let base = Url::parse(&self.base_uri).map_err(|e| Error::Configuration {
            message: format!("base URI '{}' is not an absolute URL: {}", self.base_uri, e),
            hint: Some("use a prefix such as https://schemas.example.org/spec".to_string()),
        })?;
        if base.cannot_be_a_base() {
            return Err(Error::configuration(format!(
                "base URI '{}' cannot be used as a base",
                self.base_uri
            )));
        }

        if self.resolver == ResolverKind::Command {
            if self.resolver_command.is_empty() {
                return Err(Error::configuration("resolver command must not be empty"));
            }
            if self.resolver_timeout.is_zero() {
                return Err(Error::configuration("resolver timeout must be positive"));
            }
        }

        Ok(())
    }

    /// `<output>/<version>/jsonschema`
    pub fn multi_file_dir(&self, version: &str) -> PathBuf {
        self.output_dir.join(version).join(MULTI_FILE_DIR)
    }

    /// `<output>/<version>/bundles`
    pub fn bundle_dir(&self, version: &str) -> PathBuf {
        self.output_dir.join(version).join(BUNDLE_DIR)
    }

    /// Base of every `$id` in a version: `<base>/<version>/`.
    pub fn version_base(&self, version: &str) -> String {
        format!("{}/{}/", self.base_uri.trim_end_matches('/'), version)
    }

    /// `$id` of the document at `relative_path` (already rewritten to the
    /// output suffix) in `version`.
    pub fn document_id(&self, version: &str, relative_path: &str) -> String {
        format!(
            "{}{}",
            self.version_base(version),
            relative_path.trim_start_matches('/')
        )
    }
}
