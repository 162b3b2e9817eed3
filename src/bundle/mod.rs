//! # Bundling
//!
//! Produces, for every document of a written multi-file corpus, a single
//! self-contained document whose references all point inside itself.
//!
//! ## Design
//!
//! Cross-file dereferencing is delegated to a `SchemaResolver`, the bundling
//! oracle. Two implementations exist:
//!
//! - **`NativeResolver`**: resolves references in-process.
//! - **`CommandResolver`**: shells out to an external bundling utility, with a
//!   per-invocation timeout.
//!
//! Whatever the oracle does internally, `Bundler` checks its output with
//! `verify::verify_bundle` before accepting it: the bundle must be closed
//! (every `$ref` is a fragment resolvable inside the document) and must
//! compile as a schema with every external retrieval refused.
//!
//! A failed invocation that the oracle marks as transient is retried once.

pub mod command;
pub mod native;
pub mod verify;

use std::path::Path;

use log::{debug, warn};
use rayon::prelude::*;
use serde_json::Value;

use crate::config::{Config, ResolverKind};
use crate::corpus::Corpus;
use crate::error::{Error, Result};

pub use command::CommandResolver;
pub use native::NativeResolver;

/// Options passed to the oracle for every invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Do not give merged (non-root) documents their own `$id`.
    pub omit_identity: bool,
}

/// Capability that dereferences a multi-file schema into one document.
///
/// Implementations are invoked once per entry file and must not keep state
/// between invocations.
pub trait SchemaResolver: Send + Sync {
    /// Resolves `entry` (a file under `resolution_base`) and returns the bytes
    /// of the bundled document.
    fn resolve(
        &self,
        entry: &Path,
        resolution_base: &Path,
        options: ResolveOptions,
    ) -> Result<Vec<u8>>;
}

/// Builds the oracle selected in `config`.
pub fn resolver_for(config: &Config) -> Box<dyn SchemaResolver> {
    match config.resolver {
        ResolverKind::Native => Box::new(NativeResolver),
        ResolverKind::Command => Box::new(CommandResolver::new(
            config.resolver_command.clone(),
            config.resolver_timeout,
        )),
    }
}

/// Bundles the documents of a written corpus through a `SchemaResolver`.
pub struct Bundler<'a> {
    resolver: &'a dyn SchemaResolver,
}

impl<'a> Bundler<'a> {
    pub fn new(resolver: &'a dyn SchemaResolver) -> Self {
        Self { resolver }
    }

    /// Bundles one entry document of `version`'s corpus rooted at
    /// `corpus_root`.
    pub fn bundle(&self, version: &str, corpus_root: &Path, entry: &str) -> Result<Value> {
        let entry_path = corpus_root.join(entry);
        let options = ResolveOptions {
            omit_identity: true,
        };

        let bytes = match self.resolver.resolve(&entry_path, corpus_root, options) {
            Err(e) if e.is_retryable() => {
                warn!("Retrying bundling of {} ({}) after: {}", entry, version, e);
                self.resolver.resolve(&entry_path, corpus_root, options)?
            }
            other => other?,
        };

        let bundle: Value = serde_json::from_slice(&bytes).map_err(|e| Error::Bundling {
            entry: entry.into(),
            message: format!("resolver output is not JSON: {}", e),
            retryable: false,
        })?;

        verify::verify_bundle(Path::new(entry), &bundle)?;
        debug!("Bundled {} ({})", entry, version);
        Ok(bundle)
    }

    /// Bundles every `*.jsonschema.json` document under `corpus_root`.
    ///
    /// Entries are bundled in parallel; the result is keyed by the same
    /// relative paths as the input corpus.
    pub fn bundle_all(&self, version: &str, corpus_root: &Path) -> Result<Corpus> {
        let entries = Corpus::load_dir(corpus_root)?;
        let paths: Vec<&str> = entries.paths().collect();

        paths
            .par_iter()
            .map(|entry| Ok((entry.to_string(), self.bundle(version, corpus_root, entry)?)))
            .collect::<Result<Vec<_>>>()
            .map(|bundles| bundles.into_iter().collect())
    }
}
