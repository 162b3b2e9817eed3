//! Implementation of the phases of a generation run.
//!
//! ## Overview
//!
//! Each version goes through 4 phases:
//! 1. Snapshot - Check the version out and collect its spec files into memory
//! 2. Transform - Patch every document and synthesize the root manifest
//! 3. Writing to Disk - Write the multi-file corpus under `<version>/jsonschema`
//! 4. Bundling - Bundle every written document into `<version>/bundles`
//!
//! Phase 1 is the only one that touches the shared working copy and runs
//! under the repository's checkout lock. Phases 2 to 4 work on the snapshot
//! and on version-namespaced output directories, so they run concurrently
//! with other versions. The orchestrator drives the versions on the rayon
//! pool.

use serde::Serialize;

use crate::collector::RawSpec;
use crate::corpus::Corpus;
use crate::patch::DanglingReference;
use crate::version::SpecVersion;

pub mod bundling;
pub mod orchestrator;
pub mod snapshot;
pub mod transform;
pub mod write;

pub use snapshot as phase1;
pub use transform as phase2;
pub use write as phase3;
pub use bundling as phase4;

/// The spec files of one version, read out of the working copy.
#[derive(Debug, Clone)]
pub struct VersionSnapshot {
    pub version: SpecVersion,
    pub specs: Vec<RawSpec>,
}

/// A version's patched multi-file corpus.
#[derive(Debug, Clone)]
pub struct PatchedVersion {
    pub version: SpecVersion,
    pub corpus: Corpus,
    /// Whether the root manifest was synthesized rather than authored.
    pub manifest_synthesized: bool,
    /// Relative references whose target is not in the corpus.
    pub dangling: Vec<DanglingReference>,
}

/// What a run did for one version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionReport {
    pub version: String,
    pub documents: usize,
    pub manifest_synthesized: bool,
    pub dangling_references: usize,
    pub bundles: usize,
}

/// Outcome of a generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Versions that were generated, in version order.
    pub versions: Vec<VersionReport>,
    /// Versions skipped under `keep_going`, with the reason.
    pub skipped: Vec<(String, String)>,
}

impl RunSummary {
    pub fn documents(&self) -> usize {
        self.versions.iter().map(|v| v.documents).sum()
    }

    pub fn bundles(&self) -> usize {
        self.versions.iter().map(|v| v.bundles).sum()
    }
}
