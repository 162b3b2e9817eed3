//! Orchestrator for a complete generation run
//!
//! This module coordinates all phases across every selected version.

use std::path::Path;

use log::{info, warn};
use rayon::prelude::*;

use super::{bundling, phase1, phase2, phase3, RunSummary, VersionReport};
use crate::bundle::SchemaResolver;
use crate::config::Config;
use crate::error::Result;
use crate::repository::SpecRepository;
use crate::version::SpecVersion;

/// Execute the complete generation run (Phases 1-4) for every version.
///
/// The versions are processed on the rayon pool. Their checkouts take turns
/// on the repository's working copy; everything after a checkout overlaps
/// freely with other versions.
///
/// A configuration error in one version aborts the run unless
/// `config.keep_going` is set, in which case the version is skipped and
/// recorded in the summary. Any other error aborts the run.
pub fn execute_generate(
    config: &Config,
    repository: &SpecRepository,
    resolver: &dyn SchemaResolver,
) -> Result<RunSummary> {
    let versions = repository.list_versions(config.git_ref.as_deref())?;
    info!("Generating {} versions", versions.len());

    let results: Vec<(String, Result<VersionReport>)> = versions
        .par_iter()
        .map(|version| {
            (
                version.label.clone(),
                process_version(config, repository, resolver, version),
            )
        })
        .collect();

    let mut summary = RunSummary::default();
    for (label, result) in results {
        match result {
            Ok(report) => summary.versions.push(report),
            Err(e) if config.keep_going && e.is_version_scoped() => {
                warn!("Skipping version {}: {}", label, e);
                summary.skipped.push((label, e.to_string()));
            }
            Err(e) => return Err(e),
        }
    }

    Ok(summary)
}

/// Runs every phase for one version.
pub fn process_version(
    config: &Config,
    repository: &SpecRepository,
    resolver: &dyn SchemaResolver,
    version: &SpecVersion,
) -> Result<VersionReport> {
    info!("Processing version {} ({})", version, version.commit);

    // Phase 1: Snapshot (holds the working copy)
    let snapshot = phase1::execute(repository, version)?;

    // Phase 2: Patch and synthesize
    let patched = phase2::execute(config, snapshot)?;
    let label = patched.version.label.as_str();

    // Phase 3: Write the multi-file corpus
    let multi_file_dir = config.multi_file_dir(label);
    phase3::execute(&patched.corpus, &multi_file_dir)?;

    // Phase 4: Bundle into a cleared directory
    let bundle_dir = config.bundle_dir(label);
    phase3::clear_dir(&bundle_dir)?;
    let bundles = bundling::execute(resolver, label, &multi_file_dir, &bundle_dir)?;

    info!("Finished version {}", label);
    Ok(VersionReport {
        version: label.to_string(),
        documents: patched.corpus.len(),
        manifest_synthesized: patched.manifest_synthesized,
        dangling_references: patched.dangling.len(),
        bundles,
    })
}

/// Bundle an existing multi-file directory without touching git.
///
/// `version` is only used for diagnostics.
pub fn execute_bundle(
    resolver: &dyn SchemaResolver,
    version: &str,
    multi_file_dir: &Path,
    bundle_dir: &Path,
) -> Result<usize> {
    bundling::execute(resolver, version, multi_file_dir, bundle_dir)
}
