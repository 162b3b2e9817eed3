//! Phase 1: Snapshot
//!
//! Checks a version out into the shared working copy and reads its spec
//! files into memory before releasing the working copy. Later phases never
//! look at the working copy again, so the next checkout can start as soon
//! as this phase returns.

use log::info;

use super::VersionSnapshot;
use crate::collector;
use crate::error::Result;
use crate::repository::SpecRepository;
use crate::version::SpecVersion;

/// Execute Phase 1 for `version`.
pub fn execute(repository: &SpecRepository, version: &SpecVersion) -> Result<VersionSnapshot> {
    let specs = repository.with_checkout(version, collector::collect)?;
    info!("Collected {} spec files for {}", specs.len(), version);
    Ok(VersionSnapshot {
        version: version.clone(),
        specs,
    })
}
