//! Phase 4: Bundling
//!
//! Bundles every document of a written multi-file corpus and writes the
//! bundles under the same relative paths in the bundle directory. The
//! bundler reads the corpus back from disk, so this phase only needs the
//! output of Phase 3.

use std::path::Path;

use log::info;

use crate::bundle::{Bundler, SchemaResolver};
use crate::error::Result;

/// Execute Phase 4. Returns the number of bundles written.
pub fn execute(
    resolver: &dyn SchemaResolver,
    version: &str,
    multi_file_dir: &Path,
    bundle_dir: &Path,
) -> Result<usize> {
    let bundles = Bundler::new(resolver).bundle_all(version, multi_file_dir)?;
    bundles.write_dir(bundle_dir)?;
    info!("Wrote {} bundles to {}", bundles.len(), bundle_dir.display());
    Ok(bundles.len())
}
