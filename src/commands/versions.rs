//! # Versions Command Implementation
//!
//! Prints the versions a `generate` run with the same source arguments would
//! process, one per line as `<label>\t<git ref>\t<commit>`, in processing
//! order, or as a JSON array with `--json`. Nothing is checked out or
//! written.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::SourceArgs;

/// Arguments for the versions command
#[derive(Args, Debug)]
pub struct VersionsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Print the versions as a JSON array
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct VersionEntry<'a> {
    label: &'a str,
    git_ref: &'a str,
    commit: &'a str,
}

/// Execute the versions command
pub fn execute(args: VersionsArgs, color: &str) -> Result<()> {
    use spec_jsonschema::output::{version_lines, OutputConfig};
    use spec_jsonschema::repository::SpecRepository;

    let output = OutputConfig::from_env_and_flag(color);
    // The output directory is not used when only listing.
    let config = args.source.to_config(std::path::PathBuf::new());

    let repository = SpecRepository::open(&config)?;
    let versions = repository.list_versions(config.git_ref.as_deref())?;
    if versions.is_empty() {
        log::warn!("No release tags found in {}", config.repo_url);
    }

    if args.json {
        let entries: Vec<VersionEntry> = versions
            .iter()
            .map(|v| VersionEntry {
                label: &v.label,
                git_ref: &v.git_ref,
                commit: &v.commit,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for line in version_lines(&output, &versions) {
        println!("{}", line);
    }
    Ok(())
}
