//! # Bundle Command Implementation
//!
//! Bundles an already written multi-file directory (for example the
//! `<version>/jsonschema` directory of an earlier run, or a hand-edited copy
//! of one) into a directory of self-contained documents. Git is not involved.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::ResolverArgs;

/// Arguments for the bundle command
#[derive(Args, Debug)]
pub struct BundleArgs {
    /// Directory holding the multi-file `*.jsonschema.json` documents
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Directory to write the bundles to
    #[arg(short, long, value_name = "PATH")]
    pub output: PathBuf,

    /// Version label used in diagnostics
    #[arg(long, value_name = "LABEL", default_value = "local")]
    pub label: String,

    #[command(flatten)]
    pub resolver: ResolverArgs,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the bundle command
pub fn execute(args: BundleArgs, color: &str) -> Result<()> {
    use spec_jsonschema::bundle::resolver_for;
    use spec_jsonschema::config::Config;
    use spec_jsonschema::output::{emoji, OutputConfig};
    use spec_jsonschema::phases::orchestrator;

    let output = OutputConfig::from_env_and_flag(color);

    if !args.input.is_dir() {
        anyhow::bail!("Input directory not found: {}", args.input.display());
    }

    let mut config = Config::new(PathBuf::new(), args.output.clone(), String::new());
    args.resolver.apply(&mut config);
    config.validate()?;

    let resolver = resolver_for(&config);
    let count = orchestrator::execute_bundle(resolver.as_ref(), &args.label, &args.input, &args.output)
        .with_context(|| format!("Failed to bundle {}", args.input.display()))?;

    if !args.quiet {
        println!(
            "{} Wrote {} bundles to {}",
            emoji(&output, "✅", "[DONE]"),
            count,
            args.output.display()
        );
    }
    Ok(())
}
