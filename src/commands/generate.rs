//! Generate command implementation
//!
//! The generate command runs the whole pipeline for every selected version:
//! 1. Checking the version out and collecting its spec files
//! 2. Patching documents and synthesizing the root manifest
//! 3. Writing the multi-file corpus
//! 4. Bundling every document

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::{ResolverArgs, SourceArgs};

/// Arguments for the generate command
#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub resolver: ResolverArgs,

    /// Output root; each version is written under `<output>/<version>`
    #[arg(short, long, value_name = "PATH", default_value = "build")]
    pub output: PathBuf,

    /// JSON Schema dialect URI written to every `$schema`
    #[arg(long, value_name = "URI", default_value = spec_jsonschema::defaults::DEFAULT_DIALECT)]
    pub dialect: String,

    /// Prefix of every `$id`
    #[arg(
        long,
        value_name = "URI",
        env = "SPEC_JSONSCHEMA_BASE_URI",
        default_value = spec_jsonschema::defaults::DEFAULT_BASE_URI
    )]
    pub base_uri: String,

    /// Skip versions whose source tree is unusable instead of failing the run
    #[arg(long)]
    pub keep_going: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the generate command
pub fn execute(args: GenerateArgs, color: &str) -> Result<()> {
    use spec_jsonschema::bundle::resolver_for;
    use spec_jsonschema::output::{emoji, summary_lines, OutputConfig};
    use spec_jsonschema::phases::orchestrator;
    use spec_jsonschema::repository::SpecRepository;
    use std::time::Instant;

    let start_time = Instant::now();
    let output = OutputConfig::from_env_and_flag(color);

    let mut config = args.source.to_config(args.output);
    args.resolver.apply(&mut config);
    config.dialect = args.dialect;
    config.base_uri = args.base_uri;
    config.keep_going = args.keep_going;
    config.validate()?;

    let human = !args.quiet && !args.json;
    if human {
        println!(
            "{} Generating JSON Schemas from {}",
            emoji(&output, "🔍", "[GEN]"),
            config.repo_url
        );
    }

    let repository = SpecRepository::open(&config)?;
    let resolver = resolver_for(&config);
    let summary = orchestrator::execute_generate(&config, &repository, resolver.as_ref())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if human {
        for line in summary_lines(&output, &summary) {
            println!("   {}", line);
        }
        println!(
            "{} Done in {:.2}s, output in {}",
            emoji(&output, "✅", "[DONE]"),
            start_time.elapsed().as_secs_f64(),
            config.output_dir.display()
        );
    }

    Ok(())
}
