//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Spec JSON Schema - Generate JSON Schemas from versioned package specs
#[derive(Parser, Debug)]
#[command(name = "spec-jsonschema")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace); RUST_LOG overrides it
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        default_value = "info",
        value_parser = ["error", "warn", "info", "debug", "trace"]
    )]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate multi-file schemas and bundles for every selected version
    Generate(commands::generate::GenerateArgs),

    /// List the versions a generation run would process
    Versions(commands::versions::VersionsArgs),

    /// Bundle an existing multi-file schema directory
    Bundle(commands::bundle::BundleArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        match self.command {
            Commands::Generate(args) => commands::generate::execute(args, &self.color),
            Commands::Versions(args) => commands::versions::execute(args, &self.color),
            Commands::Bundle(args) => commands::bundle::execute(args, &self.color),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// Logs go to stderr so that command output on stdout stays clean.
fn init_logging(level: &str) {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(level);
    builder.parse_default_env();
    builder.format_timestamp(None);
    // Already initialised when the CLI is driven from tests.
    let _ = builder.try_init();
}
