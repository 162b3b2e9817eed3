//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `spec-jsonschema` command-line tool. Each subcommand is defined in its own
//! file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic by calling into the `spec_jsonschema` library.
//!
//! Argument groups shared by several commands live here.

pub mod bundle;
pub mod completions;
pub mod generate;
pub mod versions;

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use spec_jsonschema::config::{Config, ResolverKind};
use spec_jsonschema::defaults;

/// Where the upstream repository lives and which versions to take from it.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Working copy of the upstream repository
    #[arg(long, value_name = "PATH", env = "SPEC_JSONSCHEMA_WORK_DIR")]
    pub work_dir: Option<PathBuf>,

    /// Upstream repository URL
    #[arg(
        long = "repo",
        value_name = "URL",
        env = "SPEC_JSONSCHEMA_REPO",
        default_value = defaults::DEFAULT_REPO_URL
    )]
    pub repo_url: String,

    /// Process only this git reference instead of every release tag
    #[arg(long = "ref", value_name = "REF")]
    pub git_ref: Option<String>,

    /// Fetch from the remote before listing versions
    #[arg(long)]
    pub fetch: bool,
}

/// Bundling oracle selection.
#[derive(Args, Debug, Clone)]
pub struct ResolverArgs {
    /// Bundling oracle (native, command)
    #[arg(long, value_name = "KIND", default_value = "native")]
    pub resolver: ResolverKind,

    /// Program and leading arguments of the command oracle
    #[arg(long, value_name = "COMMAND", default_value = "jsonschema bundle")]
    pub resolver_command: String,

    /// Timeout of one command oracle invocation, in seconds
    #[arg(long, value_name = "SECS", default_value_t = defaults::DEFAULT_RESOLVER_TIMEOUT.as_secs())]
    pub resolver_timeout_secs: u64,
}

impl ResolverArgs {
    /// Copies the oracle settings into `config`.
    pub fn apply(&self, config: &mut Config) {
        config.resolver = self.resolver;
        config.resolver_command = split_command(&self.resolver_command);
        config.resolver_timeout = Duration::from_secs(self.resolver_timeout_secs);
    }
}

impl SourceArgs {
    /// Builds a configuration for this source writing to `output_dir`.
    pub fn to_config(&self, output_dir: PathBuf) -> Config {
        let work_dir = self
            .work_dir
            .clone()
            .unwrap_or_else(defaults::default_work_dir);
        let mut config = Config::new(work_dir, output_dir, self.repo_url.clone());
        config.git_ref = self.git_ref.clone();
        config.fetch = self.fetch;
        config
    }
}

/// An empty result is rejected later by `Config::validate`.
fn split_command(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}
