//! # Spec JSON Schema CLI
//!
//! This is the binary entry point for the `spec-jsonschema` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging and executing the selected command.
//! - Reporting a failed run as a single message on stderr with a non-zero
//!   exit status.
//!
//! The generation logic lives in the `spec_jsonschema` library crate; the
//! binary is a thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
