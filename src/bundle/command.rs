//! Bundling through an external command.
//!
//! The command is invoked as
//! `<program> <args>... <entry> --resolve <resolution base> [--without-id]`
//! and must print the bundled document on stdout. Its stderr is kept for the
//! error message when it exits unsuccessfully.
//!
//! Each invocation is bounded by a timeout; a process that overruns is
//! killed. Timeouts and failures to start the process are reported as
//! retryable, a non-zero exit is not.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::debug;
use wait_timeout::ChildExt;

use super::{ResolveOptions, SchemaResolver};
use crate::error::{Error, Result};

/// Runs an external bundling utility once per entry.
#[derive(Debug, Clone)]
pub struct CommandResolver {
    command: Vec<String>,
    timeout: Duration,
}

impl CommandResolver {
    /// `command` is the program followed by its leading arguments.
    pub fn new(command: Vec<String>, timeout: Duration) -> Self {
        Self { command, timeout }
    }

    fn arguments(&self, entry: &Path, resolution_base: &Path, options: ResolveOptions) -> Vec<String> {
        let mut args: Vec<String> = self.command.iter().skip(1).cloned().collect();
        args.push(entry.display().to_string());
        args.push("--resolve".to_string());
        args.push(resolution_base.display().to_string());
        if options.omit_identity {
            args.push("--without-id".to_string());
        }
        args
    }
}

impl SchemaResolver for CommandResolver {
    fn resolve(&self, entry: &Path, resolution_base: &Path, options: ResolveOptions) -> Result<Vec<u8>> {
        let failure = |message: String, retryable: bool| Error::Bundling {
            entry: entry.to_path_buf(),
            message,
            retryable,
        };

        let program = self
            .command
            .first()
            .ok_or_else(|| failure("no resolver command configured".to_string(), false))?;
        let args = self.arguments(entry, resolution_base, options);
        debug!("Running {} {}", program, args.join(" "));

        let mut child = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| failure(format!("failed to start {}: {}", program, e), true))?;

        // Both pipes are drained while waiting so a large bundle cannot fill
        // the pipe buffer and stall the child.
        let stdout = drain(&mut child, Pipe::Stdout);
        let stderr = drain(&mut child, Pipe::Stderr);

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(failure(
                    format!("{} timed out after {}s", program, self.timeout.as_secs()),
                    true,
                ));
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(failure(format!("failed to wait for {}: {}", program, e), true));
            }
        };

        let stdout = collect(stdout).map_err(|e| failure(format!("reading stdout: {}", e), true))?;
        let stderr = collect(stderr).map_err(|e| failure(format!("reading stderr: {}", e), true))?;

        if !status.success() {
            return Err(failure(
                format!(
                    "{} exited with {}: {}",
                    program,
                    status,
                    String::from_utf8_lossy(&stderr).trim()
                ),
                false,
            ));
        }

        Ok(stdout)
    }
}

enum Pipe {
    Stdout,
    Stderr,
}

fn drain(child: &mut Child, pipe: Pipe) -> Option<JoinHandle<std::io::Result<Vec<u8>>>> {
    let mut reader: Box<dyn Read + Send> = match pipe {
        Pipe::Stdout => Box::new(child.stdout.take()?),
        Pipe::Stderr => Box::new(child.stderr.take()?),
    };
    Some(thread::spawn(move || {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        Ok(buffer)
    }))
}

fn collect(handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>) -> std::io::Result<Vec<u8>> {
    match handle {
        Some(handle) => handle
            .join()
            .unwrap_or_else(|_| Err(std::io::Error::other("pipe reader panicked"))),
        None => Ok(Vec::new()),
    }
}
