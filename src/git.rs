//! Thin wrappers over the system `git` command.
//!
//! Using the system binary means SSH keys, credential helpers and any
//! authentication configured in `~/.gitconfig` work without extra setup.
//! Every function operates on a local working copy; only `clone` and `fetch`
//! touch the network.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use crate::error::{Error, Result};

fn run_git(repo_dir: Option<&Path>, args: &[&str], url: &str) -> Result<Output> {
    let mut command = Command::new("git");
    if let Some(dir) = repo_dir {
        command.arg("-C").arg(dir);
    }
    command.args(args);

    let output = command.output().map_err(|e| Error::GitCommand {
        command: args.join(" "),
        url: url.to_string(),
        stderr: e.to_string(),
    })?;

    if !output.status.success() {
        return Err(Error::GitCommand {
            command: args.join(" "),
            url: url.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output)
}

/// Whether `dir` already holds a git working copy.
pub fn is_repository(dir: &Path) -> bool {
    dir.join(".git").exists()
}

/// Clone `url` into `target_dir` with full history and tags.
pub fn clone(url: &str, target_dir: &Path) -> Result<()> {
    // git won't clone into an existing non-empty directory
    if target_dir.exists() {
        fs::remove_dir_all(target_dir).map_err(|e| Error::io(target_dir, e))?;
    }
    if let Some(parent) = target_dir.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let target = target_dir.to_string_lossy();
    run_git(None, &["clone", "--no-checkout", url, &target], url).map_err(|e| match e {
        Error::GitCommand { stderr, .. } => Error::Retrieval {
            url: url.to_string(),
            message: describe_remote_failure(&stderr),
        },
        other => other,
    })?;

    Ok(())
}

/// Fetch branches and tags from `origin`, replacing moved tags.
pub fn fetch(repo_dir: &Path, url: &str) -> Result<()> {
    run_git(
        Some(repo_dir),
        &["fetch", "--tags", "--force", "--prune", "origin"],
        url,
    )
    .map_err(|e| match e {
        Error::GitCommand { stderr, .. } => Error::Retrieval {
            url: url.to_string(),
            message: describe_remote_failure(&stderr),
        },
        other => other,
    })?;
    Ok(())
}

/// List local tags as `(name, commit)` pairs.
///
/// Annotated tags are peeled to the commit they point at.
pub fn list_tags(repo_dir: &Path, url: &str) -> Result<Vec<(String, String)>> {
    let output = run_git(
        Some(repo_dir),
        &[
            "for-each-ref",
            "--format=%(refname:short)\t%(objectname)\t%(*objectname)",
            "refs/tags",
        ],
        url,
    )?;

    Ok(parse_tag_listing(&String::from_utf8_lossy(&output.stdout)))
}

fn parse_tag_listing(stdout: &str) -> Vec<(String, String)> {
    stdout
        .lines()
        .filter_map(|line| {
            // <name>\t<object>\t<peeled object, empty for lightweight tags>
            let mut parts = line.split('\t');
            let name = parts.next()?.trim();
            let object = parts.next()?.trim();
            let peeled = parts.next().map(str::trim).unwrap_or_default();
            if name.is_empty() || object.is_empty() {
                return None;
            }
            let commit = if peeled.is_empty() { object } else { peeled };
            Some((name.to_string(), commit.to_string()))
        })
        .collect()
}

/// Resolve `reference` to a commit hash.
pub fn resolve_revision(repo_dir: &Path, url: &str, reference: &str) -> Result<String> {
    let spec = format!("{}^{{commit}}", reference);
    let output = run_git(Some(repo_dir), &["rev-parse", "--verify", "--quiet", &spec], url)
        .map_err(|_| Error::Retrieval {
            url: url.to_string(),
            message: format!("reference '{}' cannot be resolved", reference),
        })?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Force the working tree to `commit`, detached, discarding local changes
/// and every untracked or ignored file.
pub fn checkout(repo_dir: &Path, url: &str, commit: &str) -> Result<()> {
    run_git(Some(repo_dir), &["clean", "--force", "-d", "-x", "--quiet"], url)?;
    run_git(
        Some(repo_dir),
        &["checkout", "--force", "--detach", commit],
        url,
    )?;
    Ok(())
}

fn describe_remote_failure(stderr: &str) -> String {
    if stderr.contains("Authentication failed")
        || stderr.contains("Permission denied")
        || stderr.contains("Could not read from remote repository")
    {
        format!(
            "Authentication failed. Make sure you have access to the repository.\n\
            Error: {}",
            stderr
        )
    } else {
        stderr.to_string()
    }
}
