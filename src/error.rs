//! # Error Handling
//!
//! This module defines the centralized error type for `spec-jsonschema`. It
//! uses `thiserror` to describe every failure class the generation pipeline
//! can hit, each variant carrying the context (URL, path, entry file) needed
//! to act on it.
//!
//! ## Taxonomy
//!
//! - **Retrieval**: the upstream repository is unreachable or a reference
//!   cannot be resolved. Fatal for the run.
//! - **Configuration**: no specs directory, no manifest types, or an invalid
//!   run configuration. Fatal for the affected version.
//! - **Format**: a `.spec.yml` file is undecodable or its `spec` root is not
//!   an object. Names the file.
//! - **Bundling**: the resolution oracle failed for an entry file. Keeps the
//!   oracle's own diagnostic text.
//! - **Io**: a read or write failed, with the path that was being touched.
//!
//! The `Result` alias is used across the library so that errors propagate
//! with `?` and are only rendered once, by the binary.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for spec-jsonschema operations
#[derive(Error, Debug)]
pub enum Error {
    /// The remote repository could not be reached or a reference could not
    /// be resolved to a commit.
    #[error("Retrieval error for {url}: {message}")]
    Retrieval { url: String, message: String },

    /// A git subprocess exited unsuccessfully.
    #[error("Git command failed for {url}: {command} - {stderr}")]
    GitCommand {
        command: String,
        url: String,
        stderr: String,
    },

    /// The run or a version's source tree is not configured the way the
    /// pipeline expects.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Configuration {
        message: String,
        /// Optional hint for how to fix the problem
        hint: Option<String>,
    },

    /// A spec document could not be decoded or has the wrong shape.
    #[error("Format error in {}: {message}", path.display())]
    Format { path: PathBuf, message: String },

    /// The bundling oracle failed for one entry document.
    ///
    /// `retryable` marks transient failures (timeouts, spawn failures) as
    /// opposed to problems with the schema content itself.
    #[error("Bundling error for {}: {message}", entry.display())]
    Bundling {
        entry: PathBuf,
        message: String,
        retryable: bool,
    },

    /// An I/O error with the path being read or written.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An I/O error without path context, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    IoBare(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON (de)serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// A semantic versioning parsing error, wrapped from `semver::Error`.
    #[error("Semver parsing error: {0}")]
    Semver(#[from] semver::Error),

    /// An error indicating that a mutex or other lock has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },
}

impl Error {
    /// Wraps an `std::io::Error` with the path that was being accessed.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a configuration error without a hint.
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            hint: None,
        }
    }

    /// Whether retrying the failed operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Bundling {
                retryable: true,
                ..
            }
        )
    }

    /// Whether this error only affects a single version and may be isolated
    /// to it when the run is asked to keep going.
    pub fn is_version_scoped(&self) -> bool {
        matches!(self, Error::Configuration { .. })
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
