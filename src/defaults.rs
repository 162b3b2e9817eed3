//! Default values for spec-jsonschema configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;
use std::time::Duration;

/// JSON Schema dialect stamped into `$schema` unless overridden.
pub const DEFAULT_DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";

/// Prefix of every generated `$id` unless overridden.
pub const DEFAULT_BASE_URI: &str = "https://schemas.elastic.dev/package-spec";

/// Upstream repository holding the YAML specs.
pub const DEFAULT_REPO_URL: &str = "https://github.com/elastic/package-spec.git";

/// Upper bound for one invocation of the external bundling utility.
pub const DEFAULT_RESOLVER_TIMEOUT: Duration = Duration::from_secs(120);

/// Program and leading arguments of the external bundling utility.
pub fn default_resolver_command() -> Vec<String> {
    vec!["jsonschema".to_string(), "bundle".to_string()]
}

/// Returns the default working copy directory.
///
/// Uses the platform-appropriate cache directory:
/// - Linux: `~/.cache/spec-jsonschema/repo` (XDG Base Directory)
/// - macOS: `~/Library/Caches/spec-jsonschema/repo`
/// - Windows: `{FOLDERID_LocalAppData}\spec-jsonschema\repo`
///
/// Falls back to `.spec-jsonschema-cache/repo` in the current directory if
/// the platform cache directory cannot be determined.
///
/// This can be overridden by the `--work-dir` CLI flag or the
/// `SPEC_JSONSCHEMA_WORK_DIR` environment variable.
pub fn default_work_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("spec-jsonschema"))
        .unwrap_or_else(|| PathBuf::from(".spec-jsonschema-cache"))
        .join("repo")
}
