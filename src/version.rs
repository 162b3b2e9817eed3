//! # Version Discovery
//!
//! This module turns the tag list of the upstream repository into the ordered
//! list of spec versions a run generates.
//!
//! ## Process
//!
//! 1.  **Tag Filtering**: only tags of the form `v<semver>` are considered.
//!     Tags without the `v` prefix, or whose remainder is not a full
//!     `major.minor.patch` version, are discarded.
//!
//! 2.  **Release Selection**: versions with a pre-release component
//!     (e.g. `v2.0.0-beta1`) are discarded. They can still be generated by
//!     asking for them explicitly with `--ref`.
//!
//! 3.  **Ordering**: the remaining versions are sorted by semantic-version
//!     comparison, so `v1.10.0` comes after `v1.3.0`.

use std::cmp::Ordering;
use std::fmt;

use semver::Version;

/// A version of the spec paired with the source-tree state it comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecVersion {
    /// Label used for output directories and `$id`s. For discovered tags this
    /// is the semver without the `v` prefix; for an explicit reference it is
    /// the reference itself.
    pub label: String,
    /// Parsed version, absent when an explicit reference is not semver.
    pub semver: Option<Version>,
    /// Git reference that is checked out for this version.
    pub git_ref: String,
    /// Commit hash the reference pointed at when the version was listed.
    pub commit: String,
}

impl SpecVersion {
    /// A version discovered from a release tag.
    pub fn from_tag(tag: &str, version: Version, commit: impl Into<String>) -> Self {
        Self {
            label: version.to_string(),
            semver: Some(version),
            git_ref: tag.to_string(),
            commit: commit.into(),
        }
    }

    /// A version requested explicitly. The label is the literal reference.
    pub fn explicit(git_ref: &str, commit: impl Into<String>) -> Self {
        Self {
            label: git_ref.to_string(),
            semver: parse_release_tag(git_ref),
            git_ref: git_ref.to_string(),
            commit: commit.into(),
        }
    }
}

impl PartialOrd for SpecVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SpecVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.semver, &other.semver) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.label.cmp(&other.label),
        }
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Parse a `v<semver>` tag. Returns `None` for anything else.
pub fn parse_release_tag(tag: &str) -> Option<Version> {
    let tag = tag.strip_prefix("refs/tags/").unwrap_or(tag);
    tag.strip_prefix('v')
        .and_then(|version_str| Version::parse(version_str).ok())
}

/// Select the stable release versions from `(tag, commit)` pairs, sorted
/// ascending.
pub fn select_release_versions(tags: &[(String, String)]) -> Vec<SpecVersion> {
    let mut versions: Vec<SpecVersion> = tags
        .iter()
        .filter_map(|(tag, commit)| {
            parse_release_tag(tag)
                .filter(|version| version.pre.is_empty())
                .map(|version| SpecVersion::from_tag(tag, version, commit.clone()))
        })
        .collect();

    versions.sort();
    versions.dedup_by(|a, b| a.semver == b.semver);
    versions
}
