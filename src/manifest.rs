//! # Root Manifest Synthesis
//!
//! Package manifests have one schema per package type. When a version's
//! corpus has no hand-authored root `manifest.jsonschema.json`, this module
//! builds one that dispatches on the manifest's `type` property:
//!
//! ```json
//! {
//!   "required": ["type"],
//!   "properties": {"type": {"enum": ["input", "integration"]}},
//!   "allOf": [
//!     {"if": {...type == "input"...}, "then": {"$ref": "#/$defs/input-manifest"}},
//!     ...
//!   ],
//!   "$defs": {"input-manifest": {"$ref": "input/manifest.jsonschema.json"}}
//! }
//! ```
//!
//! Types are listed in lexicographic order so the output is deterministic.

use std::fmt;

use log::info;
use serde_json::{json, Map, Value};

use crate::config::{Config, OUTPUT_SUFFIX, ROOT_MANIFEST};
use crate::error::{Error, Result};

/// Package types that may have their own manifest schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ManifestType {
    Content,
    Input,
    Integration,
}

impl ManifestType {
    /// Every known type, in lexicographic order of their names.
    pub const ALL: [ManifestType; 3] = [
        ManifestType::Content,
        ManifestType::Input,
        ManifestType::Integration,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ManifestType::Content => "content",
            ManifestType::Input => "input",
            ManifestType::Integration => "integration",
        }
    }

    /// Corpus path of this type's manifest schema.
    pub fn manifest_path(self) -> String {
        format!("{}/manifest{}", self.as_str(), OUTPUT_SUFFIX)
    }

    fn definition_name(self) -> String {
        format!("{}-manifest", self.as_str())
    }
}

impl fmt::Display for ManifestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Manifest types with a per-type manifest among `paths`, sorted by name.
pub fn present_types<'p, I>(paths: I) -> Vec<ManifestType>
where
    I: IntoIterator<Item = &'p str>,
{
    let paths: Vec<&str> = paths.into_iter().collect();
    let mut types: Vec<ManifestType> = ManifestType::ALL
        .into_iter()
        .filter(|kind| {
            let suffix = kind.manifest_path();
            paths.iter().any(|path| path.ends_with(&suffix))
        })
        .collect();
    types.sort_by_key(|kind| kind.as_str());
    types
}

/// Builds the root manifest for `version` unless `written_paths` already
/// contains one.
///
/// Fails with a configuration error when no per-type manifest exists.
pub fn synthesize<'p, I>(config: &Config, version: &str, written_paths: I) -> Result<Option<Value>>
where
    I: IntoIterator<Item = &'p str>,
{
    let paths: Vec<&str> = written_paths.into_iter().collect();
    if paths.iter().any(|path| *path == ROOT_MANIFEST) {
        return Ok(None);
    }

    let types = present_types(paths.iter().copied());
    if types.is_empty() {
        return Err(Error::Configuration {
            message: format!("no manifest types found for version {}", version),
            hint: Some(format!(
                "expected at least one of: {}",
                ManifestType::ALL.map(ManifestType::manifest_path).join(", ")
            )),
        });
    }

    info!(
        "Synthesizing root manifest for {} over types [{}]",
        version,
        types.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(", ")
    );
    Ok(Some(build_manifest(config, version, &types)))
}

fn build_manifest(config: &Config, version: &str, types: &[ManifestType]) -> Value {
    let names: Vec<&str> = types.iter().map(|t| t.as_str()).collect();

    let branches: Vec<Value> = types
        .iter()
        .map(|kind| {
            json!({
                "if": {
                    "properties": {"type": {"const": kind.as_str()}},
                    "required": ["type"]
                },
                "then": {"$ref": format!("#/$defs/{}", kind.definition_name())}
            })
        })
        .collect();

    let mut defs = Map::new();
    for kind in types {
        defs.insert(
            kind.definition_name(),
            json!({"$ref": kind.manifest_path()}),
        );
    }

    json!({
        "$schema": config.dialect,
        "$id": config.document_id(version, ROOT_MANIFEST),
        "title": "Package manifest",
        "description": "Manifest of a package, validated against the schema of its type.",
        "type": "object",
        "required": ["type"],
        "properties": {
            "type": {
                "description": "Package type.",
                "type": "string",
                "enum": names
            }
        },
        "allOf": branches,
        "$defs": defs
    })
}
