//! Phase 2: Transform
//!
//! Turns a version snapshot into its multi-file corpus.
//!
//! ## Process
//!
//! 1.  **Patch**: every collected spec body is patched into an addressable
//!     JSON Schema document under its rewritten path.
//!
//! 2.  **Reference check**: relative references to documents missing from the
//!     corpus are logged. They are not fatal; bundling will report them if an
//!     entry actually reaches one.
//!
//! 3.  **Root manifest**: when the corpus has no `manifest.jsonschema.json`, a
//!     dispatching root manifest is synthesized and added to it.

use log::{info, warn};

use super::{PatchedVersion, VersionSnapshot};
use crate::config::{Config, ROOT_MANIFEST};
use crate::error::Result;
use crate::manifest;
use crate::patch::{dangling_references, SchemaPatcher};

/// Execute Phase 2 for one snapshot.
pub fn execute(config: &Config, snapshot: VersionSnapshot) -> Result<PatchedVersion> {
    let VersionSnapshot { version, specs } = snapshot;
    let label = version.label.as_str();

    let patcher = SchemaPatcher::new(config, label);
    let mut corpus = patcher.patch_all(specs.into_iter().map(|spec| (spec.relative_path, spec.body)));

    let dangling = dangling_references(&corpus)?;
    for reference in &dangling {
        warn!(
            "{}: {} references {}, which is not part of the corpus",
            label, reference.source, reference.reference
        );
    }

    let synthesized = manifest::synthesize(config, label, corpus.paths())?;
    let manifest_synthesized = synthesized.is_some();
    if let Some(root_manifest) = synthesized {
        corpus.insert(ROOT_MANIFEST, root_manifest);
    }

    info!("Patched {} documents for {}", corpus.len(), label);
    Ok(PatchedVersion {
        version,
        corpus,
        manifest_synthesized,
        dangling,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::RawSpec;
    use crate::error::Error;
    use crate::version::SpecVersion;
    use serde_json::json;

    fn config() -> Config {
        let mut config = Config::new("/tmp/work", "/tmp/out", "https://example.com/spec.git");
        config.base_uri = "https://schemas.example.org/spec".to_string();
        config
    }

    fn snapshot(specs: Vec<(&str, serde_json::Value)>) -> VersionSnapshot {
        VersionSnapshot {
            version: SpecVersion::explicit("v3.0.0", "c0ffee"),
            specs: specs
                .into_iter()
                .map(|(path, body)| RawSpec {
                    relative_path: path.to_string(),
                    body,
                })
                .collect(),
        }
    }

    #[test]
    fn test_transform_synthesizes_missing_root_manifest() {
        let patched = execute(
            &config(),
            snapshot(vec![
                ("input/manifest.spec.yml", json!({"type": "object"})),
                ("integration/manifest.spec.yml", json!({"type": "object"})),
            ]),
        )
        .unwrap();

        assert!(patched.manifest_synthesized);
        assert_eq!(patched.corpus.len(), 3);
        let root = patched.corpus.get(ROOT_MANIFEST).unwrap();
        assert_eq!(root["properties"]["type"]["enum"], json!(["input", "integration"]));
        assert_eq!(
            root["$id"],
            json!("https://schemas.example.org/spec/v3.0.0/manifest.jsonschema.json")
        );
    }

    #[test]
    fn test_transform_keeps_authored_root_manifest() {
        let patched = execute(
            &config(),
            snapshot(vec![
                ("manifest.spec.yml", json!({"title": "authored"})),
                ("integration/manifest.spec.yml", json!({})),
            ]),
        )
        .unwrap();

        assert!(!patched.manifest_synthesized);
        assert_eq!(
            patched.corpus.get(ROOT_MANIFEST).unwrap()["title"],
            json!("authored")
        );
    }

    #[test]
    fn test_transform_reports_dangling_references() {
        let patched = execute(
            &config(),
            snapshot(vec![(
                "integration/manifest.spec.yml",
                json!({"$ref": "./missing.spec.yml"}),
            )]),
        )
        .unwrap();
        assert_eq!(patched.dangling.len(), 1);
        assert_eq!(patched.dangling[0].target, "integration/missing.jsonschema.json");
    }

    #[test]
    fn test_transform_without_manifest_types_fails() {
        let err = execute(&config(), snapshot(vec![("fields.spec.yml", json!({}))])).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }
}
