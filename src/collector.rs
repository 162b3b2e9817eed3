//! # Spec Collection
//!
//! Finds the YAML pseudo-schema documents of one source tree and decodes
//! them.
//!
//! The specs root is the first of `spec` and `versions/1` that exists in the
//! tree. Every file under it whose name ends in `.spec.yml` is read, its YAML
//! merge keys are applied, and the mapping under its top-level `spec` key is
//! converted to JSON. Anything else at the top level of the file is ignored.
//!
//! Files are returned in directory traversal order, sorted by file name at
//! each level, so repeated runs over the same tree agree.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde_json::Value;
use walkdir::WalkDir;

use crate::config::{INPUT_SUFFIX, SPEC_ROOT_CANDIDATES};
use crate::corpus::relative_key;
use crate::error::{Error, Result};

/// One decoded spec file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSpec {
    /// Path relative to the specs root, with `/` separators and the original
    /// `.spec.yml` suffix.
    pub relative_path: String,
    /// The JSON form of the file's `spec` mapping.
    pub body: Value,
}

/// Selects the specs root of `tree`.
pub fn find_spec_root(tree: &Path) -> Result<PathBuf> {
    SPEC_ROOT_CANDIDATES
        .iter()
        .map(|candidate| tree.join(candidate))
        .find(|path| path.is_dir())
        .ok_or_else(|| Error::Configuration {
            message: format!("no specs directory found in {}", tree.display()),
            hint: Some(format!(
                "expected one of: {}",
                SPEC_ROOT_CANDIDATES.join(", ")
            )),
        })
}

/// Collects every spec document of the tree rooted at `tree`.
pub fn collect(tree: &Path) -> Result<Vec<RawSpec>> {
    let spec_root = find_spec_root(tree)?;
    collect_from(&spec_root)
}

/// Collects every spec document under an already-selected specs root.
pub fn collect_from(spec_root: &Path) -> Result<Vec<RawSpec>> {
    let mut specs = Vec::new();

    for entry in WalkDir::new(spec_root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| spec_root.to_path_buf());
            Error::io(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        if !file_name.ends_with(INPUT_SUFFIX) {
            continue;
        }
        let Some(relative_path) = relative_key(spec_root, entry.path()) else {
            continue;
        };

        let content =
            fs::read_to_string(entry.path()).map_err(|e| Error::io(entry.path(), e))?;
        let body = decode_spec(Path::new(&relative_path), &content)?;
        debug!("Collected {}", relative_path);
        specs.push(RawSpec {
            relative_path,
            body,
        });
    }

    Ok(specs)
}

/// Decodes the content of one `.spec.yml` file and returns its `spec` body.
pub fn decode_spec(path: &Path, content: &str) -> Result<Value> {
    let format_error = |message: String| Error::Format {
        path: path.to_path_buf(),
        message,
    };

    let mut document: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| format_error(e.to_string()))?;
    document
        .apply_merge()
        .map_err(|e| format_error(e.to_string()))?;

    let spec = document
        .get("spec")
        .ok_or_else(|| format_error("missing top-level 'spec' key".to_string()))?;
    if !spec.is_mapping() {
        return Err(format_error(format!(
            "'spec' must be an object, found {}",
            yaml_kind(spec)
        )));
    }

    yaml_to_json_value(spec).map_err(format_error)
}

fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a sequence",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Map keys that are numbers or booleans become their string form. Tags are
/// dropped in favour of the inner value.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> std::result::Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(i.into()))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(u.into()))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {} in JSON", f))
            } else {
                Err(format!("unsupported YAML number: {:?}", n))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => seq
            .iter()
            .map(yaml_to_json_value)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key: {:?}", other)),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_find_spec_root_prefers_spec_dir() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("spec")).unwrap();
        fs::create_dir_all(temp_dir.path().join("versions/1")).unwrap();
        assert_eq!(
            find_spec_root(temp_dir.path()).unwrap(),
            temp_dir.path().join("spec")
        );
    }

    #[test]
    fn test_find_spec_root_falls_back_to_legacy_location() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("versions/1")).unwrap();
        assert_eq!(
            find_spec_root(temp_dir.path()).unwrap(),
            temp_dir.path().join("versions/1")
        );
    }

    #[test]
    fn test_find_spec_root_missing_is_configuration_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = find_spec_root(temp_dir.path()).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_collect_only_spec_files_in_traversal_order() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "spec/manifest.spec.yml", "spec:\n  type: object\n");
        write(root, "spec/input/manifest.spec.yml", "spec:\n  type: object\n");
        write(root, "spec/changelog.yml", "- version: 1.0.0\n");
        write(root, "spec/README.md", "# specs\n");

        let specs = collect(root).unwrap();
        let paths: Vec<&str> = specs.iter().map(|s| s.relative_path.as_str()).collect();
        assert_eq!(paths, vec!["input/manifest.spec.yml", "manifest.spec.yml"]);
        assert_eq!(specs[0].body, json!({"type": "object"}));
    }

    #[test]
    fn test_decode_spec_ignores_other_top_level_keys() {
        let body = decode_spec(
            Path::new("a.spec.yml"),
            "copyright: Elastic\nspec:\n  type: string\nversions:\n  - before: 2.0.0\n",
        )
        .unwrap();
        assert_eq!(body, json!({"type": "string"}));
    }

    #[test]
    fn test_decode_spec_applies_merge_keys() {
        let content = r#"
spec:
  $defs:
    base: &base
      type: object
      additionalProperties: false
    derived:
      <<: *base
      required: [name]
"#;
        let body = decode_spec(Path::new("a.spec.yml"), content).unwrap();
        assert_eq!(
            body["$defs"]["derived"],
            json!({"type": "object", "additionalProperties": false, "required": ["name"]})
        );
    }

    #[test]
    fn test_decode_spec_stringifies_scalar_keys() {
        let body = decode_spec(Path::new("a.spec.yml"), "spec:\n  200: ok\n  true: yes\n").unwrap();
        assert_eq!(body, json!({"200": "ok", "true": "yes"}));
    }

    #[test]
    fn test_decode_spec_missing_spec_key() {
        let err = decode_spec(Path::new("input/manifest.spec.yml"), "type: object\n").unwrap_err();
        assert!(matches!(err, Error::Format { .. }));
        assert!(err.to_string().contains("input/manifest.spec.yml"));
    }

    #[test]
    fn test_decode_spec_non_object_spec() {
        let err = decode_spec(Path::new("a.spec.yml"), "spec:\n  - one\n").unwrap_err();
        assert!(err.to_string().contains("'spec' must be an object"));
    }

    #[test]
    fn test_decode_spec_invalid_yaml_names_file() {
        let err = decode_spec(Path::new("broken.spec.yml"), "spec: [unclosed").unwrap_err();
        assert!(matches!(err, Error::Format { .. }));
        assert!(err.to_string().contains("broken.spec.yml"));
    }
}
