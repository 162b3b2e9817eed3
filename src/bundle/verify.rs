//! Checks that a bundle is self-contained.
//!
//! A bundle passes when every `$ref` in it is a fragment that resolves inside
//! the bundle, and when it compiles as a JSON Schema with every attempt to
//! retrieve an external resource refused.

use std::path::Path;

use jsonschema::{Retrieve, Uri};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::patch::collect_references;
use crate::path::{is_pointer_fragment, percent_decode, split_reference};

/// Refuses every retrieval, so compilation only succeeds for closed bundles.
struct OfflineRetriever;

impl Retrieve for OfflineRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> std::result::Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("external retrieval of {} refused", uri.as_str()).into())
    }
}

/// Verifies the bundle produced for `entry`.
pub fn verify_bundle(entry: &Path, bundle: &Value) -> Result<()> {
    let failure = |message: String| Error::Bundling {
        entry: entry.to_path_buf(),
        message,
        retryable: false,
    };

    let mut references = Vec::new();
    collect_references(bundle, &mut references);
    for reference in references {
        let (base, fragment) = split_reference(reference);
        let Some(fragment) = fragment.filter(|_| base.is_empty()) else {
            return Err(failure(format!("bundle still references {}", reference)));
        };
        if !resolves_locally(bundle, fragment) {
            return Err(failure(format!("dangling reference {} in bundle", reference)));
        }
    }

    let mut options = jsonschema::options();
    options.with_retriever(OfflineRetriever);
    options
        .build(bundle)
        .map_err(|e| failure(format!("bundle does not compile: {}", e)))?;
    Ok(())
}

fn resolves_locally(bundle: &Value, fragment: &str) -> bool {
    let decoded = percent_decode(fragment);
    if is_pointer_fragment(&decoded) {
        bundle.pointer(&decoded).is_some()
    } else {
        has_anchor(bundle, &decoded)
    }
}

fn has_anchor(value: &Value, name: &str) -> bool {
    match value {
        Value::Object(map) => {
            map.get("$anchor").and_then(Value::as_str) == Some(name)
                || map.values().any(|child| has_anchor(child, name))
        }
        Value::Array(items) => items.iter().any(|item| has_anchor(item, name)),
        _ => false,
    }
}
