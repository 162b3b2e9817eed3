//! # Schema Patching
//!
//! Turns a decoded spec body into an addressable JSON Schema document.
//!
//! ## Steps
//!
//! 1.  `$schema` is set to the run's dialect.
//! 2.  `$id` is set to `<base>/<version>/<relative path>`, with the path's
//!     `.spec.yml` suffix rewritten to `.jsonschema.json`.
//! 3.  The whole tree is walked once, applying the node rules:
//!     - a `$id` on any object other than the root is removed;
//!     - a string `$ref` has its `.spec.yml` suffix rewritten and every `^` in
//!       its fragment percent-encoded;
//!     - `additionalProperties: true` is removed, since it is the default.
//!
//! Patching is idempotent: a patched document patches to itself.
//!
//! After a version's corpus is patched, `dangling_references` reports every
//! relative `$ref` whose target document is not part of the corpus.

use log::debug;
use serde_json::{Map, Value};
use url::Url;

use crate::config::Config;
use crate::corpus::Corpus;
use crate::error::Result;
use crate::path::{encode_fragment_carets, rewrite_suffix, split_reference};

const ID: &str = "$id";
const REF: &str = "$ref";
const SCHEMA: &str = "$schema";
const ADDITIONAL_PROPERTIES: &str = "additionalProperties";

/// Applies the document-level and node-level patch rules.
#[derive(Debug, Clone)]
pub struct SchemaPatcher<'a> {
    config: &'a Config,
    version: &'a str,
}

impl<'a> SchemaPatcher<'a> {
    pub fn new(config: &'a Config, version: &'a str) -> Self {
        Self { config, version }
    }

    /// Patches one document. Returns the rewritten relative path and the
    /// patched content.
    ///
    /// The body must be an object; the collector guarantees this for spec
    /// files.
    pub fn patch(&self, relative_path: &str, mut body: Value) -> (String, Value) {
        let output_path = rewrite_suffix(relative_path);

        patch_node(&mut body, true);
        if let Value::Object(root) = &mut body {
            root.insert(SCHEMA.to_string(), Value::String(self.config.dialect.clone()));
            root.insert(
                ID.to_string(),
                Value::String(self.config.document_id(self.version, &output_path)),
            );
        }

        debug!("Patched {} -> {}", relative_path, output_path);
        (output_path, body)
    }

    /// Patches every document of a version into a corpus.
    pub fn patch_all<I>(&self, specs: I) -> Corpus
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        specs
            .into_iter()
            .map(|(path, body)| self.patch(&path, body))
            .collect()
    }
}

/// Applies the node rules to `value` and everything below it.
///
/// `is_root` is true only for the document root, which keeps its `$id`.
pub fn patch_node(value: &mut Value, is_root: bool) {
    match value {
        Value::Object(map) => patch_object(map, is_root),
        Value::Array(items) => items.iter_mut().for_each(|item| patch_node(item, false)),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
}

fn patch_object(map: &mut Map<String, Value>, is_root: bool) {
    if !is_root {
        map.remove(ID);
    }

    if matches!(map.get(ADDITIONAL_PROPERTIES), Some(Value::Bool(true))) {
        map.remove(ADDITIONAL_PROPERTIES);
    }

    for (key, child) in map.iter_mut() {
        match (key.as_str(), child) {
            (REF, Value::String(reference)) => *reference = rewrite_reference(reference),
            // A non-string `$ref` is malformed but left as it is, contents included.
            (REF, _) => {}
            (_, child) => patch_node(child, false),
        }
    }
}

/// Rewrites a `$ref` value: output suffix on the base, `^` encoded in the
/// fragment.
pub fn rewrite_reference(reference: &str) -> String {
    let (base, fragment) = split_reference(reference);
    let base = rewrite_suffix(base);
    match fragment {
        Some(fragment) => format!("{}#{}", base, encode_fragment_carets(fragment)),
        None => base,
    }
}

/// A relative `$ref` whose target document is missing from the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    /// Document containing the reference.
    pub source: String,
    /// The `$ref` value.
    pub reference: String,
    /// Corpus path the reference resolves to.
    pub target: String,
}

/// Finds every relative `$ref` in `corpus` that points at a document the
/// corpus does not contain. Absolute references are treated as
/// intentionally external.
pub fn dangling_references(corpus: &Corpus) -> Result<Vec<DanglingReference>> {
    // Any hierarchical base works; only the path part is compared.
    let root = Url::parse("corpus:///")?;
    let mut dangling = Vec::new();

    for (source, document) in corpus.iter() {
        let source_url = root.join(source)?;
        let mut references = Vec::new();
        collect_references(document, &mut references);

        for reference in references {
            let (base, _) = split_reference(reference);
            if base.is_empty() || Url::parse(base).is_ok() {
                continue;
            }
            let target_url = source_url.join(base)?;
            let target = target_url.path().trim_start_matches('/').to_string();
            if !corpus.contains(&target) {
                dangling.push(DanglingReference {
                    source: source.to_string(),
                    reference: reference.to_string(),
                    target,
                });
            }
        }
    }

    Ok(dangling)
}

/// Pushes every string `$ref` value found under `value`.
pub fn collect_references<'v>(value: &'v Value, out: &mut Vec<&'v str>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match (key.as_str(), child) {
                    (REF, Value::String(reference)) => out.push(reference),
                    (REF, _) => {}
                    (_, child) => collect_references(child, out),
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_references(item, out)),
        _ => {}
    }
}
