//! In-process bundling oracle.
//!
//! Starting at the entry document, every `$ref` is resolved against the
//! referencing document's URI, and each document reached is embedded in the
//! entry's `$defs` under its corpus-relative path. Documents are loaded
//! lazily from the resolution base and visited breadth-first, each once.
//!
//! The URI of a corpus document is its `$id` when that `$id` ends with the
//! document's relative path; the part before the relative path is then the
//! corpus prefix, and any absolute reference under that prefix is a corpus
//! document too. Without such an `$id` the synthetic prefix `corpus:///` is
//! used. A reference outside the prefix cannot be resolved offline and fails
//! the entry.
//!
//! With `omit_identity`, embedded documents lose `$id` and `$schema` and every
//! `$ref` is rewritten to a fragment of the bundle: `#/$defs/<path>/<pointer>`
//! for other documents and `#<pointer>` for the entry itself. Anchor
//! fragments are replaced by the pointer of the anchored subschema. Without
//! it, the result is a compound document whose embedded resources keep their
//! identity and whose references are left as written.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use url::Url;

use super::{ResolveOptions, SchemaResolver};
use crate::corpus::relative_key;
use crate::error::{Error, Result};
use crate::path::{escape_pointer_token, is_pointer_fragment, percent_decode, split_reference};

const ID: &str = "$id";
const REF: &str = "$ref";
const SCHEMA: &str = "$schema";
const DEFS: &str = "$defs";
const ANCHOR: &str = "$anchor";
const SYNTHETIC_PREFIX: &str = "corpus:///";

/// Resolves references by reading corpus documents directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeResolver;

impl SchemaResolver for NativeResolver {
    fn resolve(&self, entry: &Path, resolution_base: &Path, options: ResolveOptions) -> Result<Vec<u8>> {
        let entry_rel = relative_key(resolution_base, entry).ok_or_else(|| Error::Bundling {
            entry: entry.to_path_buf(),
            message: format!("entry is not under {}", resolution_base.display()),
            retryable: false,
        })?;

        let mut session = Session {
            entry,
            base: resolution_base,
            prefix: Url::parse(SYNTHETIC_PREFIX)?,
            documents: BTreeMap::new(),
        };
        let root = session.load(&entry_rel)?;
        if let Some(prefix) = corpus_prefix(&root, &entry_rel) {
            session.prefix = prefix;
        }
        session.documents.insert(entry_rel.clone(), root);

        session.discover(&entry_rel)?;
        if options.omit_identity {
            session.rewrite_references(&entry_rel)?;
        }
        let bundle = session.assemble(&entry_rel, options)?;

        Ok(serde_json::to_vec_pretty(&bundle)?)
    }
}

/// The state of one resolution. Nothing survives between invocations.
struct Session<'p> {
    entry: &'p Path,
    base: &'p Path,
    prefix: Url,
    documents: BTreeMap<String, Value>,
}

impl Session<'_> {
    fn fail(&self, message: String) -> Error {
        Error::Bundling {
            entry: self.entry.to_path_buf(),
            message,
            retryable: false,
        }
    }

    fn load(&self, rel: &str) -> Result<Value> {
        let path = self.base.join(rel);
        let content = fs::read_to_string(&path)
            .map_err(|e| self.fail(format!("cannot read referenced document {}: {}", rel, e)))?;
        serde_json::from_str(&content)
            .map_err(|e| self.fail(format!("referenced document {} is not JSON: {}", rel, e)))
    }

    /// Corpus path of the document `reference` points at, as seen from the
    /// document at `source`.
    fn target_of(&self, source: &str, reference: &str) -> Result<String> {
        let (base, _) = split_reference(reference);
        if base.is_empty() {
            return Ok(source.to_string());
        }

        let source_url = self.prefix.join(source)?;
        let mut target = source_url.join(base)?;
        target.set_fragment(None);
        target.set_query(None);

        match target.as_str().strip_prefix(self.prefix.as_str()) {
            Some(rel) if !rel.is_empty() => Ok(percent_decode(rel)),
            _ => Err(self.fail(format!(
                "reference {} in {} points outside the corpus",
                reference, source
            ))),
        }
    }

    /// Loads every document reachable from `entry_rel`.
    fn discover(&mut self, entry_rel: &str) -> Result<()> {
        let mut seen = BTreeSet::from([entry_rel.to_string()]);
        let mut queue = VecDeque::from([entry_rel.to_string()]);

        while let Some(rel) = queue.pop_front() {
            let references: Vec<String> = {
                let mut found = Vec::new();
                if let Some(document) = self.documents.get(&rel) {
                    crate::patch::collect_references(document, &mut found);
                }
                found.into_iter().map(str::to_string).collect()
            };

            for reference in references {
                let target = self.target_of(&rel, &reference)?;
                if seen.insert(target.clone()) {
                    let document = self.load(&target)?;
                    self.documents.insert(target.clone(), document);
                    queue.push_back(target);
                }
            }
        }

        Ok(())
    }

    /// Rewrites every `$ref` of every loaded document into a bundle fragment.
    fn rewrite_references(&mut self, entry_rel: &str) -> Result<()> {
        let mut anchors = BTreeMap::new();
        for (rel, document) in &self.documents {
            let mut tokens = Vec::new();
            collect_anchors(document, &mut tokens, &mut |name, pointer| {
                anchors.entry((rel.clone(), name.to_string())).or_insert(pointer);
            });
        }

        let mut rewritten = BTreeMap::new();
        for (rel, document) in &self.documents {
            let mut document = document.clone();
            let mut failure = None;
            rewrite_node(&mut document, &mut |reference| {
                match self.bundle_reference(entry_rel, rel, reference, &anchors) {
                    Ok(local) => Some(local),
                    Err(e) => {
                        failure.get_or_insert(e);
                        None
                    }
                }
            });
            if let Some(e) = failure {
                return Err(e);
            }
            rewritten.insert(rel.clone(), document);
        }

        self.documents = rewritten;
        Ok(())
    }

    fn bundle_reference(
        &self,
        entry_rel: &str,
        source: &str,
        reference: &str,
        anchors: &BTreeMap<(String, String), String>,
    ) -> Result<String> {
        let target = self.target_of(source, reference)?;
        let (_, fragment) = split_reference(reference);

        let pointer = match fragment {
            None => String::new(),
            Some(fragment) if is_pointer_fragment(fragment) => fragment.to_string(),
            Some(anchor) => anchors
                .get(&(target.clone(), percent_decode(anchor)))
                .cloned()
                .ok_or_else(|| {
                    self.fail(format!("anchor #{} not found in {}", anchor, target))
                })?,
        };

        if target == entry_rel {
            Ok(format!("#{}", pointer))
        } else {
            Ok(format!("#/{}/{}{}", DEFS, fragment_token(&target), pointer))
        }
    }

    /// Embeds every non-entry document into the entry's `$defs`.
    fn assemble(&mut self, entry_rel: &str, options: ResolveOptions) -> Result<Value> {
        let mut root = self
            .documents
            .remove(entry_rel)
            .ok_or_else(|| self.fail(format!("entry {} was not loaded", entry_rel)))?;
        let embedded = std::mem::take(&mut self.documents);
        if embedded.is_empty() {
            return Ok(root);
        }

        let Value::Object(root_map) = &mut root else {
            return Err(self.fail("entry document is not an object".to_string()));
        };
        let defs = root_map
            .entry(DEFS)
            .or_insert_with(|| Value::Object(Map::new()));
        let Value::Object(defs) = defs else {
            return Err(self.fail(format!("{} of the entry document is not an object", DEFS)));
        };

        for (rel, mut document) in embedded {
            if defs.contains_key(&rel) {
                return Err(self.fail(format!(
                    "{} of the entry document already defines {}",
                    DEFS, rel
                )));
            }
            if options.omit_identity {
                if let Value::Object(map) = &mut document {
                    map.remove(ID);
                    map.remove(SCHEMA);
                    map.remove(ANCHOR);
                }
            }
            defs.insert(rel, document);
        }

        Ok(root)
    }
}

/// The corpus prefix implied by the entry's `$id`, if it has a usable one.
fn corpus_prefix(entry: &Value, entry_rel: &str) -> Option<Url> {
    entry
        .get(ID)
        .and_then(Value::as_str)
        .and_then(|id| id.strip_suffix(entry_rel))
        .filter(|prefix| prefix.ends_with('/'))
        .and_then(|prefix| Url::parse(prefix).ok())
}

/// One pointer token in URI-fragment form.
fn fragment_token(token: &str) -> String {
    escape_pointer_token(token)
        .replace('%', "%25")
        .replace('^', "%5E")
        .replace(' ', "%20")
}

fn collect_anchors(value: &Value, tokens: &mut Vec<String>, found: &mut dyn FnMut(&str, String)) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(name)) = map.get(ANCHOR) {
                let pointer: String = tokens.iter().map(|t| format!("/{}", fragment_token(t))).collect();
                found(name, pointer);
            }
            for (key, child) in map {
                tokens.push(key.clone());
                collect_anchors(child, tokens, found);
                tokens.pop();
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                tokens.push(index.to_string());
                collect_anchors(child, tokens, found);
                tokens.pop();
            }
        }
        _ => {}
    }
}

/// Replaces every string `$ref` under `value` with what `rewrite` returns.
fn rewrite_node(value: &mut Value, rewrite: &mut dyn FnMut(&str) -> Option<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                match (key.as_str(), child) {
                    (REF, Value::String(reference)) => {
                        if let Some(local) = rewrite(reference) {
                            *reference = local;
                        }
                    }
                    (_, child) => rewrite_node(child, rewrite),
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(|item| rewrite_node(item, rewrite)),
        _ => {}
    }
}
