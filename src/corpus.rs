//! In-memory set of schema documents for one version.
//!
//! A `Corpus` maps a document's path relative to the corpus root (always with
//! `/` separators) to its JSON content. Keys are kept sorted so that
//! iteration, and therefore everything written from a corpus, is
//! deterministic.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use walkdir::WalkDir;

use crate::config::OUTPUT_SUFFIX;
use crate::error::{Error, Result};

/// Schema documents keyed by relative path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    documents: BTreeMap<String, Value>,
}

impl Corpus {
    /// Create an empty corpus
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a document
    pub fn insert(&mut self, relative_path: impl Into<String>, document: Value) {
        self.documents.insert(relative_path.into(), document);
    }

    /// Get a document by relative path
    pub fn get(&self, relative_path: &str) -> Option<&Value> {
        self.documents.get(relative_path)
    }

    /// Check if a document exists
    pub fn contains(&self, relative_path: &str) -> bool {
        self.documents.contains_key(relative_path)
    }

    /// Relative paths in sorted order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    /// Iterate over `(relative path, document)` pairs in sorted order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.documents.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Get the number of documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if the corpus is empty
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Loads every `*.jsonschema.json` file under `root`.
    pub fn load_dir(root: &Path) -> Result<Self> {
        let mut corpus = Corpus::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                Error::io(path, e.into())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(relative) = relative_key(root, entry.path()) else {
                continue;
            };
            if !relative.ends_with(OUTPUT_SUFFIX) {
                continue;
            }

            let content = fs::read_to_string(entry.path()).map_err(|e| Error::io(entry.path(), e))?;
            let document: Value = serde_json::from_str(&content).map_err(|e| Error::Format {
                path: entry.path().to_path_buf(),
                message: e.to_string(),
            })?;
            corpus.insert(relative, document);
        }

        Ok(corpus)
    }

    /// Writes every document under `root`, creating directories as needed and
    /// overwriting existing files.
    pub fn write_dir(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.len());
        for (relative_path, document) in self.iter() {
            let full_path = root.join(relative_path);
            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
            fs::write(&full_path, render(document)?).map_err(|e| Error::io(&full_path, e))?;
            written.push(full_path);
        }
        Ok(written)
    }
}

impl FromIterator<(String, Value)> for Corpus {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            documents: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Corpus {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_iter()
    }
}

/// Serializes a document the way every output file is written: sorted keys,
/// two-space indentation, trailing newline.
pub fn render(document: &Value) -> Result<String> {
    let mut text = serde_json::to_string_pretty(document)?;
    text.push('\n');
    Ok(text)
}

/// `path` relative to `root`, with `/` separators.
pub fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
