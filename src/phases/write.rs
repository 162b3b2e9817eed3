//! Phase 3: Writing to Disk
//!
//! Writes a version's multi-file corpus under `<output>/<version>/jsonschema`.
//!
//! ## Process
//!
//! 1.  **Clear**: the output directory is removed, so documents that are no
//!     longer in the corpus do not survive from an earlier run.
//!
//! 2.  **Create Directories**: parent directories of every document are
//!     created as needed.
//!
//! 3.  **Write Content**: each document is rendered with sorted keys and a
//!     trailing newline.
//!
//! Writes are not transactional. A failed run can leave a version partially
//! written; running again produces the same bytes.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::corpus::Corpus;
use crate::error::{Error, Result};

/// Execute Phase 3: replace the contents of `output_path` with `corpus`.
pub fn execute(corpus: &Corpus, output_path: &Path) -> Result<Vec<PathBuf>> {
    clear_dir(output_path)?;
    let written = corpus.write_dir(output_path)?;
    for path in &written {
        debug!("Wrote {}", path.display());
    }
    info!("Wrote {} documents to {}", written.len(), output_path.display());
    Ok(written)
}

/// Removes `dir` and everything under it. A missing directory is not an error.
pub fn clear_dir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {
            debug!("Cleared {}", dir.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io(dir, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::{clear_dir, execute};
    use crate::bundle::NativeResolver;
    use crate::corpus::Corpus;
    use crate::phases::bundling;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_phase3_write_nested_documents() {
        let temp_dir = TempDir::new().unwrap();
        let mut corpus = Corpus::new();
        corpus.insert("manifest.jsonschema.json", json!({"b": 1, "a": 2}));
        corpus.insert("integration/data_stream/fields.jsonschema.json", json!([]));

        let written = execute(&corpus, temp_dir.path()).unwrap();
        assert_eq!(written.len(), 2);
        assert!(temp_dir
            .path()
            .join("integration/data_stream/fields.jsonschema.json")
            .is_file());

        let content = fs::read_to_string(temp_dir.path().join("manifest.jsonschema.json")).unwrap();
        assert_eq!(content, "{\n  \"a\": 2,\n  \"b\": 1\n}\n");
    }

    #[test]
    fn test_phase3_write_is_repeatable() {
        let temp_dir = TempDir::new().unwrap();
        let mut corpus = Corpus::new();
        corpus.insert("a.jsonschema.json", json!({"$ref": "b.jsonschema.json#/x%5Ey"}));

        execute(&corpus, temp_dir.path()).unwrap();
        let first = fs::read(temp_dir.path().join("a.jsonschema.json")).unwrap();
        execute(&corpus, temp_dir.path()).unwrap();
        let second = fs::read(temp_dir.path().join("a.jsonschema.json")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_phase3_write_drops_documents_from_earlier_run() {
        let temp_dir = TempDir::new().unwrap();
        let multi = temp_dir.path().join("jsonschema");

        let mut corpus = Corpus::new();
        corpus.insert("a.jsonschema.json", json!({"type": "string"}));
        corpus.insert("removed/b.jsonschema.json", json!({"type": "object"}));
        execute(&corpus, &multi).unwrap();

        let mut corpus = Corpus::new();
        corpus.insert("a.jsonschema.json", json!({"type": "string"}));
        execute(&corpus, &multi).unwrap();

        assert!(!multi.join("removed").exists());
        let bundles = temp_dir.path().join("bundles");
        assert_eq!(bundling::execute(&NativeResolver, "1.0.0", &multi, &bundles).unwrap(), 1);
    }

    #[test]
    fn test_clear_dir_missing_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        clear_dir(&temp_dir.path().join("missing")).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_clear_dir_failure_names_path() {
        use crate::error::Error;
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let locked = temp_dir.path().join("locked");
        let target = locked.join("jsonschema");
        fs::create_dir_all(target.join("nested")).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        let result = clear_dir(&target);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        // Permission bits do not restrict root.
        if let Err(err) = result {
            assert!(matches!(err, Error::Io { ref path, .. } if path == &target));
        }
    }
}
