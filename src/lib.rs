//! # Spec JSON Schema Library
//!
//! This library turns the YAML pseudo-schemas of a versioned package
//! specification repository into JSON Schema. It is used by the
//! `spec-jsonschema` command-line tool but can also be driven directly.
//!
//! ## Quick Example
//!
//! ```
//! use serde_json::json;
//! use spec_jsonschema::config::Config;
//! use spec_jsonschema::patch::SchemaPatcher;
//!
//! let config = Config::new("/tmp/work", "/tmp/out", "https://example.com/spec.git");
//! let patcher = SchemaPatcher::new(&config, "3.0.0");
//!
//! let (path, document) = patcher.patch(
//!     "integration/manifest.spec.yml",
//!     json!({"additionalProperties": true, "$ref": "foo.spec.yml#/bar^baz"}),
//! );
//!
//! assert_eq!(path, "integration/manifest.jsonschema.json");
//! assert!(document.get("additionalProperties").is_none());
//! assert_eq!(document["$ref"], "foo.jsonschema.json#/bar%5Ebaz");
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: one explicit value carrying the dialect,
//!   base URI, directories and oracle settings into every stage.
//! - **Versions (`version`, `repository`, `git`)**: release tag discovery and
//!   serialized checkouts of the upstream working copy.
//! - **Collection (`collector`)**: finding and decoding `.spec.yml` files.
//! - **Patching (`patch`)**: making each document an addressable JSON Schema.
//! - **Manifest synthesis (`manifest`)**: the type-dispatching root manifest.
//! - **Bundling (`bundle`)**: self-contained single-file documents, produced
//!   through a swappable resolution oracle and verified offline.
//! - **Phases (`phases`)**: the per-version pipeline and its orchestration.
//!
//! ## Execution Flow
//!
//! The main entry point is `phases::orchestrator::execute_generate`, which
//! for every selected version:
//!
//! 1.  **Snapshot**: checks the version out and collects its specs.
//! 2.  **Transform**: patches the documents and synthesizes the root manifest.
//! 3.  **Disk Output**: writes `<output>/<version>/jsonschema`.
//! 4.  **Bundling**: writes `<output>/<version>/bundles`.

pub mod bundle;
pub mod collector;
pub mod config;
pub mod corpus;
pub mod defaults;
pub mod error;
pub mod git;
pub mod manifest;
pub mod output;
pub mod patch;
pub mod path;
pub mod phases;
pub mod repository;
pub mod version;

#[cfg(test)]
mod path_proptest;
