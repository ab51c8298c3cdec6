//! # zkpip-cli: ZKPIP Command-Line Interface
//!
//! ## Subcommands
//!
//! - `zkpip keys`: generate, list, show and import keystore keys
//! - `zkpip vector`: seal, verify and digest JSON vectors
//! - `zkpip vectors`: content-addressed vector storage
//! - `zkpip verify`: verify proof bundles, singly or in batches
//! - `zkpip schema`: validate documents against registered schemas
//! - `zkpip adapters`: list registered adapters
//!
//! Handlers take parsed arguments and a [`CliContext`], print their result
//! to stdout as JSON, and return the mapped exit code. Business logic stays
//! in the library crates.

pub mod adapters;
pub mod config;
pub mod exit;
pub mod keys;
pub mod schema;
pub mod vector;
pub mod vectors;
pub mod verify;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use zkpip_crypto::{Keystore, VectorStore};
use zkpip_schema::SchemaRegistry;

use crate::config::ZkpipConfig;

/// Everything a handler needs besides its arguments.
#[derive(Debug, Clone)]
pub struct CliContext {
    pub config: ZkpipConfig,
    /// Directory relative paths and schema discovery start from.
    pub cwd: PathBuf,
}

impl CliContext {
    pub fn new(config: ZkpipConfig, cwd: PathBuf) -> Self {
        Self { config, cwd }
    }

    pub fn keystore(&self) -> Result<Keystore> {
        Keystore::with_key_id_length(self.resolve(&self.config.keys_dir), self.config.key_id_length)
            .context("invalid keystore configuration")
    }

    pub fn vector_store(&self) -> VectorStore {
        VectorStore::new(self.resolve(&self.config.vectors_dir))
    }

    /// Load the schema registry from the configured or discovered root.
    pub fn schema_registry(&self) -> Result<SchemaRegistry> {
        let dir = self
            .config
            .resolve_schemas_dir(&self.cwd)
            .map(|d| self.resolve(&d))
            .context("no schema directory found; set ZKPIP_SCHEMAS_DIR or --schemas-dir")?;
        SchemaRegistry::from_dir(&dir)
            .with_context(|| format!("failed to load schemas from {}", dir.display()))
    }

    /// Resolve a path against the working directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}

/// Read a JSON document; `.yaml`/`.yml` files are parsed as YAML.
pub fn read_document(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if yaml {
        serde_yaml::from_str(&text).with_context(|| format!("failed to parse YAML: {}", path.display()))
    } else {
        serde_json::from_str(&text).with_context(|| format!("failed to parse JSON: {}", path.display()))
    }
}

/// Print a value to stdout as pretty JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{text}");
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_relative_and_absolute() {
        let ctx = test_support::context(Path::new("/work"));
        assert_eq!(ctx.resolve(Path::new("a.json")), PathBuf::from("/work/a.json"));
        assert_eq!(ctx.resolve(Path::new("/x/a.json")), PathBuf::from("/x/a.json"));
    }

    #[test]
    fn read_document_yaml() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("v.yaml");
        std::fs::write(&path, "hello: world\n").unwrap();
        assert_eq!(read_document(&path).unwrap(), serde_json::json!({"hello": "world"}));
        assert!(read_document(&tmp.path().join("absent.json")).is_err());
    }

    #[test]
    fn shipped_schemas_load() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = test_support::context(tmp.path());
        assert_eq!(ctx.schema_registry().unwrap().len(), 6);
    }
}
