//! Reading JSON and YAML documents from disk.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::SchemaRegistryError;

/// Load a document as a JSON value. `.yaml`/`.yml` files are parsed as YAML;
/// everything else as JSON.
pub fn load_document(path: &Path) -> Result<Value, SchemaRegistryError> {
    let load_err = |reason: String| SchemaRegistryError::Load {
        path: path.display().to_string(),
        reason,
    };
    let text = std::fs::read_to_string(path).map_err(io_err(path))?;
    if is_yaml(path) {
        serde_yaml::from_str(&text).map_err(|e| load_err(format!("invalid YAML: {e}")))
    } else {
        serde_json::from_str(&text).map_err(|e| load_err(format!("invalid JSON: {e}")))
    }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> SchemaRegistryError + '_ {
    move |source| SchemaRegistryError::Io {
        path: path.to_path_buf(),
        source,
    }
}

const SCHEMA_SUFFIXES: [&str; 3] = [".schema.json", ".schema.yaml", ".schema.yml"];

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Every `*.schema.json`, `*.schema.yaml` and `*.schema.yml` file under
/// `dir`, recursively, sorted by path.
pub(crate) fn schema_files(dir: &Path) -> Result<Vec<PathBuf>, SchemaRegistryError> {
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let entries = std::fs::read_dir(&current).map_err(io_err(&current))?;
        for entry in entries {
            let entry = entry.map_err(io_err(&current))?;
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| SCHEMA_SUFFIXES.iter().any(|s| n.ends_with(s)))
            {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}
