//! # Vector Store
//!
//! A flat directory of JSON vectors, one file per id. Content-addressed
//! vectors are filed under their [`VectorUrn`]; callers may also file a
//! vector under an arbitrary id.
//!
//! ## Integrity Invariant
//!
//! When a vector is read back under a vector URN, its canonical digest is
//! recomputed and compared with the URN. Corruption or substitution is
//! detected at read time.
//!
//! Files are written to a temporary file in the store directory and renamed
//! into place, so a reader never sees a partial vector. A content-addressed
//! file whose bytes no longer match its URN is rewritten by the next `put`.
//!
//! ## File Names
//!
//! The filename is the id with every character outside `[A-Za-z0-9:._-]`
//! replaced by `_`, suffixed with `.json`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::NamedTempFile;
use zkpip_core::{digest_value, CanonicalBytes, VectorUrn};

use crate::error::VectorStoreError;

/// Map an id to its on-disk stem.
pub fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, ':' | '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// A vector store backed by one directory.
#[derive(Debug, Clone)]
pub struct VectorStore {
    root: PathBuf,
}

impl VectorStore {
    /// A store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the vector with this id lives.
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_id(id)))
    }

    /// Store a vector under its content URN. Storing the same content twice
    /// leaves the existing file untouched; a damaged file is replaced.
    pub fn put(&self, value: &Value) -> Result<VectorUrn, VectorStoreError> {
        let urn = digest_value(value).to_urn();
        let path = self.path_for(urn.as_str());
        self.ensure_root()?;

        if path.exists() {
            if holds(&path, &urn) {
                tracing::debug!(%urn, "vector already stored");
                return Ok(urn);
            }
            tracing::warn!(%urn, path = %path.display(), "replacing damaged vector file");
        }
        self.write_atomic(&path, &CanonicalBytes::from_value(value))?;
        tracing::debug!(%urn, "stored vector");
        Ok(urn)
    }

    /// Store a vector under a caller-chosen id, replacing any previous file.
    pub fn put_with_id(&self, id: &str, value: &Value) -> Result<PathBuf, VectorStoreError> {
        if id.trim().is_empty() {
            return Err(VectorStoreError::EmptyId);
        }
        self.ensure_root()?;
        let path = self.path_for(id);
        self.write_atomic(&path, &CanonicalBytes::from_value(value))?;
        tracing::debug!(id, path = %path.display(), "stored vector");
        Ok(path)
    }

    /// Read a vector. Ids that parse as vector URNs are integrity-checked.
    pub fn get(&self, id: &str) -> Result<Option<Value>, VectorStoreError> {
        let path = self.path_for(id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(VectorStoreError::Io { path, source: e }),
        };
        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| VectorStoreError::InvalidJson {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        if let Ok(urn) = VectorUrn::parse(id) {
            let actual = digest_value(&value).to_urn();
            if actual != urn {
                return Err(VectorStoreError::IntegrityMismatch {
                    id: id.to_string(),
                    actual: actual.to_string(),
                });
            }
        }
        Ok(Some(value))
    }

    /// Stems of every stored vector, sorted.
    pub fn list(&self) -> Result<Vec<String>, VectorStoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(VectorStoreError::Io {
                    path: self.root.clone(),
                    source: e,
                })
            }
        };
        let mut ids = Vec::new();
        for entry in entries {
            let path = entry.map_err(VectorStoreError::io(&self.root))?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn ensure_root(&self) -> Result<(), VectorStoreError> {
        fs::create_dir_all(&self.root).map_err(VectorStoreError::io(&self.root))
    }

    fn write_atomic(&self, path: &Path, canonical: &CanonicalBytes) -> Result<(), VectorStoreError> {
        let mut tmp = NamedTempFile::new_in(&self.root).map_err(VectorStoreError::io(&self.root))?;
        tmp.write_all(canonical.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(VectorStoreError::io(path))?;
        tmp.persist(path).map_err(|e| VectorStoreError::Io {
            path: path.to_path_buf(),
            source: e.error,
        })?;
        Ok(())
    }
}

/// Whether the file at `path` parses and digests to `urn`.
fn holds(path: &Path, urn: &VectorUrn) -> bool {
    fs::read(path)
        .ok()
        .and_then(|bytes| serde_json::from_slice::<Value>(&bytes).ok())
        .is_some_and(|stored| digest_value(&stored).to_urn() == *urn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> (tempfile::TempDir, VectorStore) {
        let tmp = tempfile::tempdir().unwrap();
        let vs = VectorStore::new(tmp.path().join("vectors"));
        (tmp, vs)
    }

    #[test]
    fn sanitize_replaces_disallowed() {
        assert_eq!(sanitize_id("urn:zkpip:vector:sha256:ab"), "urn:zkpip:vector:sha256:ab");
        assert_eq!(sanitize_id("a/b c?é"), "a_b_c__");
        assert_eq!(sanitize_id("v1.final-2_x"), "v1.final-2_x");
    }

    #[test]
    fn put_then_get_by_urn() {
        let (_tmp, vs) = store();
        let value = json!({"b": 1, "a": 2});
        let urn = vs.put(&value).unwrap();
        assert_eq!(
            urn.as_str(),
            "urn:zkpip:vector:sha256:d3626ac30a87e6f7a6428233b3c68299976865fa5508e4267c5415c76af7a772"
        );
        assert_eq!(vs.get(urn.as_str()).unwrap().unwrap(), value);
        assert_eq!(
            fs::read_to_string(vs.path_for(urn.as_str())).unwrap(),
            r#"{"a":2,"b":1}"#
        );
    }

    #[test]
    fn put_is_idempotent() {
        let (_tmp, vs) = store();
        let a = vs.put(&json!({"x": 1})).unwrap();
        let b = vs.put(&json!({"x": 1})).unwrap();
        assert_eq!(a, b);
        assert_eq!(vs.list().unwrap().len(), 1);
    }

    #[test]
    fn put_repairs_a_truncated_file() {
        let (_tmp, vs) = store();
        let value = json!({"payload": [1, 2, 3]});
        let urn = digest_value(&value).to_urn();
        fs::create_dir_all(vs.root()).unwrap();
        fs::write(vs.path_for(urn.as_str()), br#"{"payload":[1,"#).unwrap();
        assert_eq!(vs.put(&value).unwrap(), urn);
        assert_eq!(vs.get(urn.as_str()).unwrap(), Some(value));
    }

    #[test]
    fn writes_leave_no_temporary_files() {
        let (_tmp, vs) = store();
        vs.put(&json!({"x": 1})).unwrap();
        vs.put_with_id("named", &json!({"y": 2})).unwrap();
        assert_eq!(fs::read_dir(vs.root()).unwrap().count(), 2);
    }

    #[test]
    fn tampered_content_detected() {
        let (_tmp, vs) = store();
        let urn = vs.put(&json!({"x": 1})).unwrap();
        fs::write(vs.path_for(urn.as_str()), r#"{"x":2}"#).unwrap();
        assert!(matches!(
            vs.get(urn.as_str()),
            Err(VectorStoreError::IntegrityMismatch { .. })
        ));
    }

    #[test]
    fn named_ids_skip_integrity_check() {
        let (_tmp, vs) = store();
        let path = vs.put_with_id("my vector", &json!([1, 2])).unwrap();
        assert!(path.ends_with("my_vector.json"));
        assert_eq!(vs.get("my vector").unwrap().unwrap(), json!([1, 2]));
        assert!(vs.put_with_id("  ", &json!(null)).is_err());
    }

    #[test]
    fn missing_is_none_and_garbage_is_error() {
        let (_tmp, vs) = store();
        assert!(vs.get("absent").unwrap().is_none());
        fs::create_dir_all(vs.root()).unwrap();
        fs::write(vs.path_for("bad"), "{").unwrap();
        assert!(matches!(vs.get("bad"), Err(VectorStoreError::InvalidJson { .. })));
    }

    #[test]
    fn list_is_sorted_and_empty_when_missing() {
        let (_tmp, vs) = store();
        assert!(vs.list().unwrap().is_empty());
        vs.put_with_id("b", &json!(1)).unwrap();
        vs.put_with_id("a", &json!(2)).unwrap();
        assert_eq!(vs.list().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }
}
