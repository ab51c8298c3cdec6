//! Byte sources for bundles and vectors.
//!
//! Remote retrieval is outside this crate; callers that need it implement
//! [`ByteFetcher`] themselves.

use std::path::PathBuf;

use serde_json::Value;

use crate::error::FetchError;

/// Opaque byte source keyed by a location string.
pub trait ByteFetcher {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, FetchError>;
}

/// Reads locations as filesystem paths, relative to `base` when set.
#[derive(Debug, Clone, Default)]
pub struct FileFetcher {
    base: Option<PathBuf>,
}

impl FileFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }
}

impl ByteFetcher for FileFetcher {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, FetchError> {
        let path = match &self.base {
            Some(base) => base.join(location),
            None => PathBuf::from(location),
        };
        std::fs::read(&path).map_err(|source| FetchError::Io {
            location: location.to_string(),
            source,
        })
    }
}

/// Fetch and parse a JSON document.
pub fn fetch_json(fetcher: &dyn ByteFetcher, location: &str) -> Result<Value, FetchError> {
    let bytes = fetcher.fetch(location)?;
    serde_json::from_slice(&bytes).map_err(|e| FetchError::InvalidJson {
        location: location.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkpip_core::ErrorKind;

    #[test]
    fn reads_relative_to_base() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("b.json"), r#"{"id": "b"}"#).unwrap();
        let fetcher = FileFetcher::with_base(tmp.path());
        assert_eq!(fetch_json(&fetcher, "b.json").unwrap()["id"], "b");
    }

    #[test]
    fn failures_have_kinds() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("bad.json"), "{").unwrap();
        let fetcher = FileFetcher::with_base(tmp.path());
        assert_eq!(fetch_json(&fetcher, "absent.json").unwrap_err().kind(), ErrorKind::IoError);
        assert_eq!(fetch_json(&fetcher, "bad.json").unwrap_err().kind(), ErrorKind::InvalidInput);
    }
}
