//! # Error Types
//!
//! Structured errors for key handling, the keystore and the vector store.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from Ed25519 key and signature handling.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Ed25519 signature verification failed.
    #[error("Ed25519 verification failed: {0}")]
    VerificationFailed(String),

    /// A signature could not be decoded.
    #[error("invalid Ed25519 signature: {0}")]
    InvalidSignature(String),

    /// A public key could not be decoded or is not a valid curve point.
    #[error("invalid Ed25519 public key: {0}")]
    InvalidPublicKey(String),

    /// A private key could not be decoded.
    #[error("invalid Ed25519 private key: {0}")]
    InvalidPrivateKey(String),

    /// PEM/DER encoding failed.
    #[error("key encoding failed: {0}")]
    Encoding(String),
}

/// Errors from the filesystem keystore.
///
/// An unresolved key id is not an error; lookups return `Ok(None)`.
#[derive(Error, Debug)]
pub enum KeystoreError {
    /// Reading or writing a keystore file failed.
    #[error("keystore I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `keys.index.json` or a `key.json` could not be parsed.
    #[error("keystore index corrupt at {}: {reason}", .path.display())]
    IndexCorrupt { path: PathBuf, reason: String },

    /// Stored key material is malformed.
    #[error("key material error: {0}")]
    Key(#[from] CryptoError),

    /// Key id length outside `8..=52`.
    #[error("key id length {0} outside the supported range 8..=52")]
    InvalidKeyIdLength(usize),
}

impl KeystoreError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

/// Errors from the content-addressed vector store.
#[derive(Error, Debug)]
pub enum VectorStoreError {
    /// Reading or writing a vector file failed.
    #[error("vector store I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored file is not valid JSON.
    #[error("stored vector at {} is not valid JSON: {reason}", .path.display())]
    InvalidJson { path: PathBuf, reason: String },

    /// Stored content no longer hashes to the URN it is filed under.
    #[error("integrity mismatch for {id}: content hashes to {actual}")]
    IntegrityMismatch { id: String, actual: String },

    /// An id is empty after trimming.
    #[error("vector id must not be empty")]
    EmptyId,
}

impl VectorStoreError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_path() {
        let err = KeystoreError::io("/tmp/keys/x")(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file missing",
        ));
        let msg = err.to_string();
        assert!(msg.contains("/tmp/keys/x"));
        assert!(msg.contains("file missing"));
    }

    #[test]
    fn key_id_length_display() {
        let msg = KeystoreError::InvalidKeyIdLength(4).to_string();
        assert!(msg.contains('4'));
        assert!(msg.contains("8..=52"));
    }

    #[test]
    fn crypto_error_converts() {
        let err: KeystoreError = CryptoError::InvalidPublicKey("short".into()).into();
        assert!(err.to_string().contains("short"));
    }
}
