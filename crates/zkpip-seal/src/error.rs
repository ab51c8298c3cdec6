//! Seal errors. Each verification failure maps to exactly one
//! [`ErrorKind`] so callers can branch without reading messages.

use std::path::PathBuf;

use thiserror::Error;
use zkpip_core::{CanonicalizationError, ErrorKind};
use zkpip_crypto::KeystoreError;

/// Errors from sealing and seal verification.
#[derive(Error, Debug)]
pub enum SealError {
    /// The payload has no canonical form.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// The seal names an algorithm other than `ed25519`.
    #[error("unsupported seal algorithm {0:?}")]
    AlgoUnsupported(String),

    /// The recomputed payload digest differs from the seal id.
    #[error("payload digest {actual} does not match seal id {expected}")]
    HashMismatch { expected: String, actual: String },

    /// The seal URN is not the URN of the seal id.
    #[error("seal urn {actual} does not match {expected}")]
    UrnMismatch { expected: String, actual: String },

    /// The signature does not decode or does not verify.
    #[error("signature invalid: {0}")]
    SignatureInvalid(String),

    /// No public key is known for the signer.
    #[error("public key not found for signer {0}")]
    PublicKeyNotFound(String),

    /// No private key is known for the requested key id.
    #[error("private key not found for key id {0}")]
    PrivateKeyNotFound(String),

    /// Keystore access failed.
    #[error(transparent)]
    Keystore(#[from] KeystoreError),

    /// Reading or writing a seal file failed.
    #[error("seal file I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A seal file is not a `{vector, seal}` document.
    #[error("malformed seal file {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },
}

impl SealError {
    /// The taxonomy kind of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlgoUnsupported(_) => ErrorKind::AlgoUnsupported,
            Self::HashMismatch { .. } | Self::UrnMismatch { .. } => ErrorKind::UrnMismatch,
            Self::SignatureInvalid(_) => ErrorKind::SignatureInvalid,
            Self::PublicKeyNotFound(_) => ErrorKind::PublicKeyNotFound,
            Self::Keystore(_) | Self::Io { .. } => ErrorKind::IoError,
            Self::Canonicalization(_) | Self::PrivateKeyNotFound(_) | Self::Malformed { .. } => {
                ErrorKind::InvalidInput
            }
        }
    }
}
