//! # Error Types
//!
//! Structured error hierarchy shared by the ZKPIP crates. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! Canonicalization failures always carry the structural position of the
//! offending value so callers can pinpoint malformed input.

use std::fmt::Display;

use thiserror::Error;

/// Top-level error type for ZKPIP.
#[derive(Error, Debug)]
pub enum ZkpipError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A digest string is not 64 lowercase hex characters.
    #[error("invalid digest: {0}")]
    InvalidDigest(String),

    /// A string is not a well-formed vector URN.
    #[error("invalid vector URN: {0}")]
    InvalidUrn(String),

    /// A timestamp is not ISO-8601 UTC with `Z` suffix.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error during canonical serialization.
///
/// Every variant names the JSON path (`$`, `$.a.b`, `$.items[3]`) of the
/// value that could not be canonicalized.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CanonicalizationError {
    /// A NaN or infinite number was found under the strict number policy.
    #[error("non-finite number at {path}")]
    NonFiniteNumber {
        /// Position of the offending number.
        path: String,
    },

    /// A value has no canonical JSON representation.
    #[error("unsupported value at {path}: {kind}")]
    UnsupportedType {
        /// Position of the offending value.
        path: String,
        /// What kind of value was found.
        kind: &'static str,
    },

    /// A map key is not a string (or a scalar that stringifies losslessly).
    #[error("unsupported map key at {path}: {kind}")]
    UnsupportedKey {
        /// Position of the map holding the key.
        path: String,
        /// What kind of key was found.
        kind: &'static str,
    },

    /// The same key was emitted twice for one object.
    #[error("duplicate key at {path}")]
    DuplicateKey {
        /// Position of the duplicated member.
        path: String,
    },

    /// A `Serialize` implementation reported its own error.
    #[error("serialization failed at {path}: {message}")]
    Custom {
        /// Position at which the error surfaced.
        path: String,
        /// Message reported by the `Serialize` impl.
        message: String,
    },
}

impl CanonicalizationError {
    /// The structural position named by this error.
    pub fn path(&self) -> &str {
        match self {
            Self::NonFiniteNumber { path }
            | Self::UnsupportedType { path, .. }
            | Self::UnsupportedKey { path, .. }
            | Self::DuplicateKey { path }
            | Self::Custom { path, .. } => path,
        }
    }

    /// Attach a position to an error raised through `serde::ser::Error::custom`,
    /// which has no knowledge of where it happened.
    pub(crate) fn at(self, position: &str) -> Self {
        match self {
            Self::Custom { path, message } if path.is_empty() => Self::Custom {
                path: position.to_string(),
                message,
            },
            other => other,
        }
    }
}

impl serde::ser::Error for CanonicalizationError {
    fn custom<T: Display>(msg: T) -> Self {
        Self::Custom {
            path: String::new(),
            message: msg.to_string(),
        }
    }
}
