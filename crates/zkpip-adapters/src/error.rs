//! Adapter-layer errors.
//!
//! None of these abort a batch: dispatch turns each into a
//! [`VerifyOutcome`](crate::VerifyOutcome) with a named kind.

use thiserror::Error;
use zkpip_core::ErrorKind;

/// A raw bundle could not be normalized.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BundleError {
    #[error("proof bundle must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// None of the discriminant fields is present.
    #[error("proof bundle declares no proof system (checked {})", .checked.join(", "))]
    Untagged { checked: Vec<&'static str> },

    #[error("field {pointer} must be a string")]
    InvalidField { pointer: &'static str },

    /// The normalized form needs every verification piece.
    #[error("proof bundle is missing {}", .missing.join(", "))]
    Incomplete { missing: Vec<&'static str> },
}

/// Failure reported by a verifier backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend is registered but cannot run here.
    #[error("verifier backend unavailable: {0}")]
    Unavailable(String),

    /// The backend could not evaluate the inputs.
    #[error("verifier backend failed: {0}")]
    Failed(String),
}

/// An adapter could not produce a verdict.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("adapter {adapter}: {reason}")]
    Internal { adapter: String, reason: String },
}

/// A bundle source could not be read.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to read {location}: {source}")]
    Io {
        location: String,
        source: std::io::Error,
    },

    #[error("{location} is not valid JSON: {reason}")]
    InvalidJson { location: String, reason: String },
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } => ErrorKind::IoError,
            Self::InvalidJson { .. } => ErrorKind::InvalidInput,
        }
    }
}

/// Adapter registration failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("adapter {0} is already registered")]
    DuplicateAdapter(String),
}
