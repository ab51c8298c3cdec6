//! Schema errors.
//!
//! [`SchemaRegistryError`] covers registration and loading: it is fatal at
//! start-up. [`SchemaValidationError`] covers one document failing one
//! schema: it is a per-item result.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use zkpip_core::ErrorKind;

/// Registration-time and load-time failures.
#[derive(Error, Debug)]
pub enum SchemaRegistryError {
    /// A document has no `$id`, or an empty one.
    #[error("schema {document} has no $id")]
    MissingId { document: String },

    /// Two documents declare the same `$id`.
    #[error("duplicate schema $id {id} (already registered from {first})")]
    DuplicateId { id: String, first: String },

    /// An alias is already claimed by another canonical id.
    #[error("alias {alias} already resolves to {existing}, cannot point it at {requested}")]
    AliasConflict {
        alias: String,
        existing: String,
        requested: String,
    },

    /// An alias was added for a canonical id that is not registered.
    #[error("alias {alias} targets unregistered schema {canonical}")]
    UnknownCanonical { alias: String, canonical: String },

    /// An alias or `$id` collides with a canonical id or alias of another schema.
    #[error("{name} is already a canonical schema id or alias")]
    NameShadowed { name: String },

    /// A schema failed to compile.
    #[error("failed to compile schema {id}: {reason}")]
    Compile { id: String, reason: String },

    /// A schema file or directory could not be read.
    #[error("schema I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A schema file could not be parsed.
    #[error("failed to load schema {path}: {reason}")]
    Load { path: String, reason: String },

    /// Required core schemas are absent from the schema directory.
    #[error("missing core schema(s): {}", .missing.join(", "))]
    MissingCoreSchema { missing: Vec<String> },
}

/// One violation reported by a validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaViolation {
    /// Canonical id of the violated schema.
    pub schema_id: String,
    /// JSON Pointer to the violating value.
    pub instance_path: String,
    pub message: String,
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let path = if self.instance_path.is_empty() {
            "/"
        } else {
            self.instance_path.as_str()
        };
        write!(f, "{path}: {}", self.message)
    }
}

/// A document failed validation, or named no known schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaValidationError {
    #[error("unknown schema: {0}")]
    UnknownSchema(String),

    #[error("{} violation(s) against {schema_id}", .violations.len())]
    Invalid {
        schema_id: String,
        violations: Vec<SchemaViolation>,
    },
}

impl SchemaValidationError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::SchemaInvalid
    }

    /// Individual violations; empty for an unknown schema.
    pub fn violations(&self) -> &[SchemaViolation] {
        match self {
            Self::UnknownSchema(_) => &[],
            Self::Invalid { violations, .. } => violations,
        }
    }
}
