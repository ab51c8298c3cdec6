//! # zkpip-schema: Schema Registry
//!
//! Loads JSON Schema (Draft 2020-12) documents, registers each under its own
//! `$id`, installs lookup-only aliases for the core MVS set, and validates
//! documents with structured per-violation results.
//!
//! A schema directory missing any core MVS schema is rejected at load time
//! with every missing id named, so deployments cannot silently drift from
//! the shipped set.

pub mod catalog;
pub mod document;
pub mod error;
pub mod registry;

pub use catalog::{CORE_SCHEMAS, CANONICAL_PREFIX};
pub use document::load_document;
pub use error::{SchemaRegistryError, SchemaValidationError, SchemaViolation};
pub use registry::{SchemaEntry, SchemaRegistry, SchemaRegistryBuilder};
