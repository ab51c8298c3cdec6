//! # zkpip-adapters: Verifier Adapters
//!
//! Routes proof bundles to verifier backends and aggregates results.
//!
//! ```text
//! raw JSON ──schema gate──▶ ProofBundle::normalize ──pick/dispatch──▶ Adapter ──▶ VerifierBackend
//!                                                                        │
//!                                                         VerifyOutcome ◀┘
//! ```
//!
//! - [`bundle`]: normalization of legacy bundle layouts.
//! - [`adapter`], [`traits`]: the adapter and backend seams.
//! - [`registry`]: ordered adapter registry and guarded dispatch.
//! - [`batch`]: ordered batch verification.
//! - [`mock`]: deterministic backend for development (feature `mock`).

pub mod adapter;
pub mod batch;
pub mod builtin;
pub mod bundle;
pub mod error;
pub mod fetch;
#[cfg(feature = "mock")]
pub mod mock;
pub mod outcome;
pub mod registry;
pub mod traits;

pub use adapter::{Adapter, AdapterDescriptor, BackendAdapter};
pub use batch::{seal_batch, verify_auto, verify_bundle, BatchEntry, BatchResult, PROOF_BUNDLE_SCHEMA};
pub use bundle::{FieldSource, Framework, ProofBundle, ProofSystem};
pub use error::{AdapterError, BackendError, BundleError, FetchError, RegistryError};
pub use fetch::{fetch_json, ByteFetcher, FileFetcher};
pub use outcome::VerifyOutcome;
pub use registry::{dispatch, AdapterRegistry};
pub use traits::{UnavailableBackend, VerifierBackend};
