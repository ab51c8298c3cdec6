//! # zkpip-core: Foundational Types for ZKPIP
//!
//! This crate is the leaf of the ZKPIP workspace. Every other crate depends
//! on it; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** All digest and signature input flows
//!    through `CanonicalBytes::new()`. No raw `serde_json::to_vec()` for
//!    digests. Two parties holding semantically identical JSON always
//!    produce the same bytes.
//!
//! 2. **`sha256_digest()` accepts only `&CanonicalBytes`.** Compile-time
//!    enforcement that every content address is computed over canonical
//!    input.
//!
//! 3. **`VectorUrn` content addresses.** `urn:zkpip:vector:sha256:<hex>` is
//!    derived from content, never assigned.
//!
//! 4. **One error taxonomy.** [`ErrorKind`] names every terminal failure,
//!    and [`map_outcome`] turns an [`Outcome`] into the stable process exit
//!    code consumers script against.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `zkpip-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod outcome;
pub mod temporal;
pub mod urn;

pub use canonical::{canonicalize, CanonicalBytes, NumberPolicy};
pub use digest::{digest, digest_value, sha256_digest, sha256_hex, CanonicalDigest, DigestAlgorithm};
pub use error::{CanonicalizationError, ZkpipError};
pub use outcome::{map_outcome, ErrorKind, ExitCode, Outcome, Stage};
pub use temporal::Timestamp;
pub use urn::{to_vector_urn, VectorUrn, VECTOR_URN_PREFIX};
