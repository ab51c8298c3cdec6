//! # zkpip-seal: CodeSeal
//!
//! Producers seal JSON vectors with Ed25519; anyone holding the producer's
//! public key can re-verify them later. Seals are computed over
//! `CanonicalBytes`, so semantically identical vectors carry identical ids
//! and verify identically regardless of key order.
//!
//! ```text
//! unsealed vector ──sign──▶ SealedVector ──verify──▶ ok | SIGNATURE_INVALID
//!                                                      | URN_MISMATCH
//!                                                      | ALGO_UNSUPPORTED
//!                                                      | PUBLIC_KEY_NOT_FOUND
//! ```

pub mod envelope;
pub mod error;
pub mod seal;

pub use envelope::{
    seal_vector, seal_with_keystore, verify_sealed, verify_sealed_with_key, SealReport,
    SealedVector,
};
pub use error::SealError;
pub use seal::{verify, Seal, SEAL_ALGO};
