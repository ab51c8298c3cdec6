//! # zkpip-crypto: Keys and Stores
//!
//! - **Ed25519** key generation, PKCS#8/SPKI PEM encoding, signing over
//!   `CanonicalBytes`, and verification.
//! - **Keystore**: keypairs on disk, indexed by a base32 key id derived from
//!   the public key.
//! - **Vector store**: JSON vectors filed under their content URN, with
//!   integrity re-verification on read.
//!
//! ## Crate Policy
//!
//! - Depends only on `zkpip-core` internally.
//! - No mocking of cryptographic operations in tests.

pub mod base32;
pub mod ed25519;
pub mod error;
pub mod keystore;
pub mod vector_store;

pub use ed25519::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use error::{CryptoError, KeystoreError, VectorStoreError};
pub use keystore::{KeyAlgorithm, KeyRecord, Keystore, DEFAULT_KEY_ID_LENGTH};
pub use vector_store::VectorStore;
