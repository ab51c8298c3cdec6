//! # CodeSeal
//!
//! A seal binds the canonical digest of a payload to an Ed25519 signature
//! and a signer id.
//!
//! ## Signing
//!
//! 1. Canonicalize the payload.
//! 2. `id` = SHA-256 hex of the canonical bytes; `urn` = vector URN of `id`.
//! 3. Sign the canonical bytes directly (no pre-hash).
//!
//! ## Verification
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! | # | Check                                   | Failure             |
//! |---|-----------------------------------------|---------------------|
//! | 1 | `algo == "ed25519"`                     | `ALGO_UNSUPPORTED`  |
//! | 2 | recomputed digest == `id`               | `URN_MISMATCH`      |
//! | 3 | `urn == to_vector_urn(id)`              | `URN_MISMATCH`      |
//! | 4 | signature verifies over canonical bytes | `SIGNATURE_INVALID` |
//!
//! The digest is always recomputed from the payload, never taken from the
//! seal.

use serde::{Deserialize, Serialize};
use zkpip_core::{sha256_hex, to_vector_urn, CanonicalBytes, Timestamp};
use zkpip_crypto::ed25519::verify_with_public_key;
use zkpip_crypto::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};

use crate::error::SealError;

/// The only seal algorithm.
pub const SEAL_ALGO: &str = "ed25519";

/// A CodeSeal. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seal {
    /// SHA-256 hex of the canonical payload.
    pub id: String,
    /// `urn:zkpip:vector:sha256:<id>`.
    pub urn: String,
    /// Key id of the signing key.
    pub signer: String,
    pub timestamp: Timestamp,
    /// Standard padded base64 of the 64-byte signature.
    pub signature: String,
    pub algo: String,
}

impl Seal {
    /// Seal a payload with the current time.
    pub fn sign(
        payload: &impl Serialize,
        keypair: &Ed25519KeyPair,
        signer: &str,
    ) -> Result<Self, SealError> {
        Self::sign_at(payload, keypair, signer, Timestamp::now())
    }

    /// Seal a payload with an explicit timestamp.
    pub fn sign_at(
        payload: &impl Serialize,
        keypair: &Ed25519KeyPair,
        signer: &str,
        timestamp: Timestamp,
    ) -> Result<Self, SealError> {
        let canonical = CanonicalBytes::new(payload)?;
        let id = sha256_hex(&canonical);
        let urn = to_vector_urn(&id).to_string();
        let signature = keypair.sign(&canonical).to_base64();
        tracing::debug!(%urn, signer, "sealed payload");
        Ok(Self {
            id,
            urn,
            signer: signer.to_string(),
            timestamp,
            signature,
            algo: SEAL_ALGO.to_string(),
        })
    }

    /// Verify this seal against a payload and the signer's public key.
    pub fn verify(
        &self,
        payload: &impl Serialize,
        public_key: &Ed25519PublicKey,
    ) -> Result<(), SealError> {
        verify(payload, self, public_key)
    }
}

/// Verify a seal. See the module docs for the check order.
pub fn verify(
    payload: &impl Serialize,
    seal: &Seal,
    public_key: &Ed25519PublicKey,
) -> Result<(), SealError> {
    if seal.algo != SEAL_ALGO {
        return Err(SealError::AlgoUnsupported(seal.algo.clone()));
    }

    let canonical = CanonicalBytes::new(payload)?;
    let actual = sha256_hex(&canonical);
    if actual != seal.id {
        return Err(SealError::HashMismatch {
            expected: seal.id.clone(),
            actual,
        });
    }

    let expected_urn = to_vector_urn(&seal.id);
    if seal.urn != expected_urn.as_str() {
        return Err(SealError::UrnMismatch {
            expected: expected_urn.to_string(),
            actual: seal.urn.clone(),
        });
    }

    let signature = Ed25519Signature::from_base64(&seal.signature)
        .map_err(|e| SealError::SignatureInvalid(e.to_string()))?;
    verify_with_public_key(&canonical, &signature, public_key)
        .map_err(|e| SealError::SignatureInvalid(e.to_string()))
}
