//! # Content Digest
//!
//! Defines `CanonicalDigest` and `DigestAlgorithm`, the content identifiers
//! behind vector URNs and seal ids.
//!
//! ## Security Invariant
//!
//! `CanonicalDigest` can only be computed from `CanonicalBytes`, so every
//! digest in the system is produced through the canonicalization pipeline.
//! This is enforced by the signature of [`sha256_digest()`].

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::{CanonicalizationError, ZkpipError};
use crate::urn::VectorUrn;

/// The hash algorithm used to produce a content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// SHA-256, the only algorithm vector URNs address.
    Sha256,
}

impl DigestAlgorithm {
    /// Returns the algorithm identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A content digest with its algorithm tag.
///
/// On the wire this is `{"alg":"sha256","hex":"<64 lowercase hex>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DigestRepr", into = "DigestRepr")]
pub struct CanonicalDigest {
    algorithm: DigestAlgorithm,
    bytes: [u8; 32],
}

#[derive(Serialize, Deserialize)]
struct DigestRepr {
    alg: DigestAlgorithm,
    hex: String,
}

impl TryFrom<DigestRepr> for CanonicalDigest {
    type Error = ZkpipError;

    fn try_from(repr: DigestRepr) -> Result<Self, Self::Error> {
        let mut digest = Self::from_hex(&repr.hex)?;
        digest.algorithm = repr.alg;
        Ok(digest)
    }
}

impl From<CanonicalDigest> for DigestRepr {
    fn from(d: CanonicalDigest) -> Self {
        Self {
            alg: d.algorithm,
            hex: d.to_hex(),
        }
    }
}

impl CanonicalDigest {
    /// Parse a SHA-256 digest from its 64-character lowercase hex form.
    pub fn from_hex(hex: &str) -> Result<Self, ZkpipError> {
        if hex.len() != 64 || !is_lower_hex(hex) {
            return Err(ZkpipError::InvalidDigest(format!(
                "expected 64 lowercase hex characters, got {hex:?}"
            )));
        }
        let decoded = hex_decode(hex).map_err(ZkpipError::InvalidDigest)?;
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&decoded);
        Ok(Self {
            algorithm: DigestAlgorithm::Sha256,
            bytes,
        })
    }

    /// The algorithm that produced this digest.
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// The raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex_encode(&self.bytes)
    }

    /// The vector URN addressing content with this digest.
    pub fn to_urn(&self) -> VectorUrn {
        VectorUrn::from_digest(self)
    }
}

impl std::fmt::Display for CanonicalDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

/// Compute a SHA-256 content digest from canonical bytes.
///
/// Accepts only `&CanonicalBytes`, not raw `&[u8]`, so no code path can
/// address non-canonical bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> CanonicalDigest {
    let hash = Sha256::digest(data.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    CanonicalDigest {
        algorithm: DigestAlgorithm::Sha256,
        bytes,
    }
}

/// Compute a SHA-256 hex string from canonical bytes.
pub fn sha256_hex(data: &CanonicalBytes) -> String {
    sha256_digest(data).to_hex()
}

/// Canonicalize and digest any serializable value.
pub fn digest(value: &impl Serialize) -> Result<CanonicalDigest, CanonicalizationError> {
    Ok(sha256_digest(&CanonicalBytes::new(value)?))
}

/// Digest a parsed JSON tree. Infallible.
pub fn digest_value(value: &serde_json::Value) -> CanonicalDigest {
    sha256_digest(&CanonicalBytes::from_value(value))
}

/// Lowercase hex encoding.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decode a hex string (either case) to bytes.
pub fn hex_decode(hex: &str) -> Result<Vec<u8>, String> {
    if hex.len() % 2 != 0 {
        return Err(format!("hex string has odd length {}", hex.len()));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            hex.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| format!("invalid hex at offset {i}"))
        })
        .collect()
}

pub(crate) fn is_lower_hex(s: &str) -> bool {
    s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
