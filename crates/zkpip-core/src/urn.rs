//! # Vector URNs
//!
//! A vector URN is the content address of a stored or sealed artifact:
//! `urn:zkpip:vector:sha256:<64 lowercase hex>`. It is derived from the
//! canonical digest of the content and compared by exact string equality.

use serde::{Deserialize, Serialize};

use crate::digest::{is_lower_hex, CanonicalDigest};
use crate::error::ZkpipError;

/// Prefix shared by every vector URN.
pub const VECTOR_URN_PREFIX: &str = "urn:zkpip:vector:sha256:";

/// Content address of a vector.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VectorUrn(String);

/// Format a hex digest as a vector URN.
///
/// Pure formatting: the hex is not validated, so a seal carrying a bogus id
/// still yields a URN that can be compared against the seal's `urn` field.
pub fn to_vector_urn(hex: &str) -> VectorUrn {
    VectorUrn(format!("{VECTOR_URN_PREFIX}{hex}"))
}

impl VectorUrn {
    /// Parse a well-formed vector URN.
    pub fn parse(s: &str) -> Result<Self, ZkpipError> {
        let hex = s
            .strip_prefix(VECTOR_URN_PREFIX)
            .ok_or_else(|| ZkpipError::InvalidUrn(format!("missing {VECTOR_URN_PREFIX} prefix: {s:?}")))?;
        if hex.len() != 64 || !is_lower_hex(hex) {
            return Err(ZkpipError::InvalidUrn(format!(
                "expected 64 lowercase hex characters after prefix: {s:?}"
            )));
        }
        Ok(Self(s.to_string()))
    }

    /// The URN of content with the given digest.
    pub fn from_digest(digest: &CanonicalDigest) -> Self {
        to_vector_urn(&digest.to_hex())
    }

    /// The URN text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The hex digest portion.
    pub fn hex(&self) -> &str {
        self.0.strip_prefix(VECTOR_URN_PREFIX).unwrap_or(&self.0)
    }
}

impl std::fmt::Display for VectorUrn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for VectorUrn {
    type Err = ZkpipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VectorUrn {
    type Error = ZkpipError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<VectorUrn> for String {
    fn from(urn: VectorUrn) -> Self {
        urn.0
    }
}
