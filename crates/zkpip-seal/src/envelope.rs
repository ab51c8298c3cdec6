//! # Sealed Vector Envelopes
//!
//! The persisted form of a sealed vector:
//!
//! ```json
//! { "vector": { ... }, "seal": { "id", "urn", "signer", "timestamp", "signature", "algo" } }
//! ```
//!
//! Verification against a keystore resolves the signer's public key by key
//! id and reports a [`SealReport`] rather than an error, so every failure
//! reaches the caller as a named [`ErrorKind`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use zkpip_core::{ErrorKind, Outcome, Stage};
use zkpip_crypto::{Ed25519KeyPair, Ed25519PublicKey, Keystore};

use crate::error::SealError;
use crate::seal::{self, Seal};

/// A vector together with its seal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SealedVector {
    pub vector: Value,
    pub seal: Seal,
}

impl SealedVector {
    /// Read a seal file.
    pub fn load(path: &Path) -> Result<Self, SealError> {
        let text = fs::read_to_string(path).map_err(|source| SealError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|e| SealError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Write as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), SealError> {
        let io = |source| SealError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io)?;
        }
        let mut text = serde_json::to_string_pretty(self).map_err(|e| SealError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        text.push('\n');
        fs::write(path, text).map_err(io)
    }
}

/// Seal a vector with a keypair.
pub fn seal_vector(
    vector: Value,
    keypair: &Ed25519KeyPair,
    signer: &str,
) -> Result<SealedVector, SealError> {
    let seal = Seal::sign(&vector, keypair, signer)?;
    Ok(SealedVector { vector, seal })
}

/// Seal a vector with a key from the keystore. The key id becomes the signer.
pub fn seal_with_keystore(
    vector: Value,
    keystore: &Keystore,
    key_id: &str,
) -> Result<SealedVector, SealError> {
    let keypair = keystore
        .load_keypair(key_id)?
        .ok_or_else(|| SealError::PrivateKeyNotFound(key_id.to_string()))?;
    // Prefixes resolve too; record the full id.
    let signer = keystore
        .get(key_id)?
        .map(|rec| rec.key_id)
        .unwrap_or_else(|| key_id.to_string());
    seal_vector(vector, &keypair, &signer)
}

/// Result of verifying a sealed vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealReport {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub urn: String,
    pub signer: String,
}

impl SealReport {
    fn from_result(sealed: &SealedVector, result: Result<(), SealError>) -> Self {
        let (ok, code, message) = match result {
            Ok(()) => (true, None, None),
            Err(e) => (false, Some(e.kind()), Some(e.to_string())),
        };
        Self {
            ok,
            code,
            message,
            urn: sealed.seal.urn.clone(),
            signer: sealed.seal.signer.clone(),
        }
    }

    /// The terminal outcome for exit-code mapping.
    pub fn outcome(&self) -> Outcome {
        if self.ok {
            return Outcome::success();
        }
        let code = self.code.unwrap_or(ErrorKind::SignatureInvalid);
        let stage = if code == ErrorKind::IoError {
            Stage::Io
        } else {
            Stage::Seal
        };
        Outcome::failure(code).with_stage(stage)
    }
}

/// Verify a sealed vector with an explicit public key.
pub fn verify_sealed_with_key(sealed: &SealedVector, public_key: &Ed25519PublicKey) -> SealReport {
    let result = seal::verify(&sealed.vector, &sealed.seal, public_key);
    SealReport::from_result(sealed, result)
}

/// Verify a sealed vector, resolving the signer's public key in the keystore.
pub fn verify_sealed(sealed: &SealedVector, keystore: &Keystore) -> SealReport {
    let result = keystore
        .load_public(&sealed.seal.signer)
        .map_err(SealError::from)
        .and_then(|key| key.ok_or_else(|| SealError::PublicKeyNotFound(sealed.seal.signer.clone())))
        .and_then(|key| seal::verify(&sealed.vector, &sealed.seal, &key));
    let report = SealReport::from_result(sealed, result);
    if !report.ok {
        tracing::warn!(urn = %report.urn, code = ?report.code, "seal verification failed");
    }
    report
}
