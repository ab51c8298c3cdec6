//! # Verifier Backend Trait
//!
//! The narrow contract every external proof verifier is consumed through.
//! Proof math lives behind this seam; adapters only extract inputs and map
//! verdicts.

use serde_json::Value;

use crate::error::BackendError;

/// A proof verifier for one proof system.
///
/// `Ok(true)` accepts, `Ok(false)` rejects. [`BackendError::Unavailable`]
/// means the backend is a registered stub.
pub trait VerifierBackend: Send + Sync {
    fn verify(
        &self,
        verification_key: &Value,
        public_inputs: &Value,
        proof: &Value,
    ) -> Result<bool, BackendError>;
}

/// Backend for proof systems with no verifier linked in.
#[derive(Debug, Clone, Default)]
pub struct UnavailableBackend {
    pub reason: String,
}

impl UnavailableBackend {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl VerifierBackend for UnavailableBackend {
    fn verify(&self, _vk: &Value, _publics: &Value, _proof: &Value) -> Result<bool, BackendError> {
        Err(BackendError::Unavailable(self.reason.clone()))
    }
}
