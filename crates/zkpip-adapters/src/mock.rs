//! # Mock Backend
//!
//! A deterministic, transparent verifier for development and tests. A proof
//! is the SHA-256 hex of the canonical `{publicInputs, verificationKey}`
//! object; it proves nothing and must never back a production adapter.

use serde_json::{json, Value};
use zkpip_core::digest_value;

use crate::adapter::{AdapterDescriptor, BackendAdapter};
use crate::bundle::{Framework, ProofSystem};
use crate::error::BackendError;
use crate::traits::VerifierBackend;

/// Id of the mock adapter.
pub const MOCK_ADAPTER_ID: &str = "zkpip-mock";

/// Produce the proof the mock backend accepts.
pub fn mock_proof(verification_key: &Value, public_inputs: &Value) -> String {
    digest_value(&json!({
        "publicInputs": public_inputs,
        "verificationKey": verification_key,
    }))
    .to_hex()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MockBackend;

impl VerifierBackend for MockBackend {
    fn verify(
        &self,
        verification_key: &Value,
        public_inputs: &Value,
        proof: &Value,
    ) -> Result<bool, BackendError> {
        Ok(proof
            .as_str()
            .is_some_and(|p| p == mock_proof(verification_key, public_inputs)))
    }
}

/// The mock adapter: proof system `mock`, framework `zkpip`.
pub fn mock_adapter() -> BackendAdapter<MockBackend> {
    BackendAdapter::new(
        AdapterDescriptor::new(MOCK_ADAPTER_ID, ProofSystem::Mock, Framework::Zkpip),
        MockBackend,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_only_the_matching_digest() {
        let vk = json!({"curve": "bn128"});
        let publics = json!(["1", "2"]);
        let proof = Value::String(mock_proof(&vk, &publics));
        assert_eq!(MockBackend.verify(&vk, &publics, &proof), Ok(true));
        assert_eq!(MockBackend.verify(&vk, &json!(["1", "3"]), &proof), Ok(false));
        assert_eq!(MockBackend.verify(&vk, &publics, &json!({"p": 1})), Ok(false));
    }

    #[test]
    fn proof_ignores_key_order_in_inputs() {
        let a = mock_proof(&json!({"x": 1, "y": 2}), &json!([]));
        let b = mock_proof(&json!({"y": 2, "x": 1}), &json!([]));
        assert_eq!(a, b);
    }
}
