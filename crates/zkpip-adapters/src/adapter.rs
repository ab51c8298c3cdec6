//! # Adapters
//!
//! An adapter wraps one verifier backend for one proof system and
//! framework. [`BackendAdapter`] is the only implementation the crate ships;
//! anything implementing [`Adapter`] can be registered.

use serde::Serialize;
use zkpip_core::{ErrorKind, Stage};

use crate::bundle::{Framework, ProofBundle, ProofSystem};
use crate::error::{AdapterError, BackendError};
use crate::outcome::VerifyOutcome;
use crate::traits::VerifierBackend;

/// Static description of an adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterDescriptor {
    pub id: String,
    pub proof_system: ProofSystem,
    pub framework: Framework,
}

impl AdapterDescriptor {
    pub fn new(id: impl Into<String>, proof_system: ProofSystem, framework: Framework) -> Self {
        Self {
            id: id.into(),
            proof_system,
            framework,
        }
    }

    /// Whether a bundle declares this adapter's kind. A bundle that names
    /// no framework matches any framework.
    pub fn matches(&self, bundle: &ProofBundle) -> bool {
        bundle.proof_system == self.proof_system
            && bundle.framework.as_ref().map_or(true, |f| *f == self.framework)
    }
}

/// A verifier wrapper.
pub trait Adapter: Send + Sync {
    fn descriptor(&self) -> &AdapterDescriptor;

    fn can_handle(&self, bundle: &ProofBundle) -> bool {
        self.descriptor().matches(bundle)
    }

    /// Verify a bundle already known to match this adapter.
    fn verify(&self, bundle: &ProofBundle) -> Result<VerifyOutcome, AdapterError>;
}

/// An adapter backed by a [`VerifierBackend`].
#[derive(Debug, Clone)]
pub struct BackendAdapter<B> {
    descriptor: AdapterDescriptor,
    backend: B,
}

impl<B: VerifierBackend> BackendAdapter<B> {
    pub fn new(descriptor: AdapterDescriptor, backend: B) -> Self {
        Self {
            descriptor,
            backend,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: VerifierBackend> Adapter for BackendAdapter<B> {
    fn descriptor(&self) -> &AdapterDescriptor {
        &self.descriptor
    }

    fn verify(&self, bundle: &ProofBundle) -> Result<VerifyOutcome, AdapterError> {
        let (Some(proof), Some(publics), Some(vkey)) = (
            &bundle.proof,
            &bundle.public_inputs,
            &bundle.verification_key,
        ) else {
            let missing = bundle.missing_pieces().join(", ");
            return Ok(VerifyOutcome::fail(ErrorKind::InvalidInput)
                .with_message(format!("missing {missing}"))
                .with_stage(Stage::Verify));
        };

        match self.backend.verify(vkey, publics, proof) {
            Ok(true) => Ok(VerifyOutcome::ok()),
            Ok(false) => Ok(VerifyOutcome::fail(ErrorKind::VerificationFailed).with_stage(Stage::Verify)),
            Err(BackendError::Unavailable(reason)) => Ok(VerifyOutcome::fail(ErrorKind::NotImplemented)
                .with_message(reason)
                .with_stage(Stage::Verify)),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::UnavailableBackend;
    use serde_json::{json, Value};

    struct Fixed(Result<bool, BackendError>);

    impl VerifierBackend for Fixed {
        fn verify(&self, _: &Value, _: &Value, _: &Value) -> Result<bool, BackendError> {
            self.0.clone()
        }
    }

    fn descriptor() -> AdapterDescriptor {
        AdapterDescriptor::new("snarkjs-groth16", ProofSystem::Groth16, Framework::Snarkjs)
    }

    fn complete() -> ProofBundle {
        ProofBundle::normalize(&json!({
            "proofSystem": "groth16", "proof": {}, "publicSignals": [], "verificationKey": {}
        }))
        .unwrap()
    }

    #[test]
    fn verdicts_map_to_outcomes() {
        let ok = BackendAdapter::new(descriptor(), Fixed(Ok(true)));
        assert!(ok.verify(&complete()).unwrap().ok);

        let rejected = BackendAdapter::new(descriptor(), Fixed(Ok(false)));
        assert_eq!(
            rejected.verify(&complete()).unwrap().code,
            Some(ErrorKind::VerificationFailed)
        );

        let stub = BackendAdapter::new(descriptor(), UnavailableBackend::new("no verifier"));
        let out = stub.verify(&complete()).unwrap();
        assert_eq!(out.code, Some(ErrorKind::NotImplemented));
        assert_eq!(out.message.as_deref(), Some("no verifier"));

        let broken = BackendAdapter::new(descriptor(), Fixed(Err(BackendError::Failed("bad vk".into()))));
        assert!(matches!(broken.verify(&complete()), Err(AdapterError::Backend(_))));
    }

    #[test]
    fn missing_pieces_are_invalid_input() {
        let adapter = BackendAdapter::new(descriptor(), Fixed(Ok(true)));
        let bundle = ProofBundle::normalize(&json!({"proofSystem": "groth16", "proof": {}})).unwrap();
        let out = adapter.verify(&bundle).unwrap();
        assert_eq!(out.code, Some(ErrorKind::InvalidInput));
        assert_eq!(out.message.as_deref(), Some("missing publicInputs, verificationKey"));
    }

    #[test]
    fn framework_must_agree_when_named() {
        let d = descriptor();
        let plain = ProofBundle::normalize(&json!({"adapter": "groth16"})).unwrap();
        let snarkjs = ProofBundle::normalize(&json!({"adapter": "snarkjs-groth16"})).unwrap();
        let gnark = ProofBundle::normalize(&json!({"adapter": "gnark-groth16"})).unwrap();
        assert!(d.matches(&plain));
        assert!(d.matches(&snarkjs));
        assert!(!d.matches(&gnark));
    }
}
