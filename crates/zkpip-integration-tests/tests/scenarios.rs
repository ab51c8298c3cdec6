//! End-to-end scenarios across the codec, CodeSeal and batch verification.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;

use zkpip_adapters::{
    seal_batch, Adapter, AdapterDescriptor, AdapterError, AdapterRegistry, Framework, ProofBundle,
    ProofSystem, VerifyOutcome,
};
use zkpip_core::{canonicalize, digest_value, map_outcome, ErrorKind};
use zkpip_crypto::{Ed25519KeyPair, Ed25519PublicKey};
use zkpip_seal::{seal_vector, verify_sealed_with_key, SealedVector};

#[test]
fn nested_key_order_does_not_change_canonical_form() {
    let a = json!({"b": 1, "a": {"d": 2, "c": 3}});
    let b = json!({"a": {"c": 3, "d": 2}, "b": 1});
    assert_eq!(canonicalize(&a), canonicalize(&b));
    assert_eq!(canonicalize(&a), r#"{"a":{"c":3,"d":2},"b":1}"#);
    assert_eq!(digest_value(&a).to_hex(), digest_value(&b).to_hex());
    assert_eq!(
        digest_value(&a).to_hex(),
        "78d48859c3252943aab7306f76c80f3f07783582e05ab8f944ce0696f2dbfc67"
    );
}

#[test]
fn seal_verifies_only_with_the_matching_public_pem() {
    let key_a = Ed25519KeyPair::generate();
    let key_b = Ed25519KeyPair::generate();
    let sealed = seal_vector(json!({"hello": "world"}), &key_a, "producer-a").unwrap();

    // Keys travel as PEM between parties.
    let pem_a = key_a.public_key().to_pem().unwrap();
    let pem_b = key_b.public_key().to_pem().unwrap();

    let report = verify_sealed_with_key(&sealed, &Ed25519PublicKey::from_pem(&pem_a).unwrap());
    assert!(report.ok, "{report:?}");
    assert_eq!(map_outcome(&report.outcome()), 0);

    let report = verify_sealed_with_key(&sealed, &Ed25519PublicKey::from_pem(&pem_b).unwrap());
    assert!(!report.ok);
    assert_eq!(report.code, Some(ErrorKind::SignatureInvalid));
    assert_eq!(map_outcome(&report.outcome()), 1);
}

#[test]
fn sealed_file_survives_disk_roundtrip() {
    let tmp = tempfile::tempdir().unwrap();
    let key = Ed25519KeyPair::generate();
    let sealed = seal_vector(json!({"b": [1, 2], "a": null}), &key, "p").unwrap();
    let path = tmp.path().join("sealed.json");
    sealed.save(&path).unwrap();
    let loaded = SealedVector::load(&path).unwrap();
    assert!(verify_sealed_with_key(&loaded, &key.public_key()).ok);
}

/// Accepts every bundle it is handed and counts invocations.
struct AcceptAll {
    descriptor: AdapterDescriptor,
    calls: AtomicUsize,
}

impl Adapter for AcceptAll {
    fn descriptor(&self) -> &AdapterDescriptor {
        &self.descriptor
    }

    fn verify(&self, _bundle: &ProofBundle) -> Result<VerifyOutcome, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(VerifyOutcome::ok())
    }
}

#[test]
fn groth16_batch_flags_the_plonk_bundle() {
    let mut registry = AdapterRegistry::new();
    registry
        .register(Box::new(AcceptAll {
            descriptor: AdapterDescriptor::new("groth16-only", ProofSystem::Groth16, Framework::Snarkjs),
            calls: AtomicUsize::new(0),
        }))
        .unwrap();

    let bundles = vec![
        json!({"id": "v1", "adapter": "groth16"}),
        json!({"id": "v2", "adapter": "plonk"}),
    ];
    let result = seal_batch(&registry, "groth16-only", &bundles, None);

    assert_eq!(result.total, 2);
    assert_eq!(result.passed, 1);
    assert_eq!(result.failed, 1);
    assert_eq!(result.results[0].bundle_id, "v1");
    assert_eq!(result.results[1].bundle_id, "v2");
    assert_eq!(result.results[1].outcome.code, Some(ErrorKind::WrongAdapter));

    let wire = serde_json::to_value(&result).unwrap();
    assert_eq!(wire["results"][1]["code"], "WRONG_ADAPTER");
    assert_eq!(map_outcome(&result.outcome()), 1);
}
