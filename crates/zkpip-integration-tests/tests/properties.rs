//! Property tests spanning crates: seal round-trips, dispatch short-circuit,
//! and schema alias uniqueness.

use std::sync::atomic::{AtomicUsize, Ordering};

use proptest::prelude::*;
use serde_json::{json, Value};

use zkpip_adapters::{
    dispatch, Adapter, AdapterDescriptor, AdapterError, Framework, ProofBundle, ProofSystem,
    VerifyOutcome,
};
use zkpip_core::ErrorKind;
use zkpip_crypto::Ed25519KeyPair;
use zkpip_schema::{SchemaRegistryBuilder, SchemaRegistryError};
use zkpip_seal::Seal;

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z0-9 ]{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            proptest::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn seal_roundtrip_and_tamper(payload in arb_json(), extra in "[a-z]{1,6}") {
        let key = Ed25519KeyPair::generate();
        let seal = Seal::sign(&payload, &key, "signer").unwrap();
        prop_assert!(seal.verify(&payload, &key.public_key()).is_ok());

        let mutated = json!({"wrapped": payload, "extra": extra});
        let err = seal.verify(&mutated, &key.public_key()).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::UrnMismatch);
    }
}

struct Counting {
    descriptor: AdapterDescriptor,
    calls: AtomicUsize,
}

impl Adapter for Counting {
    fn descriptor(&self) -> &AdapterDescriptor {
        &self.descriptor
    }

    fn verify(&self, _bundle: &ProofBundle) -> Result<VerifyOutcome, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(VerifyOutcome::ok())
    }
}

#[test]
fn dispatch_never_invokes_a_mismatched_adapter() {
    let adapter = Counting {
        descriptor: AdapterDescriptor::new("g16", ProofSystem::Groth16, Framework::Snarkjs),
        calls: AtomicUsize::new(0),
    };
    for kind in ["plonk", "halo2", "mock", "stark", "gnark-groth16"] {
        let bundle = ProofBundle::normalize(&json!({"adapter": kind})).unwrap();
        let out = dispatch(&adapter, &bundle);
        assert_eq!(out.code, Some(ErrorKind::WrongAdapter), "{kind}");
    }
    assert_eq!(adapter.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn two_schemas_cannot_share_an_alias() {
    let mut builder = SchemaRegistryBuilder::new();
    builder
        .register(json!({"$id": "urn:zkpip:mvs:schemas:cir.schema.json"}), Some("cir"))
        .unwrap();
    builder
        .register(json!({"$id": "urn:example:other-cir"}), Some("other"))
        .unwrap();
    builder
        .add_alias("urn:zkpip:mvs:schemas:cir.schema.json", "mvs/cir")
        .unwrap();
    let err = builder.add_alias("urn:example:other-cir", "mvs/cir").unwrap_err();
    assert!(matches!(err, SchemaRegistryError::AliasConflict { .. }));
}
