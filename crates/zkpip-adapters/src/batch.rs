//! # Batch Verification
//!
//! Drives dispatch over an ordered list of raw bundles. Items are processed
//! strictly in input order, every item is attempted, and one item's failure
//! never affects its siblings.
//!
//! When a schema registry is supplied, each raw bundle is first validated
//! against `mvs/proofBundle`; failures there are `schema_invalid`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use zkpip_core::{ErrorKind, Outcome, Stage};
use zkpip_schema::SchemaRegistry;

use crate::adapter::Adapter;
use crate::bundle::{bundle_id, ProofBundle};
use crate::outcome::VerifyOutcome;
use crate::registry::{dispatch, AdapterRegistry};

/// Schema raw bundles are gated on.
pub const PROOF_BUNDLE_SCHEMA: &str = "mvs/proofBundle";

/// Adapter name recorded for auto-routed batches.
pub const AUTO_ADAPTER: &str = "auto";

/// One batch item's result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    pub bundle_id: String,
    #[serde(flatten)]
    pub outcome: VerifyOutcome,
}

/// Aggregate result. `total == passed + failed == results.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub adapter: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub results: Vec<BatchEntry>,
}

impl BatchResult {
    fn from_entries(adapter: &str, results: Vec<BatchEntry>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|e| e.outcome.ok).count();
        Self {
            adapter: adapter.to_string(),
            total,
            passed,
            failed: total - passed,
            results,
        }
    }

    /// Success when nothing failed; otherwise the first failure in input
    /// order.
    pub fn outcome(&self) -> Outcome {
        self.results
            .iter()
            .find(|e| !e.outcome.ok)
            .map(|e| e.outcome.outcome())
            .unwrap_or_else(Outcome::success)
    }
}

/// Identifier recorded for an item: its own `id`, else `#<index>`.
fn entry_id(raw: &Value, index: usize) -> String {
    bundle_id(raw).unwrap_or_else(|| format!("#{index}"))
}

fn schema_gate(schemas: Option<&SchemaRegistry>, raw: &Value) -> Option<VerifyOutcome> {
    let schemas = schemas?;
    let err = schemas.validate(PROOF_BUNDLE_SCHEMA, raw).err()?;
    let detail = match err.violations() {
        [] => err.to_string(),
        violations => violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; "),
    };
    Some(
        VerifyOutcome::fail(ErrorKind::SchemaInvalid)
            .with_message(detail)
            .with_stage(Stage::Schema),
    )
}

fn normalize(raw: &Value) -> Result<ProofBundle, VerifyOutcome> {
    ProofBundle::normalize(raw).map_err(|e| {
        VerifyOutcome::fail(ErrorKind::InvalidInput)
            .with_message(e.to_string())
            .with_stage(Stage::Verify)
    })
}

fn adapter_not_found(message: String) -> VerifyOutcome {
    VerifyOutcome::fail(ErrorKind::AdapterNotFound)
        .with_message(message)
        .with_stage(Stage::Verify)
}

fn verify_with(adapter: &dyn Adapter, raw: &Value, schemas: Option<&SchemaRegistry>) -> VerifyOutcome {
    if let Some(rejected) = schema_gate(schemas, raw) {
        return rejected;
    }
    match normalize(raw) {
        Ok(bundle) => dispatch(adapter, &bundle),
        Err(rejected) => rejected,
    }
}

fn verify_routed(registry: &AdapterRegistry, raw: &Value, schemas: Option<&SchemaRegistry>) -> VerifyOutcome {
    if let Some(rejected) = schema_gate(schemas, raw) {
        return rejected;
    }
    let bundle = match normalize(raw) {
        Ok(bundle) => bundle,
        Err(rejected) => return rejected,
    };
    match registry.pick(&bundle) {
        Some(adapter) => dispatch(adapter, &bundle),
        None => adapter_not_found(format!(
            "no adapter handles {}{}",
            bundle.proof_system,
            bundle
                .framework
                .as_ref()
                .map(|f| format!(" ({f})"))
                .unwrap_or_default()
        )),
    }
}

fn record(index: usize, raw: &Value, outcome: VerifyOutcome) -> BatchEntry {
    let bundle_id = entry_id(raw, index);
    if !outcome.ok {
        tracing::warn!(bundle = %bundle_id, code = ?outcome.code, "bundle failed verification");
    }
    BatchEntry { bundle_id, outcome }
}

/// Verify every bundle with one named adapter.
///
/// An unknown adapter id fails every item with `adapter_not_found`.
pub fn seal_batch(
    registry: &AdapterRegistry,
    adapter_id: &str,
    bundles: &[Value],
    schemas: Option<&SchemaRegistry>,
) -> BatchResult {
    let adapter = registry.get(adapter_id);
    let results = bundles
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let outcome = match adapter {
                Some(adapter) => verify_with(adapter, raw, schemas),
                None => adapter_not_found(format!("adapter {adapter_id} is not registered")),
            };
            record(i, raw, outcome)
        })
        .collect();
    let result = BatchResult::from_entries(adapter_id, results);
    tracing::info!(
        adapter = %adapter_id,
        total = result.total,
        passed = result.passed,
        failed = result.failed,
        "batch verified"
    );
    result
}

/// Verify every bundle, picking an adapter per bundle.
pub fn verify_auto(
    registry: &AdapterRegistry,
    bundles: &[Value],
    schemas: Option<&SchemaRegistry>,
) -> BatchResult {
    let results = bundles
        .iter()
        .enumerate()
        .map(|(i, raw)| record(i, raw, verify_routed(registry, raw, schemas)))
        .collect();
    BatchResult::from_entries(AUTO_ADAPTER, results)
}

/// Verify a single bundle, with a named adapter or by routing.
pub fn verify_bundle(
    registry: &AdapterRegistry,
    adapter_id: Option<&str>,
    raw: &Value,
    schemas: Option<&SchemaRegistry>,
) -> VerifyOutcome {
    match adapter_id {
        Some(id) => match registry.get(id) {
            Some(adapter) => verify_with(adapter, raw, schemas),
            None => adapter_not_found(format!("adapter {id} is not registered")),
        },
        None => verify_routed(registry, raw, schemas),
    }
}

#[cfg(all(test, feature = "mock"))]
mod tests {
    use super::*;
    use crate::mock::{mock_proof, MOCK_ADAPTER_ID};
    use proptest::prelude::*;
    use serde_json::json;
    use zkpip_core::map_outcome;

    fn valid_mock(id: &str) -> Value {
        let vk = json!({"k": id});
        let publics = json!([id]);
        json!({
            "id": id,
            "proofSystem": "mock",
            "proof": mock_proof(&vk, &publics),
            "publicInputs": publics,
            "verificationKey": vk,
        })
    }

    fn schemas() -> SchemaRegistry {
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../schemas");
        SchemaRegistry::from_dir(dir).unwrap()
    }

    #[test]
    fn mixed_batch_keeps_order_and_counts() {
        let reg = AdapterRegistry::with_builtins();
        let bundles = vec![
            valid_mock("a"),
            json!({"id": "b", "proofSystem": "plonk"}),
            json!({"proof": "untagged"}),
            valid_mock("d"),
        ];
        let result = seal_batch(&reg, MOCK_ADAPTER_ID, &bundles, None);
        assert_eq!((result.total, result.passed, result.failed), (4, 2, 2));
        let ids: Vec<_> = result.results.iter().map(|e| e.bundle_id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "#2", "d"]);
        assert_eq!(result.results[1].outcome.code, Some(ErrorKind::WrongAdapter));
        assert_eq!(result.results[2].outcome.code, Some(ErrorKind::InvalidInput));
        assert_eq!(map_outcome(&result.outcome()), 1);
    }

    #[test]
    fn unknown_adapter_fails_every_item() {
        let reg = AdapterRegistry::with_builtins();
        let result = seal_batch(&reg, "nope", &[valid_mock("a"), valid_mock("b")], None);
        assert_eq!(result.failed, 2);
        assert!(result
            .results
            .iter()
            .all(|e| e.outcome.code == Some(ErrorKind::AdapterNotFound)));
        assert_eq!(map_outcome(&result.outcome()), 4);
    }

    #[test]
    fn auto_routing() {
        let reg = AdapterRegistry::with_builtins();
        let bundles = vec![
            valid_mock("m"),
            json!({"id": "s", "adapter": "stark", "proof": "p"}),
            json!({"id": "g", "proofSystem": "groth16", "proof": {}, "publicSignals": [], "vkey": {}}),
        ];
        let result = verify_auto(&reg, &bundles, None);
        assert_eq!(result.adapter, AUTO_ADAPTER);
        assert!(result.results[0].outcome.ok);
        assert_eq!(result.results[1].outcome.code, Some(ErrorKind::AdapterNotFound));
        assert_eq!(result.results[2].outcome.code, Some(ErrorKind::NotImplemented));
    }

    #[test]
    fn schema_gate_rejects_before_dispatch() {
        let reg = AdapterRegistry::with_builtins();
        let schemas = schemas();
        let bundles = vec![json!({"id": "x", "proofSystem": "mock"}), valid_mock("y")];
        let result = seal_batch(&reg, MOCK_ADAPTER_ID, &bundles, Some(&schemas));
        let first = &result.results[0].outcome;
        assert_eq!(first.code, Some(ErrorKind::SchemaInvalid));
        assert_eq!(first.stage, Some(Stage::Schema));
        assert!(result.results[1].outcome.ok);
        assert_eq!(map_outcome(&result.outcome()), 3);
    }

    #[test]
    fn entry_wire_shape_is_flat() {
        let reg = AdapterRegistry::with_builtins();
        let result = seal_batch(&reg, MOCK_ADAPTER_ID, &[valid_mock("a")], None);
        let v = serde_json::to_value(&result).unwrap();
        assert_eq!(
            v,
            json!({
                "adapter": MOCK_ADAPTER_ID, "total": 1, "passed": 1, "failed": 0,
                "results": [{"bundleId": "a", "ok": true}]
            })
        );
    }

    #[test]
    fn single_bundle() {
        let reg = AdapterRegistry::with_builtins();
        assert!(verify_bundle(&reg, None, &valid_mock("a"), None).ok);
        assert_eq!(
            verify_bundle(&reg, Some("missing"), &valid_mock("a"), None).code,
            Some(ErrorKind::AdapterNotFound)
        );
    }

    fn arb_bundle() -> impl Strategy<Value = Value> {
        prop_oneof![
            "[a-z]{1,6}".prop_map(|id| valid_mock(&id)),
            "[a-z]{1,6}".prop_map(|id| json!({"id": id, "proofSystem": "mock", "proof": "bad",
                                               "publicInputs": [], "verificationKey": {}})),
            "[a-z]{1,6}".prop_map(|id| json!({"id": id, "adapter": "plonk"})),
            Just(json!({"no": "tag"})),
        ]
    }

    proptest! {
        #[test]
        fn totals_and_order_hold(bundles in proptest::collection::vec(arb_bundle(), 0..12)) {
            let reg = AdapterRegistry::with_builtins();
            let result = seal_batch(&reg, MOCK_ADAPTER_ID, &bundles, None);
            prop_assert_eq!(result.total, bundles.len());
            prop_assert_eq!(result.passed + result.failed, result.total);
            prop_assert_eq!(result.results.len(), result.total);
            for (i, (entry, raw)) in result.results.iter().zip(&bundles).enumerate() {
                prop_assert_eq!(&entry.bundle_id, &entry_id(raw, i));
            }
        }
    }
}
