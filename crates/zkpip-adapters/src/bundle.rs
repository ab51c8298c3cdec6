//! # Proof Bundle Normalization
//!
//! Proving toolchains emit bundles in several layouts: the proof system may
//! sit under `adapter`, `proofSystem`, `meta.proofSystem` or `system`, and
//! public inputs under four different names. Normalization runs once,
//! before dispatch, and resolves every field through an ordered table of
//! [`FieldSource`]s. The lowest precedence value present wins.
//!
//! A bundle with no proof-system discriminant is rejected here rather than
//! guessed at downstream. Missing proof material is not a normalization
//! error: adapters report it as `invalid_input`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::BundleError;

/// One place a field may be found in a raw bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSource {
    /// JSON Pointer into the raw bundle.
    pub pointer: &'static str,
    /// Lower wins.
    pub precedence: u8,
}

const fn src(pointer: &'static str, precedence: u8) -> FieldSource {
    FieldSource {
        pointer,
        precedence,
    }
}

pub const KIND_SOURCES: &[FieldSource] = &[
    src("/adapter", 0),
    src("/proofSystem", 1),
    src("/meta/proofSystem", 2),
    src("/system", 3),
];

pub const FRAMEWORK_SOURCES: &[FieldSource] = &[
    src("/framework", 0),
    src("/meta/framework", 1),
    src("/tool", 2),
];

pub const PROOF_SOURCES: &[FieldSource] = &[
    src("/proof", 0),
    src("/bundle/proof", 1),
    src("/artifacts/proof", 2),
];

pub const PUBLIC_INPUT_SOURCES: &[FieldSource] = &[
    src("/publicSignals", 0),
    src("/publicInputs", 1),
    src("/public", 2),
    src("/bundle/publicSignals", 3),
];

pub const VERIFICATION_KEY_SOURCES: &[FieldSource] = &[
    src("/verificationKey", 0),
    src("/vkey", 1),
    src("/verification_key", 2),
    src("/artifacts/verificationKey", 3),
];

/// Resolve a field through its source table. `null` counts as absent.
pub fn resolve<'a>(raw: &'a Value, sources: &[FieldSource]) -> Option<(&'static str, &'a Value)> {
    let mut ordered: Vec<&FieldSource> = sources.iter().collect();
    ordered.sort_by_key(|s| s.precedence);
    ordered.into_iter().find_map(|s| {
        raw.pointer(s.pointer)
            .filter(|v| !v.is_null())
            .map(|v| (s.pointer, v))
    })
}

/// Proof system a bundle declares.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProofSystem {
    Groth16,
    Plonk,
    Halo2,
    Mock,
    Other(String),
}

impl ProofSystem {
    fn known(token: &str) -> Option<Self> {
        match token {
            "groth16" => Some(Self::Groth16),
            "plonk" => Some(Self::Plonk),
            "halo2" => Some(Self::Halo2),
            "mock" => Some(Self::Mock),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Groth16 => "groth16",
            Self::Plonk => "plonk",
            Self::Halo2 => "halo2",
            Self::Mock => "mock",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for ProofSystem {
    fn from(s: String) -> Self {
        let lower = s.to_ascii_lowercase();
        Self::known(&lower).unwrap_or(Self::Other(lower))
    }
}

impl From<ProofSystem> for String {
    fn from(p: ProofSystem) -> Self {
        p.as_str().to_string()
    }
}

impl std::fmt::Display for ProofSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Toolchain that produced a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Framework {
    Snarkjs,
    Zokrates,
    Gnark,
    Ezkl,
    Zkpip,
    Other(String),
}

impl Framework {
    fn known(token: &str) -> Option<Self> {
        match token {
            "snarkjs" => Some(Self::Snarkjs),
            "zokrates" => Some(Self::Zokrates),
            "gnark" => Some(Self::Gnark),
            "ezkl" => Some(Self::Ezkl),
            "zkpip" => Some(Self::Zkpip),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Snarkjs => "snarkjs",
            Self::Zokrates => "zokrates",
            Self::Gnark => "gnark",
            Self::Ezkl => "ezkl",
            Self::Zkpip => "zkpip",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for Framework {
    fn from(s: String) -> Self {
        let lower = s.to_ascii_lowercase();
        Self::known(&lower).unwrap_or(Self::Other(lower))
    }
}

impl From<Framework> for String {
    fn from(f: Framework) -> Self {
        f.as_str().to_string()
    }
}

impl std::fmt::Display for Framework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split a kind string such as `groth16` or `snarkjs-groth16` into its
/// proof system and, when named, its framework.
pub fn parse_kind(kind: &str) -> (ProofSystem, Option<Framework>) {
    let lower = kind.trim().to_ascii_lowercase();
    let tokens = lower.split(|c: char| matches!(c, '-' | '_' | '/' | ':' | '.'));
    let mut system = None;
    let mut framework = None;
    for token in tokens {
        if system.is_none() {
            system = ProofSystem::known(token);
        }
        if framework.is_none() {
            framework = Framework::known(token);
        }
    }
    (system.unwrap_or(ProofSystem::Other(lower)), framework)
}

/// A bundle after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct ProofBundle {
    pub id: Option<String>,
    pub proof_system: ProofSystem,
    pub framework: Option<Framework>,
    pub proof: Option<Value>,
    pub public_inputs: Option<Value>,
    pub verification_key: Option<Value>,
}

impl ProofBundle {
    /// Normalize a raw bundle.
    pub fn normalize(raw: &Value) -> Result<Self, BundleError> {
        if !raw.is_object() {
            return Err(BundleError::NotAnObject(json_type(raw)));
        }
        let (kind_ptr, kind) = resolve(raw, KIND_SOURCES).ok_or_else(|| BundleError::Untagged {
            checked: KIND_SOURCES.iter().map(|s| s.pointer).collect(),
        })?;
        let kind = kind
            .as_str()
            .ok_or(BundleError::InvalidField { pointer: kind_ptr })?;
        let (proof_system, kind_framework) = parse_kind(kind);

        let framework = match resolve(raw, FRAMEWORK_SOURCES) {
            Some((pointer, value)) => {
                let name = value.as_str().ok_or(BundleError::InvalidField { pointer })?;
                Some(Framework::from(name.to_string()))
            }
            None => kind_framework,
        };

        Ok(Self {
            id: bundle_id(raw),
            proof_system,
            framework,
            proof: resolve(raw, PROOF_SOURCES).map(|(_, v)| v.clone()),
            public_inputs: resolve(raw, PUBLIC_INPUT_SOURCES).map(|(_, v)| v.clone()),
            verification_key: resolve(raw, VERIFICATION_KEY_SOURCES).map(|(_, v)| v.clone()),
        })
    }

    /// Names of the verification pieces this bundle lacks.
    pub fn missing_pieces(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.proof.is_none() {
            missing.push("proof");
        }
        if self.public_inputs.is_none() {
            missing.push("publicInputs");
        }
        if self.verification_key.is_none() {
            missing.push("verificationKey");
        }
        missing
    }

    /// The canonical intermediate representation (`mvs/cir`).
    pub fn to_cir(&self) -> Result<Value, BundleError> {
        let missing = self.missing_pieces();
        if !missing.is_empty() {
            return Err(BundleError::Incomplete { missing });
        }
        let mut cir = json!({
            "proofSystem": self.proof_system.as_str(),
            "proof": self.proof,
            "publicInputs": self.public_inputs,
            "verificationKey": self.verification_key,
        });
        if let Some(obj) = cir.as_object_mut() {
            if let Some(id) = &self.id {
                obj.insert("id".into(), Value::String(id.clone()));
            }
            if let Some(fw) = &self.framework {
                obj.insert("framework".into(), Value::String(fw.to_string()));
            }
        }
        Ok(cir)
    }
}

/// The bundle's own `id`, when it has a string one.
pub fn bundle_id(raw: &Value) -> Option<String> {
    raw.get("id").and_then(Value::as_str).map(str::to_string)
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_precedence() {
        let raw = json!({"system": "plonk", "meta": {"proofSystem": "halo2"}, "proofSystem": "groth16"});
        assert_eq!(resolve(&raw, KIND_SOURCES).unwrap().0, "/proofSystem");
        let raw = json!({"system": "plonk", "meta": {"proofSystem": "halo2"}});
        assert_eq!(resolve(&raw, KIND_SOURCES).unwrap().0, "/meta/proofSystem");
        let raw = json!({"adapter": "groth16", "proofSystem": "plonk"});
        assert_eq!(resolve(&raw, KIND_SOURCES).unwrap().0, "/adapter");
    }

    #[test]
    fn public_input_precedence() {
        let raw = json!({"public": [3], "publicInputs": [2], "bundle": {"publicSignals": [4]}});
        assert_eq!(resolve(&raw, PUBLIC_INPUT_SOURCES).unwrap().1, &json!([2]));
        let raw = json!({"bundle": {"publicSignals": [4]}, "publicSignals": [1]});
        assert_eq!(resolve(&raw, PUBLIC_INPUT_SOURCES).unwrap().1, &json!([1]));
    }

    #[test]
    fn verification_key_precedence() {
        let raw = json!({"artifacts": {"verificationKey": "a"}, "verification_key": "b"});
        assert_eq!(resolve(&raw, VERIFICATION_KEY_SOURCES).unwrap().1, "b");
        let raw = json!({"vkey": "v", "verificationKey": "k"});
        assert_eq!(resolve(&raw, VERIFICATION_KEY_SOURCES).unwrap().1, "k");
    }

    #[test]
    fn table_order_does_not_matter() {
        let shuffled = [src("/b", 1), src("/a", 0)];
        let raw = json!({"a": 1, "b": 2});
        assert_eq!(resolve(&raw, &shuffled).unwrap().0, "/a");
    }

    #[test]
    fn null_is_absent() {
        let raw = json!({"proof": null, "bundle": {"proof": "p"}});
        assert_eq!(resolve(&raw, PROOF_SOURCES).unwrap().0, "/bundle/proof");
    }

    #[test]
    fn parse_kind_forms() {
        assert_eq!(parse_kind("groth16"), (ProofSystem::Groth16, None));
        assert_eq!(
            parse_kind("snarkjs-groth16"),
            (ProofSystem::Groth16, Some(Framework::Snarkjs))
        );
        assert_eq!(parse_kind("EZKL/Halo2"), (ProofSystem::Halo2, Some(Framework::Ezkl)));
        assert_eq!(parse_kind("stark"), (ProofSystem::Other("stark".into()), None));
    }

    #[test]
    fn normalize_legacy_layout() {
        let raw = json!({
            "id": "b1",
            "meta": {"proofSystem": "Groth16", "framework": "snarkjs"},
            "bundle": {"proof": {"pi_a": []}, "publicSignals": ["1"]},
            "vkey": {"protocol": "groth16"}
        });
        let b = ProofBundle::normalize(&raw).unwrap();
        assert_eq!(b.id.as_deref(), Some("b1"));
        assert_eq!(b.proof_system, ProofSystem::Groth16);
        assert_eq!(b.framework, Some(Framework::Snarkjs));
        assert!(b.missing_pieces().is_empty());
    }

    #[test]
    fn explicit_framework_beats_kind_framework() {
        let raw = json!({"adapter": "snarkjs-groth16", "framework": "gnark"});
        let b = ProofBundle::normalize(&raw).unwrap();
        assert_eq!(b.framework, Some(Framework::Gnark));
    }

    #[test]
    fn untagged_rejected() {
        let err = ProofBundle::normalize(&json!({"proof": "p"})).unwrap_err();
        assert!(matches!(err, BundleError::Untagged { ref checked } if checked.len() == 4));
        assert!(matches!(
            ProofBundle::normalize(&json!([1])),
            Err(BundleError::NotAnObject("array"))
        ));
        assert!(matches!(
            ProofBundle::normalize(&json!({"proofSystem": 7})),
            Err(BundleError::InvalidField { pointer: "/proofSystem" })
        ));
    }

    #[test]
    fn cir_requires_all_pieces() {
        let b = ProofBundle::normalize(&json!({"proofSystem": "plonk", "proof": "p"})).unwrap();
        match b.to_cir().unwrap_err() {
            BundleError::Incomplete { missing } => {
                assert_eq!(missing, vec!["publicInputs", "verificationKey"])
            }
            other => panic!("{other}"),
        }
        let b = ProofBundle::normalize(&json!({
            "id": "x", "proofSystem": "plonk", "proof": "p", "public": [], "vkey": {}
        }))
        .unwrap();
        let cir = b.to_cir().unwrap();
        assert_eq!(cir["publicInputs"], json!([]));
        assert_eq!(cir["id"], "x");
        assert!(cir.get("framework").is_none());
    }
}
