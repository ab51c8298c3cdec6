//! # Outcome Taxonomy and Exit Codes
//!
//! Every terminal failure in ZKPIP carries an [`ErrorKind`]. The serialized
//! names are part of the external contract: tooling branches on them without
//! matching messages. [`map_outcome`] turns an [`Outcome`] into the process
//! exit code the CLI returns.

use serde::{Deserialize, Serialize};

/// Named failure kinds. Serialized names are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The bundle declares a different proof system or framework than the
    /// adapter it was dispatched to.
    #[serde(rename = "WRONG_ADAPTER")]
    WrongAdapter,
    /// The adapter's backend is registered but not available.
    #[serde(rename = "not_implemented")]
    NotImplemented,
    /// The backend ran and rejected the proof.
    #[serde(rename = "verification_failed")]
    VerificationFailed,
    /// Proof, public inputs or verification key missing or malformed.
    #[serde(rename = "invalid_input")]
    InvalidInput,
    /// The backend panicked.
    #[serde(rename = "exception_during_verify")]
    ExceptionDuringVerify,
    /// The adapter returned an error instead of a verdict.
    #[serde(rename = "adapter_error")]
    AdapterError,
    /// No registered adapter accepts the bundle.
    #[serde(rename = "adapter_not_found")]
    AdapterNotFound,
    /// A filesystem read or write failed.
    #[serde(rename = "io_error")]
    IoError,
    /// A document failed JSON Schema validation.
    #[serde(rename = "schema_invalid")]
    SchemaInvalid,
    /// The seal signature does not verify.
    #[serde(rename = "SIGNATURE_INVALID")]
    SignatureInvalid,
    /// The recomputed digest or URN disagrees with the seal.
    #[serde(rename = "URN_MISMATCH")]
    UrnMismatch,
    /// The seal names an algorithm other than `ed25519`.
    #[serde(rename = "ALGO_UNSUPPORTED")]
    AlgoUnsupported,
    /// The signer's public key is not in the keystore.
    #[serde(rename = "PUBLIC_KEY_NOT_FOUND")]
    PublicKeyNotFound,
}

impl ErrorKind {
    /// Every kind, in declaration order.
    pub const ALL: [ErrorKind; 13] = [
        Self::WrongAdapter,
        Self::NotImplemented,
        Self::VerificationFailed,
        Self::InvalidInput,
        Self::ExceptionDuringVerify,
        Self::AdapterError,
        Self::AdapterNotFound,
        Self::IoError,
        Self::SchemaInvalid,
        Self::SignatureInvalid,
        Self::UrnMismatch,
        Self::AlgoUnsupported,
        Self::PublicKeyNotFound,
    ];

    /// The stable wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WrongAdapter => "WRONG_ADAPTER",
            Self::NotImplemented => "not_implemented",
            Self::VerificationFailed => "verification_failed",
            Self::InvalidInput => "invalid_input",
            Self::ExceptionDuringVerify => "exception_during_verify",
            Self::AdapterError => "adapter_error",
            Self::AdapterNotFound => "adapter_not_found",
            Self::IoError => "io_error",
            Self::SchemaInvalid => "schema_invalid",
            Self::SignatureInvalid => "SIGNATURE_INVALID",
            Self::UrnMismatch => "URN_MISMATCH",
            Self::AlgoUnsupported => "ALGO_UNSUPPORTED",
            Self::PublicKeyNotFound => "PUBLIC_KEY_NOT_FOUND",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a failure happened. `Io` and `Schema` outrank the error code when
/// choosing an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Io,
    Schema,
    Verify,
    Seal,
}

/// A terminal result: success, or a failure with its kind and stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Outcome {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
}

impl Outcome {
    pub fn success() -> Self {
        Self {
            ok: true,
            code: None,
            stage: None,
        }
    }

    pub fn failure(code: ErrorKind) -> Self {
        Self {
            ok: false,
            code: Some(code),
            stage: None,
        }
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }
}

/// Stable process exit codes.
pub struct ExitCode;

impl ExitCode {
    pub const SUCCESS: i32 = 0;
    /// Verification, adapter, and seal failures.
    pub const FAILURE: i32 = 1;
    pub const IO_ERROR: i32 = 2;
    pub const SCHEMA_INVALID: i32 = 3;
    pub const ADAPTER_NOT_FOUND: i32 = 4;
}

/// Map an outcome to its exit code.
///
/// Total over the taxonomy. A failure without a code maps to
/// [`ExitCode::FAILURE`]; an `ok` outcome maps to success regardless of any
/// stray code.
pub fn map_outcome(outcome: &Outcome) -> i32 {
    if outcome.ok {
        return ExitCode::SUCCESS;
    }
    match outcome.stage {
        Some(Stage::Io) => return ExitCode::IO_ERROR,
        Some(Stage::Schema) => return ExitCode::SCHEMA_INVALID,
        _ => {}
    }
    match outcome.code {
        Some(ErrorKind::IoError) => ExitCode::IO_ERROR,
        Some(ErrorKind::SchemaInvalid) => ExitCode::SCHEMA_INVALID,
        Some(ErrorKind::AdapterNotFound) => ExitCode::ADAPTER_NOT_FOUND,
        Some(
            ErrorKind::WrongAdapter
            | ErrorKind::NotImplemented
            | ErrorKind::VerificationFailed
            | ErrorKind::InvalidInput
            | ErrorKind::ExceptionDuringVerify
            | ErrorKind::AdapterError
            | ErrorKind::SignatureInvalid
            | ErrorKind::UrnMismatch
            | ErrorKind::AlgoUnsupported
            | ErrorKind::PublicKeyNotFound,
        )
        | None => ExitCode::FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_is_zero() {
        assert_eq!(map_outcome(&Outcome::success()), 0);
    }

    #[test]
    fn test_code_table() {
        let expected = [
            (ErrorKind::WrongAdapter, 1),
            (ErrorKind::NotImplemented, 1),
            (ErrorKind::VerificationFailed, 1),
            (ErrorKind::InvalidInput, 1),
            (ErrorKind::ExceptionDuringVerify, 1),
            (ErrorKind::AdapterError, 1),
            (ErrorKind::AdapterNotFound, 4),
            (ErrorKind::IoError, 2),
            (ErrorKind::SchemaInvalid, 3),
            (ErrorKind::SignatureInvalid, 1),
            (ErrorKind::UrnMismatch, 1),
            (ErrorKind::AlgoUnsupported, 1),
            (ErrorKind::PublicKeyNotFound, 1),
        ];
        assert_eq!(expected.len(), ErrorKind::ALL.len());
        for (kind, code) in expected {
            assert_eq!(map_outcome(&Outcome::failure(kind)), code, "{kind}");
        }
    }

    #[test]
    fn test_stage_outranks_code() {
        let o = Outcome::failure(ErrorKind::VerificationFailed).with_stage(Stage::Io);
        assert_eq!(map_outcome(&o), ExitCode::IO_ERROR);
        let o = Outcome::failure(ErrorKind::AdapterNotFound).with_stage(Stage::Schema);
        assert_eq!(map_outcome(&o), ExitCode::SCHEMA_INVALID);
        let o = Outcome::failure(ErrorKind::AdapterNotFound).with_stage(Stage::Verify);
        assert_eq!(map_outcome(&o), ExitCode::ADAPTER_NOT_FOUND);
    }

    #[test]
    fn test_failure_without_code_is_generic() {
        let o = Outcome {
            ok: false,
            code: None,
            stage: None,
        };
        assert_eq!(map_outcome(&o), ExitCode::FAILURE);
    }

    #[test]
    fn test_wire_names_are_stable() {
        for kind in ErrorKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::Value::String(kind.as_str().to_string()));
            let back: ErrorKind = serde_json::from_value(json).unwrap();
            assert_eq!(back, kind);
        }
    }

    #[test]
    fn test_outcome_serialization() {
        let o = Outcome::failure(ErrorKind::WrongAdapter).with_stage(Stage::Verify);
        assert_eq!(
            serde_json::to_value(o).unwrap(),
            serde_json::json!({"ok": false, "code": "WRONG_ADAPTER", "stage": "verify"})
        );
        assert_eq!(
            serde_json::to_value(Outcome::success()).unwrap(),
            serde_json::json!({"ok": true})
        );
    }
}
