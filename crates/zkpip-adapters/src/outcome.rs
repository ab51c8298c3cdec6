//! Per-bundle verification results.

use serde::{Deserialize, Serialize};
use zkpip_core::{ErrorKind, Outcome, Stage};

/// The result of verifying one bundle. Failures always carry a code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyOutcome {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
}

impl VerifyOutcome {
    pub fn ok() -> Self {
        Self {
            ok: true,
            code: None,
            message: None,
            stage: None,
        }
    }

    pub fn fail(code: ErrorKind) -> Self {
        Self {
            ok: false,
            code: Some(code),
            message: None,
            stage: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Terminal outcome for exit-code mapping.
    pub fn outcome(&self) -> Outcome {
        Outcome {
            ok: self.ok,
            code: self.code,
            stage: self.stage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkpip_core::map_outcome;

    #[test]
    fn wire_shape() {
        let o = VerifyOutcome::fail(ErrorKind::WrongAdapter).with_message("groth16 vs plonk");
        let v = serde_json::to_value(&o).unwrap();
        assert_eq!(
            v,
            serde_json::json!({"ok": false, "code": "WRONG_ADAPTER", "message": "groth16 vs plonk"})
        );
        assert_eq!(serde_json::to_value(VerifyOutcome::ok()).unwrap(), serde_json::json!({"ok": true}));
    }

    #[test]
    fn schema_stage_maps_to_three() {
        let o = VerifyOutcome::fail(ErrorKind::SchemaInvalid).with_stage(Stage::Schema);
        assert_eq!(map_outcome(&o.outcome()), 3);
    }
}
