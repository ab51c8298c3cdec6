//! # Adapter Registry and Dispatch
//!
//! Adapters are registered in order into an [`AdapterRegistry`] value built
//! at start-up. [`AdapterRegistry::pick`] is first-match: when several
//! adapters could claim a bundle, registration order decides.
//!
//! [`dispatch`] is the only way a bundle reaches an adapter. It refuses
//! bundles of another kind with `WRONG_ADAPTER` before the adapter runs,
//! and turns adapter errors and panics into per-item outcomes.

use std::panic::{catch_unwind, AssertUnwindSafe};

use zkpip_core::{ErrorKind, Stage};

use crate::adapter::{Adapter, AdapterDescriptor};
use crate::bundle::ProofBundle;
use crate::error::RegistryError;
use crate::outcome::VerifyOutcome;

/// Ordered adapter list.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: Vec<Box<dyn Adapter>>,
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.adapters.iter().map(|a| &a.descriptor().id))
            .finish()
    }
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in adapters, followed by the mock adapter when the `mock`
    /// feature is on.
    pub fn with_builtins() -> Self {
        #[allow(unused_mut)]
        let mut adapters = crate::builtin::builtin_adapters();
        #[cfg(feature = "mock")]
        adapters.push(Box::new(crate::mock::mock_adapter()));
        Self { adapters }
    }

    /// Append an adapter. Ids are unique.
    pub fn register(&mut self, adapter: Box<dyn Adapter>) -> Result<(), RegistryError> {
        let id = &adapter.descriptor().id;
        if self.get(id).is_some() {
            return Err(RegistryError::DuplicateAdapter(id.clone()));
        }
        tracing::debug!(adapter = %id, "registered adapter");
        self.adapters.push(adapter);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&dyn Adapter> {
        self.adapters
            .iter()
            .find(|a| a.descriptor().id == id)
            .map(|a| a.as_ref())
    }

    /// First adapter that can handle the bundle.
    pub fn pick(&self, bundle: &ProofBundle) -> Option<&dyn Adapter> {
        self.adapters
            .iter()
            .find(|a| a.can_handle(bundle))
            .map(|a| a.as_ref())
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &AdapterDescriptor> {
        self.adapters.iter().map(|a| a.descriptor())
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

/// Route a bundle to an adapter.
pub fn dispatch(adapter: &dyn Adapter, bundle: &ProofBundle) -> VerifyOutcome {
    let descriptor = adapter.descriptor();
    if !descriptor.matches(bundle) {
        let declared = match &bundle.framework {
            Some(fw) => format!("{fw}-{}", bundle.proof_system),
            None => bundle.proof_system.to_string(),
        };
        return VerifyOutcome::fail(ErrorKind::WrongAdapter)
            .with_message(format!(
                "bundle declares {declared}, adapter {} handles {}",
                descriptor.id, descriptor.proof_system
            ))
            .with_stage(Stage::Verify);
    }

    match catch_unwind(AssertUnwindSafe(|| adapter.verify(bundle))) {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            tracing::warn!(adapter = %descriptor.id, error = %e, "adapter error");
            VerifyOutcome::fail(ErrorKind::AdapterError)
                .with_message(e.to_string())
                .with_stage(Stage::Verify)
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::warn!(adapter = %descriptor.id, %message, "adapter panicked");
            VerifyOutcome::fail(ErrorKind::ExceptionDuringVerify)
                .with_message(message)
                .with_stage(Stage::Verify)
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "adapter panicked".to_string()
    }
}
