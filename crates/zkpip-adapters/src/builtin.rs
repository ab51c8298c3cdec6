//! Built-in adapters, in registration order.
//!
//! The production verifiers are external; until one is linked in, each
//! built-in adapter reports `not_implemented`.

use crate::adapter::{Adapter, AdapterDescriptor, BackendAdapter};
use crate::bundle::{Framework, ProofSystem};
use crate::traits::UnavailableBackend;

/// Descriptors of the built-in adapters.
pub fn builtin_descriptors() -> Vec<AdapterDescriptor> {
    vec![
        AdapterDescriptor::new("snarkjs-groth16", ProofSystem::Groth16, Framework::Snarkjs),
        AdapterDescriptor::new("snarkjs-plonk", ProofSystem::Plonk, Framework::Snarkjs),
        AdapterDescriptor::new("zokrates-groth16", ProofSystem::Groth16, Framework::Zokrates),
        AdapterDescriptor::new("gnark-groth16", ProofSystem::Groth16, Framework::Gnark),
        AdapterDescriptor::new("ezkl-halo2", ProofSystem::Halo2, Framework::Ezkl),
    ]
}

/// Built-in adapters backed by [`UnavailableBackend`].
pub fn builtin_adapters() -> Vec<Box<dyn Adapter>> {
    builtin_descriptors()
        .into_iter()
        .map(|d| {
            let reason = format!("no {} verifier linked for {}", d.proof_system, d.framework);
            Box::new(BackendAdapter::new(d, UnavailableBackend::new(reason))) as Box<dyn Adapter>
        })
        .collect()
}
