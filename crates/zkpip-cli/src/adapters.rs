//! # Adapters Subcommand

use anyhow::Result;
use clap::Args;

use zkpip_adapters::AdapterRegistry;
use zkpip_core::ExitCode;

use crate::print_json;

/// Arguments for `zkpip adapters`.
#[derive(Args, Debug)]
pub struct AdaptersArgs {}

/// List registered adapters in dispatch order.
pub fn run_adapters(_args: &AdaptersArgs, registry: &AdapterRegistry) -> Result<i32> {
    let descriptors: Vec<_> = registry.descriptors().collect();
    print_json(&descriptors)?;
    Ok(ExitCode::SUCCESS)
}
