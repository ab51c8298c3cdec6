//! # Verify Subcommand
//!
//! Verify proof bundles with a named adapter or by automatic routing.
//! Raw bundles pass through the `mvs/proofBundle` schema gate unless
//! `--no-schema-gate` is given.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use serde_json::Value;

use zkpip_adapters::{fetch_json, seal_batch, verify_auto, verify_bundle, AdapterRegistry, FileFetcher};
use zkpip_core::map_outcome;
use zkpip_schema::SchemaRegistry;

use crate::{print_json, CliContext};

/// Arguments for `zkpip verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    #[command(subcommand)]
    pub command: VerifyCommand,
}

#[derive(Subcommand, Debug)]
pub enum VerifyCommand {
    /// Verify one bundle.
    Bundle {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Adapter id; routed automatically when omitted.
        #[arg(long)]
        adapter: Option<String>,
        #[arg(long)]
        no_schema_gate: bool,
    },
    /// Verify a JSON array of bundles (or `{"bundles": [...]}`) in order.
    Batch {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long)]
        adapter: Option<String>,
        #[arg(long)]
        no_schema_gate: bool,
    },
}

pub fn run_verify(args: &VerifyArgs, ctx: &CliContext, adapters: &AdapterRegistry) -> Result<i32> {
    let fetcher = FileFetcher::with_base(&ctx.cwd);
    let gate = |skip: bool| -> Result<Option<SchemaRegistry>> {
        if skip {
            Ok(None)
        } else {
            ctx.schema_registry().map(Some)
        }
    };

    match &args.command {
        VerifyCommand::Bundle {
            file,
            adapter,
            no_schema_gate,
        } => {
            let raw = fetch(&fetcher, file)?;
            let schemas = gate(*no_schema_gate)?;
            let outcome = verify_bundle(adapters, adapter.as_deref(), &raw, schemas.as_ref());
            print_json(&outcome)?;
            Ok(map_outcome(&outcome.outcome()))
        }
        VerifyCommand::Batch {
            file,
            adapter,
            no_schema_gate,
        } => {
            let bundles = batch_items(fetch(&fetcher, file)?)?;
            let schemas = gate(*no_schema_gate)?;
            let result = match adapter {
                Some(id) => seal_batch(adapters, id, &bundles, schemas.as_ref()),
                None => verify_auto(adapters, &bundles, schemas.as_ref()),
            };
            print_json(&result)?;
            Ok(map_outcome(&result.outcome()))
        }
    }
}

fn fetch(fetcher: &FileFetcher, file: &std::path::Path) -> Result<Value> {
    let location = file.to_string_lossy();
    fetch_json(fetcher, &location).with_context(|| format!("failed to load {location}"))
}

fn batch_items(doc: Value) -> Result<Vec<Value>> {
    match doc {
        Value::Array(items) => Ok(items),
        Value::Object(mut obj) => match obj.remove("bundles") {
            Some(Value::Array(items)) => Ok(items),
            _ => bail!("batch file must be an array or an object with a \"bundles\" array"),
        },
        _ => bail!("batch file must be an array or an object with a \"bundles\" array"),
    }
}
