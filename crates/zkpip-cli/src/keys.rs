//! # Keys Subcommand
//!
//! Keystore management: generate Ed25519 keypairs, list and show records,
//! and import public keys of other producers.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use zkpip_core::ExitCode;
use zkpip_crypto::KeyAlgorithm;

use crate::{print_json, CliContext};

/// Arguments for `zkpip keys`.
#[derive(Args, Debug)]
pub struct KeysArgs {
    #[command(subcommand)]
    pub command: KeysCommand,
}

#[derive(Subcommand, Debug)]
pub enum KeysCommand {
    /// Generate a new Ed25519 keypair.
    Generate,
    /// List every key in the keystore.
    List,
    /// Show one key by id or unambiguous prefix.
    Show {
        key_id: String,
    },
    /// Import a producer's SPKI public key PEM.
    Import {
        #[arg(value_name = "PEM_FILE")]
        file: PathBuf,
    },
}

pub fn run_keys(args: &KeysArgs, ctx: &CliContext) -> Result<i32> {
    let keystore = ctx.keystore()?;
    match &args.command {
        KeysCommand::Generate => {
            let record = keystore
                .generate(KeyAlgorithm::Ed25519)
                .context("failed to generate key")?;
            tracing::info!(key_id = %record.key_id, "generated key");
            print_json(&record)?;
        }
        KeysCommand::List => {
            print_json(&keystore.list().context("failed to list keys")?)?;
        }
        KeysCommand::Show { key_id } => match keystore.get(key_id)? {
            Some(record) => print_json(&record)?,
            None => {
                eprintln!("key not found: {key_id}");
                return Ok(ExitCode::FAILURE);
            }
        },
        KeysCommand::Import { file } => {
            let path = ctx.resolve(file);
            let pem = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let record = keystore.import_public(&pem).context("failed to import public key")?;
            print_json(&record)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}
