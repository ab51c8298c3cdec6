//! # Vector Subcommand
//!
//! Seal JSON vectors with a keystore key, verify sealed vectors, and print
//! canonical digests.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::json;

use zkpip_core::{digest_value, map_outcome, ExitCode};
use zkpip_crypto::Ed25519PublicKey;
use zkpip_seal::{seal_with_keystore, verify_sealed, verify_sealed_with_key, SealedVector};

use crate::{print_json, read_document, CliContext};

/// Arguments for `zkpip vector`.
#[derive(Args, Debug)]
pub struct VectorArgs {
    #[command(subcommand)]
    pub command: VectorCommand,
}

#[derive(Subcommand, Debug)]
pub enum VectorCommand {
    /// Seal a JSON or YAML vector.
    Sign {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Signing key id or unambiguous prefix.
        #[arg(long)]
        key_id: String,
        /// Write the sealed vector here instead of stdout.
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    /// Verify a sealed vector.
    Verify {
        #[arg(value_name = "SEALED_FILE")]
        file: PathBuf,
        /// Verify with this SPKI PEM instead of the keystore.
        #[arg(long)]
        pubkey: Option<PathBuf>,
    },
    /// Print the canonical digest and URN of a vector.
    Digest {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

pub fn run_vector(args: &VectorArgs, ctx: &CliContext) -> Result<i32> {
    match &args.command {
        VectorCommand::Sign { file, key_id, out } => {
            let vector = read_document(&ctx.resolve(file))?;
            let keystore = ctx.keystore()?;
            let sealed = seal_with_keystore(vector, &keystore, key_id)
                .with_context(|| format!("failed to seal {}", file.display()))?;
            match out {
                Some(out) => {
                    let path = ctx.resolve(out);
                    sealed.save(&path)?;
                    print_json(&json!({
                        "urn": sealed.seal.urn,
                        "signer": sealed.seal.signer,
                        "path": path.display().to_string(),
                    }))?;
                }
                None => print_json(&sealed)?,
            }
            Ok(ExitCode::SUCCESS)
        }
        VectorCommand::Verify { file, pubkey } => {
            let sealed = SealedVector::load(&ctx.resolve(file))?;
            let report = match pubkey {
                Some(pem_path) => {
                    let path = ctx.resolve(pem_path);
                    let pem = std::fs::read_to_string(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    let key = Ed25519PublicKey::from_pem(&pem).context("invalid public key")?;
                    verify_sealed_with_key(&sealed, &key)
                }
                None => verify_sealed(&sealed, &ctx.keystore()?),
            };
            print_json(&report)?;
            Ok(map_outcome(&report.outcome()))
        }
        VectorCommand::Digest { file } => {
            let vector = read_document(&ctx.resolve(file))?;
            let digest = digest_value(&vector);
            print_json(&json!({
                "alg": digest.algorithm(),
                "hex": digest.to_hex(),
                "urn": digest.to_urn(),
            }))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
