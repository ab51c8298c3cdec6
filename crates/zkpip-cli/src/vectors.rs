//! # Vectors Subcommand
//!
//! Content-addressed vector storage.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::json;

use zkpip_core::ExitCode;

use crate::{print_json, read_document, CliContext};

/// Arguments for `zkpip vectors`.
#[derive(Args, Debug)]
pub struct VectorsArgs {
    #[command(subcommand)]
    pub command: VectorsCommand,
}

#[derive(Subcommand, Debug)]
pub enum VectorsCommand {
    /// Store a vector under its content URN, or under `--id`.
    Put {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long)]
        id: Option<String>,
    },
    /// Print a stored vector. URN ids are integrity-checked.
    Get { id: String },
    /// List stored vector ids.
    List,
}

pub fn run_vectors(args: &VectorsArgs, ctx: &CliContext) -> Result<i32> {
    let store = ctx.vector_store();
    match &args.command {
        VectorsCommand::Put { file, id } => {
            let value = read_document(&ctx.resolve(file))?;
            match id {
                Some(id) => {
                    let path = store.put_with_id(id, &value)?;
                    print_json(&json!({"id": id, "path": path.display().to_string()}))?;
                }
                None => {
                    let urn = store.put(&value)?;
                    let path = store.path_for(urn.as_str());
                    print_json(&json!({"id": urn.as_str(), "path": path.display().to_string()}))?;
                }
            }
        }
        VectorsCommand::Get { id } => match store.get(id).context("failed to read vector")? {
            Some(value) => print_json(&value)?,
            None => {
                eprintln!("vector not found: {id}");
                return Ok(ExitCode::FAILURE);
            }
        },
        VectorsCommand::List => print_json(&store.list()?)?,
    }
    Ok(ExitCode::SUCCESS)
}
