//! # Schema Subcommand
//!
//! Validate documents against registered schemas and list the registry.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;

use zkpip_core::{map_outcome, ErrorKind, ExitCode, Outcome, Stage};

use crate::{print_json, read_document, CliContext};

/// Arguments for `zkpip schema`.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    #[command(subcommand)]
    pub command: SchemaCommand,
}

#[derive(Subcommand, Debug)]
pub enum SchemaCommand {
    /// Validate a JSON or YAML document.
    Validate {
        /// Canonical schema id or alias, e.g. `mvs/issue`.
        #[arg(long, short)]
        schema: String,
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// List registered schemas with their aliases.
    List,
}

pub fn run_schema(args: &SchemaArgs, ctx: &CliContext) -> Result<i32> {
    let registry = ctx.schema_registry()?;
    match &args.command {
        SchemaCommand::Validate { schema, file } => {
            let document = read_document(&ctx.resolve(file))?;
            match registry.validate(schema, &document) {
                Ok(()) => {
                    print_json(&json!({"ok": true, "schema": registry.canonical_id(schema)}))?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    print_json(&json!({
                        "ok": false,
                        "code": err.kind(),
                        "message": err.to_string(),
                        "violations": err.violations(),
                    }))?;
                    let outcome = Outcome::failure(ErrorKind::SchemaInvalid).with_stage(Stage::Schema);
                    Ok(map_outcome(&outcome))
                }
            }
        }
        SchemaCommand::List => {
            let entries: Vec<_> = registry.entries().collect();
            print_json(&entries)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{context, write_json};

    fn validate(file: &str) -> SchemaArgs {
        SchemaArgs {
            command: SchemaCommand::Validate {
                schema: "mvs/issue".into(),
                file: file.into(),
            },
        }
    }

    #[test]
    fn valid_and_invalid_documents() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = context(tmp.path());
        write_json(
            &tmp.path().join("ok.json"),
            &json!({"id": "1", "title": "t", "severity": "high", "status": "open"}),
        );
        write_json(&tmp.path().join("bad.json"), &json!({"id": "1", "severity": "extreme"}));
        assert_eq!(run_schema(&validate("ok.json"), &ctx).unwrap(), 0);
        assert_eq!(run_schema(&validate("bad.json"), &ctx).unwrap(), 3);
    }

    #[test]
    fn unknown_schema_is_schema_invalid() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = context(tmp.path());
        write_json(&tmp.path().join("doc.json"), &json!({}));
        let args = SchemaArgs {
            command: SchemaCommand::Validate {
                schema: "mvs/unknown".into(),
                file: "doc.json".into(),
            },
        };
        assert_eq!(run_schema(&args, &ctx).unwrap(), 3);
    }

    #[test]
    fn missing_schema_dir_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let mut ctx = context(tmp.path());
        ctx.config.schemas_dir = Some(tmp.path().join("no-such-schemas"));
        write_json(&tmp.path().join("doc.json"), &json!({}));
        let err = run_schema(&validate("doc.json"), &ctx).unwrap_err();
        assert_eq!(crate::exit::code_for_error(&err), 2);
    }
}
