//! # zkpip CLI entry point
//!
//! Parses arguments, installs logging, resolves configuration and
//! dispatches to the subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use zkpip_adapters::AdapterRegistry;
use zkpip_cli::adapters::{run_adapters, AdaptersArgs};
use zkpip_cli::config::ZkpipConfig;
use zkpip_cli::exit::{code_for_error, finish};
use zkpip_cli::keys::{run_keys, KeysArgs};
use zkpip_cli::schema::{run_schema, SchemaArgs};
use zkpip_cli::vector::{run_vector, VectorArgs};
use zkpip_cli::vectors::{run_vectors, VectorsArgs};
use zkpip_cli::verify::{run_verify, VerifyArgs};
use zkpip_cli::CliContext;

/// ZKPIP trust layer CLI.
///
/// Seals JSON vectors with Ed25519, verifies sealed vectors and proof
/// bundles, and validates documents against the MVS schemas.
#[derive(Parser, Debug)]
#[command(name = "zkpip", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Keystore root (overrides ZKPIP_KEYS_DIR).
    #[arg(long, global = true)]
    keys_dir: Option<PathBuf>,

    /// Schema root (overrides ZKPIP_SCHEMAS_DIR).
    #[arg(long, global = true)]
    schemas_dir: Option<PathBuf>,

    /// Vector store root (overrides ZKPIP_VECTORS_DIR).
    #[arg(long, global = true)]
    vectors_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Keystore management.
    Keys(KeysArgs),

    /// Seal, verify and digest JSON vectors.
    Vector(VectorArgs),

    /// Content-addressed vector storage.
    Vectors(VectorsArgs),

    /// Verify proof bundles.
    Verify(VerifyArgs),

    /// Validate documents against registered schemas.
    Schema(SchemaArgs),

    /// List registered adapters.
    Adapters(AdaptersArgs),
}

fn init_tracing(verbose: u8, json: bool) {
    // RUST_LOG wins over -v.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let config = match ZkpipConfig::from_env() {
        Ok(config) => config.with_overrides(cli.keys_dir, cli.schemas_dir, cli.vectors_dir),
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::from(1);
        }
    };
    let hard_exit = config.hard_exit;
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let ctx = CliContext::new(config, cwd);
    tracing::debug!(config = ?ctx.config, "zkpip starting");

    let adapters = AdapterRegistry::with_builtins();

    let result = match cli.command {
        Commands::Keys(args) => run_keys(&args, &ctx),
        Commands::Vector(args) => run_vector(&args, &ctx),
        Commands::Vectors(args) => run_vectors(&args, &ctx),
        Commands::Verify(args) => run_verify(&args, &ctx, &adapters),
        Commands::Schema(args) => run_schema(&args, &ctx),
        Commands::Adapters(args) => run_adapters(&args, &adapters),
    };

    let code = match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            code_for_error(&e)
        }
    };
    finish(code, hard_exit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_global_flags_anywhere() {
        let cli = Cli::try_parse_from([
            "zkpip", "-vv", "verify", "batch", "b.json", "--adapter", "zkpip-mock", "--keys-dir", "/k",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.keys_dir, Some(PathBuf::from("/k")));
        assert!(matches!(cli.command, Commands::Verify(_)));
    }

    #[test]
    fn parse_vector_sign() {
        let cli = Cli::try_parse_from(["zkpip", "vector", "sign", "v.json", "--key-id", "abcdefgh"]).unwrap();
        assert!(matches!(cli.command, Commands::Vector(_)));
    }

    #[test]
    fn parse_schema_validate_requires_schema() {
        assert!(Cli::try_parse_from(["zkpip", "schema", "validate", "doc.json"]).is_err());
        assert!(Cli::try_parse_from(["zkpip", "schema", "validate", "-s", "mvs/issue", "doc.json"]).is_ok());
    }
}
