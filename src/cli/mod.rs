//! CLI module for buildergen
//!
//! ## Commands
//!
//! - `generate <PATH>...` - Generate builder files for Rust sources
//! - `inspect <FILE>` - Show the planned builders of one file without generating code
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use buildergen_core::DEFAULT_NAMESPACE;

use crate::config::DEFAULT_SUFFIX;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// Render a diagnostic with source context.
    pub fn report(err: impl miette::Diagnostic + Send + Sync + 'static) -> Self {
        Self::failure(format!("{:?}", miette::Report::new(err)))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Builder type generator for Rust record structs
#[derive(Parser, Debug)]
#[command(name = "buildergen")]
#[command(version = VERSION)]
#[command(about = "Generate builder types for Rust record structs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate builder files for Rust source files or directories
    Generate {
        /// Source files or directories (searched recursively)
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,
        /// Write generated files here instead of next to their sources
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
        /// Suffix appended to the source file stem
        #[arg(long, default_value = DEFAULT_SUFFIX)]
        suffix: String,
        /// File whose contents are placed as comments at the top of every generated file
        #[arg(long, value_name = "FILE")]
        boilerplate: Option<PathBuf>,
        /// Doc-comment directive namespace
        #[arg(long, default_value = DEFAULT_NAMESPACE)]
        namespace: String,
        /// Crate root used to derive module paths (default: nearest directory with Cargo.toml)
        #[arg(long, value_name = "DIR")]
        crate_root: Option<PathBuf>,
        /// Print generated code instead of writing files
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the builders planned for a file, without generating code
    Inspect {
        /// Source file to inspect
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Doc-comment directive namespace
        #[arg(long, default_value = DEFAULT_NAMESPACE)]
        namespace: String,
        /// Crate root used to derive the module path
        #[arg(long, value_name = "DIR")]
        crate_root: Option<PathBuf>,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Generate {
            paths,
            out_dir,
            suffix,
            boilerplate,
            namespace,
            crate_root,
            dry_run,
        } => {
            let mut config = crate::GeneratorConfig::new().with_namespace(namespace).with_suffix(suffix);
            if let Some(dir) = out_dir {
                config = config.with_out_dir(dir);
            }
            if let Some(root) = crate_root {
                config = config.with_crate_root(root);
            }
            if let Some(path) = boilerplate {
                config = config.with_boilerplate(commands::read_boilerplate(&path)?);
            }
            commands::generate(&paths, &config, dry_run)
        }
        Command::Inspect {
            file,
            namespace,
            crate_root,
        } => {
            let mut config = crate::GeneratorConfig::new().with_namespace(namespace);
            if let Some(root) = crate_root {
                config = config.with_crate_root(root);
            }
            commands::inspect(&file, &config)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
