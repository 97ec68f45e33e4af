//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::path::{Path, PathBuf};

use buildergen_core::Universe;
use buildergen_core::render::render_plan;

use super::{CliError, CliResult, ExitCode};
use crate::config::GeneratorConfig;
use crate::driver::{self, GeneratedFile};

/// Read the boilerplate header file.
pub fn read_boilerplate(path: &Path) -> CliResult<String> {
    fs::read_to_string(path)
        .map_err(|e| CliError::failure(format!("Error reading boilerplate {}: {}", path.display(), e)))
}

/// Generate builder files for every unit found under `paths`.
pub fn generate(paths: &[PathBuf], config: &GeneratorConfig, dry_run: bool) -> CliResult<ExitCode> {
    let files = driver::discover(paths, &config.suffix).map_err(CliError::report)?;
    if files.is_empty() {
        return Err(CliError::failure("No .rs files found"));
    }

    let (universe, units) = driver::load(&files, config).map_err(CliError::report)?;
    let generated = driver::generate(&universe, &units, config).map_err(CliError::report)?;
    print_diagnostics(&generated);

    if generated.is_empty() {
        println!("No eligible record types in {} file(s)", files.len());
        return Ok(ExitCode::SUCCESS);
    }

    if dry_run {
        for file in &generated {
            println!("// ---- {}", file.output.display());
            print!("{}", file.contents);
        }
        return Ok(ExitCode::SUCCESS);
    }

    driver::write_all(&generated).map_err(CliError::report)?;
    for file in &generated {
        println!("Generated: {}", file.output.display());
    }
    let builders: usize = generated.iter().map(|f| f.plan.specs.len()).sum();
    println!("\n✓ {} file(s), {} builder(s)", generated.len(), builders);
    Ok(ExitCode::SUCCESS)
}

fn print_diagnostics(files: &[GeneratedFile]) {
    for file in files {
        for diagnostic in &file.plan.diagnostics {
            eprintln!("warning: {}: {}", file.source.display(), diagnostic);
        }
    }
}

/// Print the planned builders of one file.
pub fn inspect(file: &Path, config: &GeneratorConfig) -> CliResult<ExitCode> {
    let source = fs::read_to_string(file)
        .map_err(|e| CliError::failure(format!("Error reading {}: {}", file.display(), e)))?;
    let package = driver::package_for(file, config.crate_root.as_deref()).map_err(CliError::report)?;
    let unit = buildergen_syntax::parse_file(&file.display().to_string(), &source, &package)
        .map_err(CliError::report)?;

    let mut universe = Universe::new();
    universe.insert(unit);
    let plan = buildergen_core::plan_unit(&universe, &package, &config.namespace)
        .map_err(|e| CliError::failure(format!("Error: {package}: {e}")))?;
    print!("{}", render_plan(&plan));
    Ok(ExitCode::SUCCESS)
}
