//! Emission driver: from source files on disk to formatted builder files.
//!
//! A run goes through four steps:
//! 1. [`discover`] the `.rs` files to process,
//! 2. [`load`] them into one [`Universe`], each file becoming the unit for its module path,
//! 3. [`generate`] a [`GeneratedFile`] for every unit with at least one builder,
//! 4. [`write_all`] the results (the CLI prints them instead on `--dry-run`).
//!
//! Generated files are meant to be `include!`d by the module they were generated from, so the builders see the
//! same imports as the records they build.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use buildergen_core::{GenerateError, UnitPlan, Universe};
use buildergen_syntax::SyntaxError;
use miette::Diagnostic;
use thiserror::Error;

use crate::config::GeneratorConfig;

/// First line of the code section of every generated file.
pub const HEADER: &str = "// Code generated by buildergen. DO NOT EDIT.";

#[derive(Debug, Error, Diagnostic)]
pub enum DriverError {
    #[error("no such file or directory: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("{package}: {source}")]
    #[diagnostic(code(buildergen::generate))]
    Generate {
        package: String,
        #[source]
        source: GenerateError,
    },

    #[error("generated code for {package} does not parse: {message}")]
    #[diagnostic(code(buildergen::format), help("this is a bug in buildergen"))]
    Format { package: String, message: String },

    #[error("{} is outside the crate root {}", path.display(), root.display())]
    #[diagnostic(help("pass --crate-root pointing at the directory holding Cargo.toml"))]
    OutsideCrate { path: PathBuf, root: PathBuf },

    #[error("{} and {} would both be written to {}", first.display(), second.display(), output.display())]
    #[diagnostic(help("rename one of the sources, or drop --out-dir to write next to each source"))]
    DuplicateOutput {
        output: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },
}

pub type DriverResult<T> = Result<T, DriverError>;

/// A source file read into memory, with the module path it lowers to.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub path: PathBuf,
    /// Path relative to the crate's `src` (or root), mirrored under the output directory
    pub relative: PathBuf,
    pub package: String,
    pub source: String,
}

/// Output of one unit.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    pub source: PathBuf,
    pub output: PathBuf,
    pub package: String,
    pub contents: String,
    pub plan: UnitPlan,
}

/// Collect the `.rs` files under `paths`, sorted and deduplicated.
///
/// Directories are walked recursively, skipping hidden directories, `target`, and files that look like earlier
/// output (`*<suffix>.rs`). Files named explicitly are always taken.
pub fn discover(paths: &[PathBuf], suffix: &str) -> DriverResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            walk(path, suffix, &mut files)?;
        } else {
            return Err(DriverError::NotFound(path.clone()));
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn walk(dir: &Path, suffix: &str, files: &mut Vec<PathBuf>) -> DriverResult<()> {
    let entries = fs::read_dir(dir).map_err(|source| DriverError::Read {
        path: dir.to_path_buf(),
        source,
    })?;
    let generated = format!("{suffix}.rs");
    for entry in entries {
        let path = entry
            .map_err(|source| DriverError::Read {
                path: dir.to_path_buf(),
                source,
            })?
            .path();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if path.is_dir() {
            if !name.starts_with('.') && name != "target" {
                walk(&path, suffix, files)?;
            }
        } else if name.ends_with(".rs") && !name.ends_with(&generated) {
            files.push(path);
        }
    }
    Ok(())
}

/// Path of a source file relative to `<root>/src` when it is under it, else relative to the root.
///
/// Both paths are made absolute first, so relative roots such as `.` work. With no root configured the nearest
/// ancestor holding a `Cargo.toml` is used; without one the file name alone is returned.
pub fn crate_relative(path: &Path, crate_root: Option<&Path>) -> DriverResult<PathBuf> {
    let path = absolute(path)?;
    let root = match crate_root {
        Some(root) => Some(absolute(root)?),
        None => find_crate_root(&path),
    };
    let Some(root) = root else {
        return Ok(path.file_name().map(PathBuf::from).unwrap_or_default());
    };

    let src = root.join("src");
    path.strip_prefix(&src)
        .or_else(|_| path.strip_prefix(&root))
        .map(Path::to_path_buf)
        .map_err(|_| DriverError::OutsideCrate {
            path: path.clone(),
            root: root.clone(),
        })
}

fn absolute(path: &Path) -> DriverResult<PathBuf> {
    std::path::absolute(path).map_err(|source| DriverError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Module path of a source file: `src/model.rs` is `crate::model`, `src/a/mod.rs` is `crate::a`,
/// `src/lib.rs` is `crate`. See [`crate_relative`] for how the crate root is found.
pub fn package_for(path: &Path, crate_root: Option<&Path>) -> DriverResult<String> {
    crate_relative(path, crate_root).map(|relative| package_of(&relative))
}

fn package_of(relative: &Path) -> String {
    let mut segments: Vec<String> = relative
        .with_extension("")
        .components()
        .filter_map(|c| c.as_os_str().to_str().map(str::to_string))
        .collect();
    if segments.last().is_some_and(|last| last == "mod") {
        segments.pop();
    }
    module_path(&segments)
}

fn module_path(segments: &[String]) -> String {
    match segments {
        [] => "crate".to_string(),
        [only] if only == "lib" || only == "main" => "crate".to_string(),
        _ => format!("crate::{}", segments.join("::")),
    }
}

fn find_crate_root(path: &Path) -> Option<PathBuf> {
    path.ancestors()
        .skip(1)
        .find(|dir| dir.join("Cargo.toml").is_file())
        .map(Path::to_path_buf)
}

/// Read and lower every file into one universe.
#[tracing::instrument(skip_all, fields(files = files.len()))]
pub fn load(files: &[PathBuf], config: &GeneratorConfig) -> DriverResult<(Universe, Vec<SourceUnit>)> {
    let mut universe = Universe::new();
    let mut units = Vec::with_capacity(files.len());
    for path in files {
        let source = fs::read_to_string(path).map_err(|source| DriverError::Read {
            path: path.clone(),
            source,
        })?;
        let relative = crate_relative(path, config.crate_root.as_deref())?;
        let package = package_of(&relative);
        let name = path.display().to_string();
        let unit = buildergen_syntax::parse_file(&name, &source, &package)?;
        if universe.unit(&package).is_some() {
            tracing::warn!(%package, path = %name, "module path seen twice; the later file wins");
        }
        tracing::debug!(%package, path = %name, decls = unit.decls.len(), "loaded unit");
        universe.insert(unit);
        units.push(SourceUnit {
            path: path.clone(),
            relative,
            package,
            source,
        });
    }
    Ok((universe, units))
}

/// Generate every unit that has at least one eligible record, in file order.
#[tracing::instrument(skip_all)]
pub fn generate(universe: &Universe, units: &[SourceUnit], config: &GeneratorConfig) -> DriverResult<Vec<GeneratedFile>> {
    let mut out = Vec::new();
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
    for unit in units {
        let plan = buildergen_core::plan_unit(universe, &unit.package, &config.namespace).map_err(|source| {
            DriverError::Generate {
                package: unit.package.clone(),
                source,
            }
        })?;
        if plan.is_empty() {
            tracing::debug!(package = %unit.package, "no builders");
            continue;
        }
        let output = output_path(&unit.path, &unit.relative, config);
        if let Some(first) = claimed.insert(output.clone(), unit.path.clone()) {
            return Err(DriverError::DuplicateOutput {
                output,
                first,
                second: unit.path.clone(),
            });
        }
        let contents = render_file(&plan, config)?;
        out.push(GeneratedFile {
            source: unit.path.clone(),
            output,
            package: unit.package.clone(),
            contents,
            plan,
        });
    }
    Ok(out)
}

/// Discover, load and generate in one call.
pub fn run(paths: &[PathBuf], config: &GeneratorConfig) -> DriverResult<Vec<GeneratedFile>> {
    let files = discover(paths, &config.suffix)?;
    let (universe, units) = load(&files, config)?;
    generate(&universe, &units, config)
}

/// Format a plan into the text of a generated file.
pub fn render_file(plan: &UnitPlan, config: &GeneratorConfig) -> DriverResult<String> {
    let file: syn::File = syn::parse2(plan.emit()).map_err(|e| DriverError::Format {
        package: plan.package.clone(),
        message: e.to_string(),
    })?;

    let mut text = String::new();
    if let Some(boilerplate) = &config.boilerplate {
        for line in boilerplate.lines() {
            text.push_str(&comment_line(line));
            text.push('\n');
        }
    }
    text.push_str(HEADER);
    text.push_str("\n\n");
    text.push_str(&prettyplease::unparse(&file));
    Ok(text)
}

fn comment_line(line: &str) -> String {
    let trimmed = line.trim_end();
    if trimmed.trim_start().starts_with("//") {
        trimmed.to_string()
    } else if trimmed.is_empty() {
        "//".to_string()
    } else {
        format!("// {trimmed}")
    }
}

/// `<stem><suffix>.rs`, next to the source, or under the output directory at the source's crate-relative location.
pub fn output_path(source: &Path, relative: &Path, config: &GeneratorConfig) -> PathBuf {
    let stem = source.file_stem().and_then(|s| s.to_str()).unwrap_or("generated");
    let name = format!("{stem}{}.rs", config.suffix);
    match &config.out_dir {
        Some(dir) => dir.join(relative.with_file_name(name)),
        None => source.with_file_name(name),
    }
}

/// Write every generated file, creating output directories as needed.
pub fn write_all(files: &[GeneratedFile]) -> DriverResult<()> {
    for file in files {
        if let Some(parent) = file.output.parent() {
            fs::create_dir_all(parent).map_err(|source| DriverError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&file.output, &file.contents).map_err(|source| DriverError::Write {
            path: file.output.clone(),
            source,
        })?;
        tracing::info!(path = %file.output.display(), builders = file.plan.specs.len(), "wrote builders");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    fn unique_temp_dir() -> PathBuf {
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let pid = std::process::id();
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let dir = std::env::temp_dir().join(format!("buildergen_driver_test_{ts}_{pid}_{id}"));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_package_for_layouts() {
        let root = Path::new("/work/app");
        let cases = [
            ("/work/app/src/model.rs", "crate::model"),
            ("/work/app/src/a/mod.rs", "crate::a"),
            ("/work/app/src/a/b.rs", "crate::a::b"),
            ("/work/app/src/lib.rs", "crate"),
            ("/work/app/src/main.rs", "crate"),
            ("/work/app/model.rs", "crate::model"),
        ];
        for (path, expected) in cases {
            assert_eq!(package_for(Path::new(path), Some(root)).unwrap(), expected, "{path}");
        }
        assert!(matches!(
            package_for(Path::new("/elsewhere/x.rs"), Some(root)),
            Err(DriverError::OutsideCrate { .. })
        ));
    }

    #[test]
    fn test_package_for_relative_root() {
        let root = Path::new(".");
        assert_eq!(package_for(Path::new("src/model.rs"), Some(root)).unwrap(), "crate::model");
        assert_eq!(package_for(Path::new("./src/a/mod.rs"), Some(root)).unwrap(), "crate::a");
        let absolute_file = std::env::current_dir().unwrap().join("src/shop/order.rs");
        assert_eq!(package_for(&absolute_file, Some(root)).unwrap(), "crate::shop::order");
    }

    #[test]
    fn test_package_for_finds_cargo_toml() {
        let dir = unique_temp_dir();
        fs::write(dir.join("Cargo.toml"), "[package]\nname = \"app\"\n").unwrap();
        fs::create_dir_all(dir.join("src/shop")).unwrap();
        let file = dir.join("src/shop/order.rs");
        assert_eq!(package_for(&file, None).unwrap(), "crate::shop::order");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_discover_skips_generated_hidden_and_target() {
        let dir = unique_temp_dir();
        for sub in ["a", ".git", "target"] {
            fs::create_dir_all(dir.join(sub)).unwrap();
        }
        for file in ["model.rs", "model_builder.rs", "a/line.rs", ".git/x.rs", "target/y.rs", "notes.txt"] {
            fs::write(dir.join(file), "").unwrap();
        }
        let files = discover(std::slice::from_ref(&dir), "_builder").unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(&dir).unwrap().display().to_string())
            .collect();
        assert_eq!(names, vec!["a/line.rs", "model.rs"]);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_discover_missing_path() {
        let err = discover(&[PathBuf::from("/definitely/not/here.rs")], "_builder").unwrap_err();
        assert!(matches!(err, DriverError::NotFound(_)));
    }

    #[test]
    fn test_output_path() {
        let source = Path::new("/work/app/src/model.rs");
        let config = GeneratorConfig::default();
        assert_eq!(
            output_path(source, Path::new("model.rs"), &config),
            PathBuf::from("/work/app/src/model_builder.rs")
        );
        let config = config.with_out_dir("/tmp/out").with_suffix("_gen");
        assert_eq!(
            output_path(source, Path::new("model.rs"), &config),
            PathBuf::from("/tmp/out/model_gen.rs")
        );
        let nested = Path::new("/work/app/src/a/mod.rs");
        assert_eq!(
            output_path(nested, Path::new("a/mod.rs"), &config),
            PathBuf::from("/tmp/out/a/mod_gen.rs")
        );
    }

    #[test]
    fn test_out_dir_keeps_same_named_units_apart() {
        let dir = unique_temp_dir();
        fs::write(dir.join("Cargo.toml"), "[package]\nname = \"app\"\n").unwrap();
        for (module, record) in [("a", "RecA"), ("b", "RecB")] {
            fs::create_dir_all(dir.join("src").join(module)).unwrap();
            fs::write(dir.join("src").join(module).join("mod.rs"), format!("pub struct {record} {{ pub id: u64 }}\n")).unwrap();
        }

        let out = dir.join("gen");
        let config = GeneratorConfig::default().with_out_dir(&out);
        let files = run(&[dir.join("src")], &config).unwrap();
        let outputs: Vec<PathBuf> = files.iter().map(|f| f.output.clone()).collect();
        assert_eq!(outputs, vec![out.join("a/mod_builder.rs"), out.join("b/mod_builder.rs")]);

        write_all(&files).unwrap();
        assert!(fs::read_to_string(out.join("a/mod_builder.rs")).unwrap().contains("RecABuilder"));
        assert!(fs::read_to_string(out.join("b/mod_builder.rs")).unwrap().contains("RecBBuilder"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_duplicate_output_is_an_error() {
        let dir = unique_temp_dir();
        for sub in ["one", "two"] {
            fs::create_dir_all(dir.join(sub)).unwrap();
            fs::write(dir.join(sub).join("model.rs"), "pub struct Order { pub id: u64 }\n").unwrap();
        }
        // No Cargo.toml anywhere above, so both files land on `model_builder.rs`.
        let config = GeneratorConfig::default().with_out_dir(dir.join("gen"));
        let files = vec![dir.join("one/model.rs"), dir.join("two/model.rs")];
        let (universe, units) = load(&files, &config).unwrap();
        let err = generate(&universe, &units, &config).unwrap_err();
        assert!(matches!(err, DriverError::DuplicateOutput { .. }));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_comment_line() {
        assert_eq!(comment_line("Copyright 2026"), "// Copyright 2026");
        assert_eq!(comment_line("// already"), "// already");
        assert_eq!(comment_line(""), "//");
    }

    #[test]
    fn test_run_writes_builders_for_units_with_records() {
        let dir = unique_temp_dir();
        fs::create_dir_all(dir.join("src")).unwrap();
        fs::write(dir.join("Cargo.toml"), "[package]\nname = \"app\"\n").unwrap();
        fs::write(
            dir.join("src/model.rs"),
            "pub struct Order { pub id: u64, pub lines: Vec<Line> }\npub struct Line { pub sku: String }\n",
        )
        .unwrap();
        fs::write(dir.join("src/util.rs"), "pub fn helper() {}\n").unwrap();

        let config = GeneratorConfig::default().with_boilerplate("Copyright 2026 Example");
        let files = run(&[dir.join("src")], &config).unwrap();
        assert_eq!(files.len(), 1);
        let generated = &files[0];
        assert_eq!(generated.package, "crate::model");
        assert!(generated.contents.starts_with("// Copyright 2026 Example\n// Code generated by buildergen. DO NOT EDIT.\n"));
        assert!(generated.contents.contains("pub struct OrderBuilder"));
        assert!(generated.contents.contains("pub fn add_lines(&mut self) -> &mut LineBuilder"));

        write_all(&files).unwrap();
        let written = fs::read_to_string(dir.join("src/model_builder.rs")).unwrap();
        assert_eq!(written, generated.contents);

        // A second run ignores the file it produced.
        let again = run(&[dir.join("src")], &config).unwrap();
        assert_eq!(again.len(), 1);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_generate_error_names_package() {
        let dir = unique_temp_dir();
        fs::write(dir.join("model.rs"), "/// +builder-gen:new-call=not valid\npub struct Order { pub id: u64 }\n").unwrap();
        let err = run(&[dir.join("model.rs")], &GeneratorConfig::default()).unwrap_err();
        assert!(err.to_string().contains("not valid"));
        let _ = fs::remove_dir_all(&dir);
    }
}
