//! Generator configuration.

use std::path::PathBuf;

use buildergen_core::DEFAULT_NAMESPACE;

/// Suffix appended to a source file stem to name its generated file.
pub const DEFAULT_SUFFIX: &str = "_builder";

/// Settings for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Doc-comment tag namespace (`+<namespace>:new-call=...`)
    pub namespace: String,
    /// Appended to the source stem: `model.rs` becomes `model<suffix>.rs`
    pub suffix: String,
    /// Text placed as comments before the generated-code header
    pub boilerplate: Option<String>,
    /// Directory receiving generated files; next to each source when unset
    pub out_dir: Option<PathBuf>,
    /// Crate root used to derive module paths; found by searching upward for `Cargo.toml` when unset
    pub crate_root: Option<PathBuf>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            suffix: DEFAULT_SUFFIX.to_string(),
            boilerplate: None,
            out_dir: None,
            crate_root: None,
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn with_boilerplate(mut self, boilerplate: impl Into<String>) -> Self {
        self.boilerplate = Some(boilerplate.into());
        self
    }

    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(dir.into());
        self
    }

    pub fn with_crate_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.crate_root = Some(root.into());
        self
    }
}
