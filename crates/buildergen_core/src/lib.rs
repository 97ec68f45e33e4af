//! Builder synthesis engine.
//!
//! Takes an already-resolved type graph ([`graph::Universe`]) and, for one compilation unit at a time, decides which
//! builder to generate for every eligible record type and emits it as Rust tokens.
//!
//! The pipeline for a unit is:
//! 1. [`eligibility`] picks the record types (and aliases of record types) that get a builder.
//! 2. [`directives`] reads the per-type generation directives from docs and attributes.
//! 3. [`classify`] classifies every member type, consulting [`policy`] for local vs foreign types.
//! 4. [`plan`] turns classifications into a [`plan::BuilderSpec`] per record.
//! 5. [`emit`] renders the specs as tokens.
//!
//! ## Notes
//! - The engine does no I/O and keeps no state between runs. Parsing sources and writing files belong to
//!   `buildergen_syntax` and the `buildergen` CLI.
//! - A member whose type cannot be handled never fails generation; it is skipped and reported as a
//!   [`Diagnostic`].

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod classify;
pub mod directives;
pub mod eligibility;
pub mod emit;
pub mod errors;
pub mod graph;
pub mod keywords;
pub mod plan;
pub mod policy;
pub mod render;

pub use directives::{DEFAULT_NAMESPACE, Directives};
pub use errors::{Diagnostic, GenerateError};
pub use graph::{DeclKind, DocText, Member, NamedRef, TypeDecl, TypeKind, TypeRef, Unit, Universe};
pub use plan::{BuilderSpec, Decision, FieldPlan, UnitPlan};

use proc_macro2::TokenStream;

use classify::Classifier;
use policy::PackagePolicy;

/// Plan the builders for every eligible record of the unit registered under `package`.
///
/// `namespace` is the doc-comment tag namespace (`+<namespace>:new-call=...`).
#[tracing::instrument(skip_all, fields(package = %package))]
pub fn plan_unit(universe: &Universe, package: &str, namespace: &str) -> Result<UnitPlan, GenerateError> {
    let unit = universe
        .unit(package)
        .ok_or_else(|| GenerateError::UnknownPackage(package.to_string()))?;
    let classifier = Classifier::new(universe, PackagePolicy::new(package), namespace);

    let mut specs = Vec::new();
    let mut diagnostics = Vec::new();
    for decl in &unit.decls {
        let Some(record) = eligibility::eligible_record(&classifier, unit, decl)? else {
            tracing::debug!(type_name = %decl.name, "not eligible for a builder");
            continue;
        };
        let (spec, notes) = BuilderSpec::plan(&classifier, &record)?;
        specs.push(spec);
        diagnostics.extend(notes);
    }

    tracing::debug!(builders = specs.len(), diagnostics = diagnostics.len(), "planned unit");
    Ok(UnitPlan {
        package: package.to_string(),
        specs,
        diagnostics,
    })
}

/// Plan and emit a unit in one step.
pub fn generate_unit(universe: &Universe, package: &str, namespace: &str) -> Result<(TokenStream, UnitPlan), GenerateError> {
    let plan = plan_unit(universe, package, namespace)?;
    Ok((plan.emit(), plan))
}
