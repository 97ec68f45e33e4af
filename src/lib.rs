#![forbid(unsafe_code)]
//! buildergen: builder types for Rust record structs
//!
//! For every exported struct with named fields, buildergen generates a `<Name>Builder` with a fluent,
//! step-by-step API: setters for plain fields, accessors for nested records, `add_*` methods for sequences and maps
//! of records, and a `build()` finalizer that reassembles the aggregate.
//!
//! Builders can be produced two ways:
//!
//! - at compile time, with the [`builders`] attribute on an inline module;
//! - ahead of time, with the `buildergen generate` CLI, which writes `<file>_builder.rs` next to each source for the
//!   source module to `include!`.
//!
//! Generation is controlled per type through doc-comment tags (`+builder-gen:ignore=true`,
//! `+builder-gen:new-call=init`, `+builder-gen:embedded-ignore-method=base`) or the equivalent
//! `#[builder_gen(...)]` attribute.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` and `driver` modules
//!   enforce `#![deny(clippy::unwrap_used)]`, as do the engine and front-end crates.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod config;
pub mod driver;

pub use buildergen_core::render::render_plan;
pub use buildergen_core::{BuilderSpec, DEFAULT_NAMESPACE, Decision, Diagnostic, GenerateError, UnitPlan, Universe};
pub use buildergen_derive::builders;
pub use buildergen_syntax::SyntaxError;

pub use config::GeneratorConfig;
pub use driver::{DriverError, GeneratedFile};
