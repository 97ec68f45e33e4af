//! Rust source front end for buildergen.
//!
//! Lowers `syn` items into the type graph consumed by `buildergen_core`: struct, enum, alias and trait
//! declarations, member types (with `use` imports and relative paths resolved to packages), doc text and
//! `#[builder_gen(...)]` attributes.
//!
//! Used by the `buildergen` CLI on whole files and by the `#[builders]` attribute macro on inline modules.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod attrs;
pub mod errors;
pub mod imports;
pub mod lower;

pub use errors::SyntaxError;
pub use lower::{lower_items, parse_file};
