//! Source-level errors with location information for `miette` rendering.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SyntaxError {
    /// The file is not valid Rust.
    #[error("failed to parse {name}: {message}")]
    #[diagnostic(code(buildergen::syntax::parse))]
    Parse {
        name: String,
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: SourceSpan,
    },

    /// A `#[builder_gen]` attribute could not be understood.
    #[error("invalid builder_gen attribute in {name}: {message}")]
    #[diagnostic(
        code(buildergen::syntax::attribute),
        help("supported: #[builder_gen(ignore, new_call(..), embedded_ignore_method(..))] and #[builder_gen(embed)] on fields")
    )]
    Attribute {
        name: String,
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },
}

impl SyntaxError {
    pub fn parse(name: &str, source: &str, err: &syn::Error) -> Self {
        SyntaxError::Parse {
            name: name.to_string(),
            message: err.to_string(),
            src: NamedSource::new(name, source.to_string()),
            span: span_of(source, err.span()),
        }
    }

    pub fn attribute(name: &str, source: &str, err: &syn::Error) -> Self {
        SyntaxError::Attribute {
            name: name.to_string(),
            message: err.to_string(),
            src: NamedSource::new(name, source.to_string()),
            span: span_of(source, err.span()),
        }
    }
}

/// Byte range of a span inside `source`.
fn span_of(source: &str, span: proc_macro2::Span) -> SourceSpan {
    let start = byte_offset(source, span.start());
    let end = byte_offset(source, span.end()).max(start);
    (start, end - start).into()
}

/// Convert a 1-based line / 0-based char column into a byte offset, clamped to the source length.
pub fn byte_offset(source: &str, at: proc_macro2::LineColumn) -> usize {
    let mut offset = 0;
    for (idx, line) in source.split_inclusive('\n').enumerate() {
        if idx + 1 == at.line {
            let column: usize = line.chars().take(at.column).map(char::len_utf8).sum();
            return offset + column;
        }
        offset += line.len();
    }
    source.len()
}
