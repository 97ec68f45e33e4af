//! Attribute handling: doc text, `#[builder_gen(...)]` directives and embedded-member markers.

use buildergen_core::Directives;
use syn::{Attribute, Expr, ExprLit, Lit, Meta, Token};

/// Helper attribute recognized on records and fields.
pub const HELPER: &str = "builder_gen";

/// Doc lines of an item, in order, one entry per line of every `#[doc]` attribute.
pub fn doc_lines(attrs: &[Attribute]) -> Vec<String> {
    let mut lines = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("doc") {
            continue;
        }
        if let Meta::NameValue(nv) = &attr.meta {
            if let Expr::Lit(ExprLit { lit: Lit::Str(text), .. }) = &nv.value {
                lines.extend(text.value().split('\n').map(|l| l.trim_end_matches('\r').to_string()));
            }
        }
    }
    lines
}

/// Parse `#[builder_gen(...)]` on a record or alias.
///
/// Accepted: `ignore`, `ignore = <bool>`, `new_call(a, b)`, `embedded_ignore_method(x, y)`. Anything else is an error.
pub fn parse_directives(attrs: &[Attribute]) -> syn::Result<Directives> {
    let mut directives = Directives::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident(HELPER)) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("ignore") {
                directives.ignore = if meta.input.peek(Token![=]) {
                    meta.value()?.parse::<syn::LitBool>()?.value
                } else {
                    true
                };
                Ok(())
            } else if meta.path.is_ident("new_call") {
                meta.parse_nested_meta(|inner| {
                    directives.new_calls.push(path_ident(&inner.path)?);
                    Ok(())
                })
            } else if meta.path.is_ident("embedded_ignore_method") {
                meta.parse_nested_meta(|inner| {
                    directives.embedded_ignore_methods.push(path_ident(&inner.path)?);
                    Ok(())
                })
            } else if meta.path.is_ident("embed") {
                Err(meta.error("`embed` goes on a field, not on the type"))
            } else {
                Err(meta.error("unknown builder_gen directive; expected `ignore`, `new_call` or `embedded_ignore_method`"))
            }
        })?;
    }
    Ok(directives)
}

/// Whether a field is composed into its record: `#[builder_gen(embed)]` or `#[serde(flatten)]`.
///
/// `serde` attributes are read leniently; only `builder_gen` rejects unknown keys.
pub fn is_embedded(attrs: &[Attribute]) -> syn::Result<bool> {
    let mut embedded = false;
    for attr in attrs {
        if attr.path().is_ident(HELPER) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("embed") {
                    embedded = true;
                    Ok(())
                } else {
                    Err(meta.error("unknown builder_gen field option; expected `embed`"))
                }
            })?;
        } else if attr.path().is_ident("serde") && serde_flatten(attr) {
            embedded = true;
        }
    }
    Ok(embedded)
}

fn serde_flatten(attr: &Attribute) -> bool {
    attr.parse_args_with(syn::punctuated::Punctuated::<Meta, Token![,]>::parse_terminated)
        .is_ok_and(|metas| metas.iter().any(|m| matches!(m, Meta::Path(p) if p.is_ident("flatten"))))
}

fn path_ident(path: &syn::Path) -> syn::Result<String> {
    path.get_ident()
        .map(ToString::to_string)
        .ok_or_else(|| syn::Error::new_spanned(path, "expected a plain identifier"))
}

/// Remove `#[builder_gen]` helper attributes from items, their fields included.
pub fn strip_helper_attrs(items: &mut [syn::Item]) {
    let keep = |attr: &Attribute| !attr.path().is_ident(HELPER);
    for item in items {
        match item {
            syn::Item::Struct(s) => {
                s.attrs.retain(keep);
                for field in s.fields.iter_mut() {
                    field.attrs.retain(keep);
                }
            }
            syn::Item::Type(t) => t.attrs.retain(keep),
            syn::Item::Enum(e) => e.attrs.retain(keep),
            syn::Item::Union(u) => {
                u.attrs.retain(keep);
                for field in u.fields.named.iter_mut() {
                    field.attrs.retain(keep);
                }
            }
            _ => {}
        }
    }
}
