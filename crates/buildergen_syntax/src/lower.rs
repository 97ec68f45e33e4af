//! Lowering of `syn` items into a [`Unit`] of the type graph.

use buildergen_core::{DeclKind, DocText, Member, TypeDecl, TypeKind, TypeRef, Unit};
use syn::ext::IdentExt;
use syn::visit_mut::{self, VisitMut};

use crate::attrs;
use crate::errors::SyntaxError;
use crate::imports::ImportMap;

/// Scalar and string types, matched by their last path segment.
const PRIMITIVES: &[&str] = &[
    "bool", "char", "str", "String", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128",
    "usize", "f32", "f64",
];

/// Path prefixes under which standard containers and scalars are recognized.
const STD_ROOTS: &[&str] = &["std", "core", "alloc"];

/// Parse a whole source file and lower it as the unit for `package`.
pub fn parse_file(name: &str, source: &str, package: &str) -> Result<Unit, SyntaxError> {
    let file = syn::parse_file(source).map_err(|e| SyntaxError::parse(name, source, &e))?;
    lower_items(package, &file.items).map_err(|e| SyntaxError::attribute(name, source, &e))
}

/// Lower the type declarations among `items`.
///
/// Nested modules are separate units and are not descended into.
#[tracing::instrument(skip_all, fields(package = %package))]
pub fn lower_items(package: &str, items: &[syn::Item]) -> syn::Result<Unit> {
    let lowerer = Lowerer {
        imports: ImportMap::from_items(package, items),
    };
    let mut unit = Unit::new(package);
    for item in items {
        if let Some(decl) = lowerer.lower_item(item)? {
            unit.decls.push(decl);
        }
    }
    tracing::debug!(decls = unit.decls.len(), "lowered unit");
    Ok(unit)
}

struct Lowerer {
    imports: ImportMap,
}

impl Lowerer {
    fn lower_item(&self, item: &syn::Item) -> syn::Result<Option<TypeDecl>> {
        let (attrs, vis, ident, generics, kind) = match item {
            syn::Item::Struct(s) => {
                let kind = match &s.fields {
                    syn::Fields::Named(named) => DeclKind::Record(self.lower_fields(&s.ident, named)?),
                    syn::Fields::Unit => DeclKind::Record(Vec::new()),
                    syn::Fields::Unnamed(_) => DeclKind::TupleRecord,
                };
                (&s.attrs, &s.vis, &s.ident, &s.generics, kind)
            }
            syn::Item::Type(t) => {
                let target = self.lower_type(&t.ty);
                (&t.attrs, &t.vis, &t.ident, &t.generics, DeclKind::Alias(target))
            }
            syn::Item::Enum(e) => (&e.attrs, &e.vis, &e.ident, &e.generics, DeclKind::Enum),
            syn::Item::Union(u) => (&u.attrs, &u.vis, &u.ident, &u.generics, DeclKind::Union),
            syn::Item::Trait(t) => (&t.attrs, &t.vis, &t.ident, &t.generics, DeclKind::Trait),
            _ => return Ok(None),
        };

        Ok(Some(TypeDecl {
            name: ident.unraw().to_string(),
            vis: vis.clone(),
            generic: !generics.params.is_empty(),
            docs: DocText::from_lines(attrs::doc_lines(attrs)),
            attr_directives: attrs::parse_directives(attrs)?,
            kind,
        }))
    }

    fn lower_fields(&self, record: &syn::Ident, fields: &syn::FieldsNamed) -> syn::Result<Vec<Member>> {
        let mut members = Vec::with_capacity(fields.named.len());
        for field in &fields.named {
            let Some(ident) = &field.ident else {
                continue;
            };
            // Emitted setters live in the builder's impl, where `Self` means the builder.
            let mut ty = field.ty.clone();
            ReplaceSelf(record).visit_type_mut(&mut ty);
            members.push(Member {
                name: ident.unraw().to_string(),
                vis: field.vis.clone(),
                ty: self.lower_type(&ty),
                embedded: attrs::is_embedded(&field.attrs)?,
            });
        }
        Ok(members)
    }

    /// Lower a written type.
    fn lower_type(&self, ty: &syn::Type) -> TypeRef {
        let kind = match ty {
            syn::Type::Paren(inner) => return self.lower_type(&inner.elem),
            syn::Type::Group(inner) => return self.lower_type(&inner.elem),
            syn::Type::Path(path) if path.qself.is_none() => self.lower_path(&path.path),
            syn::Type::Path(_) => TypeKind::Unsupported("qualified path type".into()),
            syn::Type::Tuple(tuple) => {
                let all_primitive = tuple.elems.iter().all(|e| self.lower_type(e).is_primitive());
                if all_primitive {
                    TypeKind::Primitive
                } else {
                    TypeKind::Unsupported("tuple with non-primitive elements".into())
                }
            }
            syn::Type::Array(array) => {
                if self.lower_type(&array.elem).is_primitive() {
                    TypeKind::Primitive
                } else {
                    TypeKind::Unsupported("array of non-primitive elements".into())
                }
            }
            syn::Type::Reference(_) => TypeKind::Unsupported("reference".into()),
            syn::Type::Ptr(_) => TypeKind::Unsupported("raw pointer".into()),
            syn::Type::BareFn(_) => TypeKind::Unsupported("function pointer".into()),
            syn::Type::TraitObject(_) => TypeKind::Unsupported("trait object".into()),
            syn::Type::ImplTrait(_) => TypeKind::Unsupported("impl trait".into()),
            syn::Type::Never(_) => TypeKind::Unsupported("never type".into()),
            syn::Type::Slice(_) => TypeKind::Unsupported("unsized slice".into()),
            syn::Type::Macro(_) => TypeKind::Unsupported("macro in type position".into()),
            syn::Type::Infer(_) => TypeKind::Unsupported("inferred type".into()),
            _ => TypeKind::Unsupported("unrecognized type syntax".into()),
        };
        TypeRef::new(kind, ty.clone())
    }

    fn lower_path(&self, path: &syn::Path) -> TypeKind {
        let Some(last) = path.segments.last() else {
            return TypeKind::Unsupported("empty path".into());
        };
        if !is_std_path(path) {
            return TypeKind::Named(self.imports.resolve(path));
        }

        let name = last.ident.to_string();
        let args = type_args(&last.arguments);
        match (name.as_str(), args.as_slice()) {
            (prim, []) if PRIMITIVES.contains(&prim) => TypeKind::Primitive,
            ("Box", [inner]) => TypeKind::Boxed(Box::new(self.lower_type(inner))),
            ("Option", [inner]) => TypeKind::Optional(Box::new(self.lower_type(inner))),
            ("Vec" | "VecDeque", [elem]) => TypeKind::Sequence {
                container: bare_path(path),
                elem: Box::new(self.lower_type(elem)),
            },
            ("HashMap" | "BTreeMap", [key, value]) => TypeKind::Mapping {
                container: bare_path(path),
                key: Box::new(self.lower_type(key)),
                value: Box::new(self.lower_type(value)),
            },
            _ => TypeKind::Named(self.imports.resolve(path)),
        }
    }
}

/// Rewrites `Self` to the record name.
struct ReplaceSelf<'a>(&'a syn::Ident);

impl VisitMut for ReplaceSelf<'_> {
    fn visit_path_mut(&mut self, path: &mut syn::Path) {
        if path.leading_colon.is_none() {
            if let Some(first) = path.segments.first_mut() {
                if first.ident == "Self" {
                    first.ident = self.0.clone();
                }
            }
        }
        visit_mut::visit_path_mut(self, path);
    }
}

/// Written as a bare name, or rooted at `std`/`core`/`alloc`.
fn is_std_path(path: &syn::Path) -> bool {
    match path.segments.first() {
        Some(_) if path.segments.len() == 1 => path.leading_colon.is_none(),
        Some(first) => STD_ROOTS.iter().any(|root| first.ident == *root),
        None => false,
    }
}

/// Type arguments of a path segment; lifetimes and bindings are ignored.
fn type_args(arguments: &syn::PathArguments) -> Vec<&syn::Type> {
    match arguments {
        syn::PathArguments::AngleBracketed(args) => args
            .args
            .iter()
            .filter_map(|arg| match arg {
                syn::GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// The path with the generic arguments of its last segment removed.
fn bare_path(path: &syn::Path) -> syn::Path {
    let mut bare = path.clone();
    if let Some(last) = bare.segments.last_mut() {
        last.arguments = syn::PathArguments::None;
    }
    bare
}
