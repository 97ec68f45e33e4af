//! Type graph consumed by the engine.
//!
//! A [`Universe`] holds one [`Unit`] per compilation unit (Rust module) taking part in a run. Each unit lists the
//! type declarations found in it. Type references are already resolved to package-qualified names by the front end;
//! aliases are kept as declarations and unwrapped on demand by the classifier.
//!
//! Everything here is immutable once built. The written `syn::Type` of every reference is kept so the emitter can
//! re-emit types exactly as the user spelled them.

use std::collections::BTreeMap;

use crate::directives::Directives;
use crate::policy;

/// All compilation units of one generation run, keyed by package.
#[derive(Debug, Clone, Default)]
pub struct Universe {
    units: BTreeMap<String, Unit>,
}

impl Universe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit, replacing any unit previously registered for the same package.
    pub fn insert(&mut self, unit: Unit) {
        self.units.insert(unit.package.clone(), unit);
    }

    pub fn unit(&self, package: &str) -> Option<&Unit> {
        self.units.get(policy::canonical_package(package))
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }

    /// Find the declaration a named reference points at, if its unit is part of this run.
    pub fn lookup(&self, named: &NamedRef) -> Option<&TypeDecl> {
        self.unit(&named.package)?.decl(&named.name)
    }
}

/// Declarations of one compilation unit.
#[derive(Debug, Clone)]
pub struct Unit {
    /// Module path of the unit, e.g. `crate::model`
    pub package: String,
    pub decls: Vec<TypeDecl>,
}

impl Unit {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            decls: Vec::new(),
        }
    }

    pub fn decl(&self, name: &str) -> Option<&TypeDecl> {
        self.decls.iter().find(|d| d.name == name)
    }
}

/// A named type declaration.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: String,
    pub vis: syn::Visibility,
    /// Declares generic or lifetime parameters
    pub generic: bool,
    pub docs: DocText,
    /// Directives given through `#[builder_gen(...)]`
    pub attr_directives: Directives,
    pub kind: DeclKind,
}

impl TypeDecl {
    /// Any `pub` form counts as exported.
    pub fn is_exported(&self) -> bool {
        !matches!(self.vis, syn::Visibility::Inherited)
    }

    /// Doc-comment directives merged with attribute directives.
    pub fn directives(&self, namespace: &str) -> Directives {
        Directives::from_docs(namespace, &self.docs).merge(&self.attr_directives)
    }

    pub fn members(&self) -> Option<&[Member]> {
        match &self.kind {
            DeclKind::Record(members) => Some(members),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum DeclKind {
    /// Struct with named fields, or a unit struct (no members)
    Record(Vec<Member>),
    /// `type Name = Target;`
    Alias(TypeRef),
    TupleRecord,
    Enum,
    Union,
    Trait,
}

/// Field of a record.
#[derive(Debug, Clone)]
pub struct Member {
    /// Field name without any `r#` prefix
    pub name: String,
    pub vis: syn::Visibility,
    pub ty: TypeRef,
    /// Composed into the record (`#[serde(flatten)]` / `#[builder_gen(embed)]`)
    pub embedded: bool,
}

/// A lowered type reference.
#[derive(Debug, Clone)]
pub struct TypeRef {
    pub kind: TypeKind,
    /// The type as written at the reference site
    pub written: syn::Type,
}

impl TypeRef {
    pub fn new(kind: TypeKind, written: syn::Type) -> Self {
        Self { kind, written }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, TypeKind::Primitive)
    }
}

#[derive(Debug, Clone)]
pub enum TypeKind {
    /// Scalars, `String`, and tuples/arrays made only of those
    Primitive,
    /// A record, alias or foreign type, resolved through the universe
    Named(NamedRef),
    /// `Box<T>`
    Boxed(Box<TypeRef>),
    /// `Option<T>`
    Optional(Box<TypeRef>),
    /// `Vec<T>` / `VecDeque<T>`; `container` is the path without generic arguments
    Sequence { container: syn::Path, elem: Box<TypeRef> },
    /// `HashMap<K, V>` / `BTreeMap<K, V>`
    Mapping {
        container: syn::Path,
        key: Box<TypeRef>,
        value: Box<TypeRef>,
    },
    /// Anything the engine cannot build; the string says what it is
    Unsupported(String),
}

/// Package-qualified name of a nominal type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedRef {
    pub package: String,
    pub name: String,
    /// Written with generic arguments
    pub has_args: bool,
}

impl NamedRef {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            has_args: false,
        }
    }

    pub fn qualified(&self) -> String {
        format!("{}::{}", policy::canonical_package(&self.package), self.name)
    }
}

/// Documentation attached to a declaration.
///
/// `own` is the paragraph closest to the item; `secondary` is every paragraph before it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocText {
    pub secondary: Vec<String>,
    pub own: Vec<String>,
}

impl DocText {
    /// Split doc lines at the last blank line.
    pub fn from_lines(lines: Vec<String>) -> Self {
        match lines.iter().rposition(|l| l.trim().is_empty()) {
            Some(idx) => {
                let mut secondary = lines;
                let own = secondary.split_off(idx + 1);
                secondary.pop();
                Self { secondary, own }
            }
            None => Self {
                secondary: Vec::new(),
                own: lines,
            },
        }
    }

    /// Secondary lines first, own lines last.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.secondary.iter().chain(self.own.iter()).map(String::as_str)
    }
}
