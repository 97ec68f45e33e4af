//! Classify member types into the shapes the planner understands.
//!
//! Classification is structural: aliases are unwrapped, one level of reference wrapper (`Box`, `Option`,
//! `Option<Box<_>>`) is peeled off and remembered as an [`Indirection`], and the remaining effective type is sorted
//! into a [`Classification`]. Directives play no part here.
//!
//! Locality is decided once, through the [`PackagePolicy`], and stored on every [`RecordTarget`].

use std::collections::HashSet;
use std::fmt;

use crate::directives::Directives;
use crate::errors::GenerateError;
use crate::graph::{DeclKind, Member, NamedRef, TypeDecl, TypeKind, TypeRef, Universe};
use crate::policy::PackagePolicy;

/// Reference shape of a field or element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indirection {
    /// `T`
    Value,
    /// `Box<T>`
    Boxed,
    /// `Option<T>`
    Optional,
    /// `Option<Box<T>>`
    OptionalBoxed,
}

impl Indirection {
    /// Can be absent, so a nested builder for it is created lazily.
    pub fn is_nullable(self) -> bool {
        matches!(self, Indirection::Optional | Indirection::OptionalBoxed)
    }

    pub fn is_boxed(self) -> bool {
        matches!(self, Indirection::Boxed | Indirection::OptionalBoxed)
    }
}

impl fmt::Display for Indirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Indirection::Value => "value",
            Indirection::Boxed => "boxed",
            Indirection::Optional => "optional",
            Indirection::OptionalBoxed => "optional-boxed",
        })
    }
}

/// A record type a nested builder could be generated for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTarget {
    pub name: String,
    pub package: String,
    pub local: bool,
}

/// Classification of a sequence element or mapping value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Primitive,
    Record { target: RecordTarget, indirection: Indirection },
    /// Foreign, opaque, nested collections and everything else
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Unsupported(String),
    Primitive,
    Sequence(Element),
    Mapping { key_primitive: bool, value: Element },
    Record { target: RecordTarget, embedded: bool },
    /// Named type outside the unit, or not found in the universe
    Foreign { package: String },
    /// Named local type that gets no builder (enum, ignored or private record, generic instance)
    Opaque(String),
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Unsupported(reason) => write!(f, "unsupported: {reason}"),
            Classification::Primitive => f.write_str("primitive"),
            Classification::Sequence(elem) => write!(f, "sequence of {elem}"),
            Classification::Mapping { key_primitive, value } => {
                let key = if *key_primitive { "primitive" } else { "non-primitive" };
                write!(f, "mapping of {key} key to {value}")
            }
            Classification::Record { target, embedded } => {
                let kind = if *embedded { "embedded record" } else { "record" };
                write!(f, "{kind} {}", target)
            }
            Classification::Foreign { package } => write!(f, "foreign type from {package}"),
            Classification::Opaque(reason) => write!(f, "opaque: {reason}"),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Primitive => f.write_str("primitive"),
            Element::Record { target, indirection } => write!(f, "{indirection} record {target}"),
            Element::Other => f.write_str("other"),
        }
    }
}

impl fmt::Display for RecordTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let locality = if self.local { "local" } else { "foreign" };
        write!(f, "{} ({locality})", self.name)
    }
}

/// Classification of one member, plus its outer reference shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedMember {
    pub indirection: Indirection,
    pub class: Classification,
}

/// Classifies types against a universe, for one target unit.
pub struct Classifier<'g> {
    universe: &'g Universe,
    policy: PackagePolicy<'g>,
    namespace: &'g str,
}

impl<'g> Classifier<'g> {
    pub fn new(universe: &'g Universe, policy: PackagePolicy<'g>, namespace: &'g str) -> Self {
        Self {
            universe,
            policy,
            namespace,
        }
    }

    pub fn universe(&self) -> &'g Universe {
        self.universe
    }

    pub fn policy(&self) -> PackagePolicy<'g> {
        self.policy
    }

    pub fn namespace(&self) -> &'g str {
        self.namespace
    }

    /// Follow alias declarations until a non-alias type is reached.
    ///
    /// Generic aliases are not followed. A cycle is an error.
    pub fn unwrap_aliases<'a>(&'a self, ty: &'a TypeRef) -> Result<&'a TypeRef, GenerateError> {
        let mut current = ty;
        let mut visited: HashSet<String> = HashSet::new();
        let mut chain: Vec<String> = Vec::new();
        while let TypeKind::Named(named) = &current.kind {
            let Some((decl, target)) = self.alias_target(named) else {
                break;
            };
            let key = named.qualified();
            chain.push(decl.name.clone());
            if !visited.insert(key) {
                return Err(GenerateError::AliasCycle { chain });
            }
            current = target;
        }
        Ok(current)
    }

    fn alias_target(&self, named: &NamedRef) -> Option<(&'g TypeDecl, &'g TypeRef)> {
        let decl = self.universe.lookup(named)?;
        match &decl.kind {
            DeclKind::Alias(target) if !decl.generic => Some((decl, target)),
            _ => None,
        }
    }

    /// Unwrap aliases, then one reference wrapper, then aliases again.
    ///
    /// Returns the indirection and the effective type.
    pub fn peel<'a>(&'a self, ty: &'a TypeRef) -> Result<(Indirection, &'a TypeRef), GenerateError> {
        let declared = self.unwrap_aliases(ty)?;
        let peeled = match &declared.kind {
            TypeKind::Optional(inner) => {
                let inner = self.unwrap_aliases(inner)?;
                match &inner.kind {
                    TypeKind::Boxed(boxed) => (Indirection::OptionalBoxed, self.unwrap_aliases(boxed)?),
                    _ => (Indirection::Optional, inner),
                }
            }
            TypeKind::Boxed(inner) => (Indirection::Boxed, self.unwrap_aliases(inner)?),
            _ => (Indirection::Value, declared),
        };
        Ok(peeled)
    }

    /// Classify a member of a record.
    pub fn classify(&self, member: &Member) -> Result<ClassifiedMember, GenerateError> {
        let (indirection, effective) = self.peel(&member.ty)?;
        let class = match &effective.kind {
            TypeKind::Optional(_) | TypeKind::Boxed(_) => {
                Classification::Unsupported("nested reference wrappers".to_string())
            }
            TypeKind::Unsupported(what) => Classification::Unsupported(what.clone()),
            TypeKind::Primitive => Classification::Primitive,
            TypeKind::Sequence { elem, .. } => Classification::Sequence(self.classify_element(elem)?),
            TypeKind::Mapping { key, value, .. } => Classification::Mapping {
                key_primitive: self.unwrap_aliases(key)?.is_primitive(),
                value: self.classify_element(value)?,
            },
            TypeKind::Named(named) => self.classify_named(named, member.embedded),
        };
        Ok(ClassifiedMember { indirection, class })
    }

    fn classify_element(&self, ty: &TypeRef) -> Result<Element, GenerateError> {
        let (indirection, effective) = self.peel(ty)?;
        let elem = match &effective.kind {
            TypeKind::Primitive => Element::Primitive,
            TypeKind::Named(named) => match self.classify_named(named, false) {
                Classification::Record { target, .. } => Element::Record { target, indirection },
                _ => Element::Other,
            },
            _ => Element::Other,
        };
        Ok(elem)
    }

    fn classify_named(&self, named: &NamedRef, embedded: bool) -> Classification {
        let local = self.policy.is_local(&named.package);
        let Some(decl) = self.universe.lookup(named) else {
            return Classification::Foreign {
                package: named.package.clone(),
            };
        };
        match &decl.kind {
            DeclKind::Record(_) if named.has_args || decl.generic => {
                Classification::Opaque(format!("generic record {}", decl.name))
            }
            DeclKind::Record(_) if local && !self.has_builder(decl) => {
                Classification::Opaque(format!("{} gets no builder", decl.name))
            }
            DeclKind::Record(_) => Classification::Record {
                target: RecordTarget {
                    name: decl.name.clone(),
                    package: named.package.clone(),
                    local,
                },
                embedded,
            },
            _ if local => Classification::Opaque(format!("{} is not a record", decl.name)),
            _ => Classification::Foreign {
                package: named.package.clone(),
            },
        }
    }

    /// Whether a record declaration satisfies the eligibility rules on its own.
    pub fn has_builder(&self, decl: &TypeDecl) -> bool {
        decl.is_exported() && !decl.generic && !self.directives(decl).ignore && decl.members().is_some()
    }

    pub fn directives(&self, decl: &TypeDecl) -> Directives {
        decl.directives(self.namespace)
    }
}
