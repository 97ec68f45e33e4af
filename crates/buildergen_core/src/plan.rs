//! Per-record generation decisions.
//!
//! [`BuilderSpec::plan`] maps every member of an eligible record to exactly one [`Decision`]. The mapping only looks
//! at the member's classification, its reference shape, locality of the nested type, and the record's directives.
//! Nothing is emitted here; [`crate::emit`] renders the specs.

use std::collections::HashSet;

use proc_macro2::TokenStream;

use crate::classify::{Classification, ClassifiedMember, Classifier, Element, Indirection, RecordTarget};
use crate::eligibility::EligibleRecord;
use crate::errors::{Diagnostic, GenerateError};
use crate::graph::{Member, TypeKind};

/// Builder method names the generated builder already defines.
const RESERVED_METHODS: &[&str] = &["new", "build"];

/// Planned builder for one record (or alias of a record).
#[derive(Debug, Clone)]
pub struct BuilderSpec {
    /// Type the builder produces
    pub model: String,
    /// Name of the generated builder type
    pub builder: String,
    pub vis: syn::Visibility,
    /// Methods invoked on the fresh model in `new()`
    pub new_calls: Vec<String>,
    /// Builder field holding the model
    pub model_field: String,
    pub fields: Vec<FieldPlan>,
    /// Field whose builder the outer builder derefs to
    pub promoted: Option<usize>,
}

/// Decision for one member.
#[derive(Debug, Clone)]
pub struct FieldPlan {
    pub member: String,
    /// Name of the generated method (setter, accessor or `add_*`)
    pub method: String,
    pub vis: syn::Visibility,
    /// Member type as declared, used by setters
    pub written: syn::Type,
    pub classified: ClassifiedMember,
    pub decision: Decision,
}

/// Nested builder reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nested {
    pub builder: String,
    pub indirection: Indirection,
}

impl Nested {
    fn for_target(target: &RecordTarget, indirection: Indirection) -> Self {
        Self {
            builder: builder_name(&target.name),
            indirection,
        }
    }

    /// Created in `new()` rather than on first access.
    pub fn is_eager(&self) -> bool {
        !self.indirection.is_nullable()
    }
}

#[derive(Debug, Clone)]
pub enum Decision {
    /// Plain setter writing the model field
    Setter,
    /// `add_<field>()` appending a nested builder
    AddToSequence { elem: Nested },
    /// `add_<field>(key)` storing a nested builder under a key
    AddToMapping {
        container: syn::Path,
        key: syn::Type,
        value: Nested,
    },
    /// Single nested builder, with an accessor unless suppressed
    Nested {
        nested: Nested,
        embedded: bool,
        accessor: bool,
    },
    /// Nothing generated; the field keeps its default
    Skip,
}

impl Decision {
    /// Builder carries state for this field.
    pub fn has_state(&self) -> bool {
        !matches!(self, Decision::Setter | Decision::Skip)
    }

    /// A builder method is emitted for this field.
    pub fn has_method(&self) -> bool {
        !matches!(self, Decision::Skip | Decision::Nested { accessor: false, .. })
    }
}

/// Builder name for a record name.
pub fn builder_name(record: &str) -> String {
    format!("{record}Builder")
}

impl BuilderSpec {
    /// Plan the builder for an eligible record.
    pub fn plan(classifier: &Classifier<'_>, record: &EligibleRecord<'_>) -> Result<(Self, Vec<Diagnostic>), GenerateError> {
        let name = &record.decl.name;
        let mut diagnostics = Vec::new();
        let mut fields = Vec::with_capacity(record.members.len());
        let mut taken: HashSet<String> = RESERVED_METHODS.iter().map(|m| m.to_string()).collect();

        for member in record.members {
            let classified = classifier.classify(member)?;
            let decision = decide(classifier, record, member, &classified)?;
            if let Classification::Unsupported(what) = &classified.class {
                tracing::debug!(record = %name, member = %member.name, %what, "unsupported member type");
                diagnostics.push(Diagnostic::member(name, &member.name, format!("skipped, unsupported type: {what}")));
            }
            let natural = method_name(&member.name, &decision);
            let method = if decision.has_method() {
                let method = unique_method(&natural, &taken);
                if method != natural {
                    diagnostics.push(Diagnostic::member(
                        name,
                        &member.name,
                        format!("method renamed to `{method}`, `{natural}` is already taken"),
                    ));
                }
                taken.insert(method.clone());
                method
            } else {
                natural
            };
            fields.push(FieldPlan {
                member: member.name.clone(),
                method,
                vis: member.vis.clone(),
                written: member.ty.written.clone(),
                classified,
                decision,
            });
        }

        for suppressed in &record.directives.embedded_ignore_methods {
            let matched = fields
                .iter()
                .any(|f| f.member == *suppressed && matches!(f.decision, Decision::Nested { embedded: true, .. }));
            if !matched {
                diagnostics.push(Diagnostic::record(
                    name,
                    format!("`embedded-ignore-method` names `{suppressed}`, which is not an embedded member"),
                ));
            }
        }

        let promoted = promoted_field(&fields);
        let model_field = model_field_name(&fields);
        let spec = BuilderSpec {
            model: name.clone(),
            builder: builder_name(name),
            vis: record.decl.vis.clone(),
            new_calls: record.directives.new_calls.clone(),
            model_field,
            fields,
            promoted,
        };
        Ok((spec, diagnostics))
    }

    /// Fields that keep builder state, in declaration order.
    pub fn stateful_fields(&self) -> impl Iterator<Item = &FieldPlan> {
        self.fields.iter().filter(|f| f.decision.has_state())
    }
}

fn decide(
    classifier: &Classifier<'_>,
    record: &EligibleRecord<'_>,
    member: &Member,
    classified: &ClassifiedMember,
) -> Result<Decision, GenerateError> {
    let indirection = classified.indirection;
    let decision = match &classified.class {
        Classification::Unsupported(_) => Decision::Skip,
        Classification::Primitive | Classification::Foreign { .. } | Classification::Opaque(_) => Decision::Setter,
        Classification::Sequence(Element::Record { target, indirection: elem })
            if target.local && indirection == Indirection::Value =>
        {
            Decision::AddToSequence {
                elem: Nested::for_target(target, *elem),
            }
        }
        Classification::Sequence(_) => Decision::Setter,
        Classification::Mapping {
            key_primitive: true,
            value: Element::Record { target, indirection: value },
        } if target.local && indirection == Indirection::Value => {
            let (_, effective) = classifier.peel(&member.ty)?;
            match &effective.kind {
                TypeKind::Mapping { container, key, .. } => Decision::AddToMapping {
                    container: container.clone(),
                    key: key.written.clone(),
                    value: Nested::for_target(target, *value),
                },
                _ => Decision::Setter,
            }
        }
        Classification::Mapping { .. } => Decision::Setter,
        Classification::Record { target, embedded } if target.local => Decision::Nested {
            nested: Nested::for_target(target, indirection),
            embedded: *embedded,
            accessor: !(*embedded && record.directives.suppresses_accessor(&member.name)),
        },
        Classification::Record { .. } => Decision::Setter,
    };
    Ok(decision)
}

fn method_name(member: &str, decision: &Decision) -> String {
    match decision {
        Decision::AddToSequence { .. } | Decision::AddToMapping { .. } => format!("add_{member}"),
        _ => member.to_string(),
    }
}

/// `set_` prefixed until no other method of the builder uses the name.
fn unique_method(natural: &str, taken: &HashSet<String>) -> String {
    let mut method = natural.to_string();
    while taken.contains(&method) {
        method = format!("set_{method}");
    }
    method
}

/// The single embedded member with eager state, if there is exactly one.
fn promoted_field(fields: &[FieldPlan]) -> Option<usize> {
    let mut candidates = fields.iter().enumerate().filter(|(_, f)| {
        matches!(&f.decision, Decision::Nested { nested, embedded: true, .. } if nested.is_eager())
    });
    let (idx, _) = candidates.next()?;
    candidates.next().is_none().then_some(idx)
}

/// `model`, with underscores appended while a state field already uses the name.
fn model_field_name(fields: &[FieldPlan]) -> String {
    let mut name = String::from("model");
    while fields.iter().any(|f| f.decision.has_state() && f.member == name) {
        name.push('_');
    }
    name
}

/// Every builder planned for one unit.
#[derive(Debug, Clone)]
pub struct UnitPlan {
    pub package: String,
    pub specs: Vec<BuilderSpec>,
    pub diagnostics: Vec<Diagnostic>,
}

impl UnitPlan {
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Emit every builder of the unit.
    pub fn emit(&self) -> TokenStream {
        self.specs.iter().map(crate::emit::emit_builder).collect()
    }
}
