//! Decide which declarations get a builder.
//!
//! A declaration is eligible when it is exported, not `ignore`d, has no generic parameters, and its underlying type
//! (after unwrapping aliases) is a record of the same unit. An eligible alias gets its own builder, named after the
//! alias, over the target record's members.

use crate::classify::Classifier;
use crate::directives::Directives;
use crate::errors::GenerateError;
use crate::graph::{DeclKind, Member, TypeDecl, TypeKind, Unit};

/// A declaration that will receive a builder.
#[derive(Debug)]
pub struct EligibleRecord<'g> {
    /// The declaration the builder is named after (record or alias)
    pub decl: &'g TypeDecl,
    /// Members of the underlying record
    pub members: &'g [Member],
    /// Directives of `decl`, validated
    pub directives: Directives,
}

/// Return the eligible view of `decl`, or `None` if it gets no builder.
pub fn eligible_record<'g>(
    classifier: &Classifier<'g>,
    unit: &'g Unit,
    decl: &'g TypeDecl,
) -> Result<Option<EligibleRecord<'g>>, GenerateError> {
    if !decl.is_exported() || decl.generic {
        return Ok(None);
    }
    let directives = classifier.directives(decl);
    if directives.ignore {
        return Ok(None);
    }

    let members = match &decl.kind {
        DeclKind::Record(members) => members.as_slice(),
        DeclKind::Alias(target) => {
            let TypeKind::Named(named) = &classifier.unwrap_aliases(target)?.kind else {
                return Ok(None);
            };
            if !classifier.policy().is_local(&named.package) || named.has_args {
                return Ok(None);
            }
            match unit.decl(&named.name) {
                Some(record) if classifier.has_builder(record) => record.members().unwrap_or_default(),
                _ => return Ok(None),
            }
        }
        DeclKind::TupleRecord | DeclKind::Enum | DeclKind::Union | DeclKind::Trait => return Ok(None),
    };

    directives.validate(&decl.name)?;
    Ok(Some(EligibleRecord {
        decl,
        members,
        directives,
    }))
}
