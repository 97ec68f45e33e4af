//! Human-readable rendering of a [`UnitPlan`], used by `buildergen inspect`.

use std::fmt::{self, Write};

use crate::plan::{BuilderSpec, Decision, FieldPlan, UnitPlan};

/// Render every builder of a unit, one block per builder, followed by the diagnostics.
pub fn render_plan(plan: &UnitPlan) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_plan(&mut out, plan);
    out
}

fn write_plan(out: &mut String, plan: &UnitPlan) -> fmt::Result {
    writeln!(out, "package {}", plan.package)?;
    if plan.is_empty() {
        writeln!(out, "  (no builders)")?;
    }
    for spec in &plan.specs {
        write_spec(out, spec)?;
    }
    if !plan.diagnostics.is_empty() {
        writeln!(out, "diagnostics:")?;
        for diagnostic in &plan.diagnostics {
            writeln!(out, "  {diagnostic}")?;
        }
    }
    Ok(())
}

fn write_spec(out: &mut String, spec: &BuilderSpec) -> fmt::Result {
    writeln!(out, "{} for {}", spec.builder, spec.model)?;
    if !spec.new_calls.is_empty() {
        writeln!(out, "  new calls: {}", spec.new_calls.join(", "))?;
    }
    for field in &spec.fields {
        writeln!(out, "  {}: {} [{}]", field.member, decision_label(field), field.classified.class)?;
    }
    if let Some(field) = spec.promoted.and_then(|idx| spec.fields.get(idx)) {
        writeln!(out, "  deref: {}", field.member)?;
    }
    Ok(())
}

fn decision_label(field: &FieldPlan) -> String {
    let method = &field.method;
    match &field.decision {
        Decision::Setter => format!("setter {method}"),
        Decision::AddToSequence { elem } => format!("{method}() -> {} ({})", elem.builder, elem.indirection),
        Decision::AddToMapping { value, .. } => format!("{method}(key) -> {} ({})", value.builder, value.indirection),
        Decision::Nested {
            nested,
            embedded,
            accessor,
        } => {
            let mut label = if *accessor {
                format!("{method}() -> {} ({})", nested.builder, nested.indirection)
            } else {
                format!("{} ({}), no accessor", nested.builder, nested.indirection)
            };
            if *embedded {
                label.push_str(", embedded");
            }
            label
        }
        Decision::Skip => "skipped".to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::classify::{Classification, ClassifiedMember, Indirection};
    use crate::errors::Diagnostic;

    #[test]
    fn test_render_setter_and_diagnostics() {
        let spec = BuilderSpec {
            model: "TestB".into(),
            builder: "TestBBuilder".into(),
            vis: syn::parse_quote!(pub),
            new_calls: vec!["init".into()],
            model_field: "model".into(),
            fields: vec![FieldPlan {
                member: "id".into(),
                method: "id".into(),
                vis: syn::parse_quote!(pub),
                written: syn::parse_quote!(u32),
                classified: ClassifiedMember {
                    indirection: Indirection::Value,
                    class: Classification::Primitive,
                },
                decision: Decision::Setter,
            }],
            promoted: None,
        };
        let plan = UnitPlan {
            package: "crate::model".into(),
            specs: vec![spec],
            diagnostics: vec![Diagnostic::member("TestB", "raw", "skipped, unsupported type: function pointer")],
        };
        assert_eq!(
            render_plan(&plan),
            "package crate::model\n\
             TestBBuilder for TestB\n  \
             new calls: init\n  \
             id: setter id [primitive]\n\
             diagnostics:\n  \
             TestB.raw: skipped, unsupported type: function pointer\n"
        );
    }

    #[test]
    fn test_render_empty_unit() {
        let plan = UnitPlan {
            package: "crate".into(),
            specs: vec![],
            diagnostics: vec![],
        };
        assert_eq!(render_plan(&plan), "package crate\n  (no builders)\n");
    }
}
