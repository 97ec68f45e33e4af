//! Engine tests: Rust source in, builder plans out.

use buildergen::{DEFAULT_NAMESPACE, Decision, GenerateError, UnitPlan, Universe, render_plan};
use buildergen_core::classify::Indirection;

const PKG: &str = "crate::model";

fn universe(units: &[(&str, &str)]) -> Universe {
    let mut universe = Universe::new();
    for (package, source) in units {
        let unit = buildergen_syntax::parse_file("model.rs", source, package).unwrap();
        universe.insert(unit);
    }
    universe
}

fn try_plan(source: &str) -> Result<UnitPlan, GenerateError> {
    buildergen_core::plan_unit(&universe(&[(PKG, source)]), PKG, DEFAULT_NAMESPACE)
}

fn plan(source: &str) -> UnitPlan {
    try_plan(source).unwrap()
}

fn builders(plan: &UnitPlan) -> Vec<&str> {
    plan.specs.iter().map(|s| s.builder.as_str()).collect()
}

fn decision<'p>(plan: &'p UnitPlan, record: &str, member: &str) -> &'p Decision {
    let spec = plan.specs.iter().find(|s| s.model == record).unwrap();
    &spec.fields.iter().find(|f| f.member == member).unwrap().decision
}

#[test]
fn test_eligibility() {
    let plan = plan(
        "pub struct Exported { pub a: u8 }
         struct Private { a: u8 }
         /// +builder-gen:ignore=true
         pub struct Ignored { pub a: u8 }
         pub struct Generic<T> { pub t: T }
         pub struct Unit;
         pub struct Tuple(pub u8);
         pub enum Mode { A }
         pub type Alias = Exported;
         pub type Other = Vec<Exported>;",
    );
    assert_eq!(builders(&plan), vec!["ExportedBuilder", "UnitBuilder", "AliasBuilder"]);
}

#[test]
fn test_ignore_last_occurrence_wins() {
    let plan = plan(
        "/// +builder-gen:ignore=true
         /// +builder-gen:ignore=false
         pub struct Kept { pub a: u8 }
         /// +builder-gen:ignore=false
         /// +builder-gen:ignore=true
         pub struct Dropped { pub a: u8 }",
    );
    assert_eq!(builders(&plan), vec!["KeptBuilder"]);
}

#[test]
fn test_directives_from_secondary_doc_block() {
    let plan = plan(
        "/// +builder-gen:new-call=first
         ///
         /// Order record.
         /// +builder-gen:new-call=second
         pub struct Order { pub id: u64 }",
    );
    assert_eq!(plan.specs[0].new_calls, vec!["first", "second"]);
}

#[test]
fn test_custom_namespace() {
    let source = "/// +custom:ignore=true\npub struct Order { pub id: u64 }";
    let universe = universe(&[(PKG, source)]);
    let custom = buildergen_core::plan_unit(&universe, PKG, "custom").unwrap();
    assert!(custom.is_empty());
    let default = buildergen_core::plan_unit(&universe, PKG, DEFAULT_NAMESPACE).unwrap();
    assert_eq!(default.specs.len(), 1);
}

#[test]
fn test_member_decisions() {
    let plan = plan(
        "use std::collections::{BTreeMap, HashMap};
         use crate::other::Money;

         pub struct Order {
             pub id: u64,
             pub total: Money,
             pub tags: Vec<String>,
             pub lines: Vec<Line>,
             pub boxed_lines: Vec<Box<Line>>,
             pub maybe_lines: Option<Vec<Line>>,
             pub by_sku: HashMap<String, Line>,
             pub by_line: BTreeMap<Line, Line>,
             pub counts: HashMap<String, u32>,
             pub note: Option<Box<Note>>,
             pub head: Line,
             pub boxed: Box<Line>,
             pub mode: Mode,
             pub wrapper: Wrapper<u8>,
             pub callback: fn(),
             pub nested: Option<Option<Line>>,
         }
         pub struct Line { pub sku: String }
         pub struct Note { pub text: String }
         pub struct Wrapper<T> { pub t: T }
         pub enum Mode { A }",
    );

    for setter in ["id", "total", "tags", "maybe_lines", "by_line", "counts", "mode", "wrapper"] {
        assert!(matches!(decision(&plan, "Order", setter), Decision::Setter), "{setter}");
    }
    for skipped in ["callback", "nested"] {
        assert!(matches!(decision(&plan, "Order", skipped), Decision::Skip), "{skipped}");
    }

    let Decision::AddToSequence { elem } = decision(&plan, "Order", "boxed_lines") else {
        panic!("boxed_lines should be an add");
    };
    assert_eq!(elem.builder, "LineBuilder");
    assert_eq!(elem.indirection, Indirection::Boxed);
    assert!(matches!(decision(&plan, "Order", "lines"), Decision::AddToSequence { .. }));

    let Decision::AddToMapping { container, value, .. } = decision(&plan, "Order", "by_sku") else {
        panic!("by_sku should be a map add");
    };
    assert!(container.is_ident("HashMap"));
    assert_eq!(value.builder, "LineBuilder");

    let Decision::Nested { nested, embedded, accessor } = decision(&plan, "Order", "note") else {
        panic!("note should be nested");
    };
    assert!(!nested.is_eager());
    assert!(!embedded);
    assert!(accessor);
    let Decision::Nested { nested, .. } = decision(&plan, "Order", "boxed") else {
        panic!("boxed should be nested");
    };
    assert!(nested.is_eager());
    assert_eq!(nested.indirection, Indirection::Boxed);

    let spec = &plan.specs[0];
    let methods: Vec<&str> = spec.fields.iter().map(|f| f.method.as_str()).collect();
    assert!(methods.contains(&"add_lines"));
    assert!(methods.contains(&"add_by_sku"));

    let skipped: Vec<String> = plan.diagnostics.iter().map(ToString::to_string).collect();
    assert_eq!(
        skipped,
        vec![
            "Order.callback: skipped, unsupported type: function pointer",
            "Order.nested: skipped, unsupported type: nested reference wrappers",
        ]
    );
}

#[test]
fn test_foreign_unit_records_get_setters() {
    let universe = universe(&[
        (PKG, "use crate::other::Line; pub struct Order { pub line: Line, pub lines: Vec<Line> }"),
        ("crate::other", "pub struct Line { pub sku: String }"),
    ]);
    let plan = buildergen_core::plan_unit(&universe, PKG, DEFAULT_NAMESPACE).unwrap();
    assert!(matches!(decision(&plan, "Order", "line"), Decision::Setter));
    assert!(matches!(decision(&plan, "Order", "lines"), Decision::Setter));

    let other = buildergen_core::plan_unit(&universe, "crate::other", DEFAULT_NAMESPACE).unwrap();
    assert_eq!(builders(&other), vec!["LineBuilder"]);
}

#[test]
fn test_renamed_import_of_own_module_is_local() {
    let plan = plan("use crate::model as m; pub struct Order { pub lines: Vec<m::Line> } pub struct Line;");
    assert!(matches!(decision(&plan, "Order", "lines"), Decision::AddToSequence { .. }));
}

#[test]
fn test_embedded_members_and_promotion() {
    let plan = plan(
        "/// +builder-gen:embedded-ignore-method=base,missing
         pub struct Outer {
             #[builder_gen(embed)]
             pub base: Base,
             #[builder_gen(embed)]
             pub extra: Option<Extra>,
         }
         pub struct Base { pub a: u8 }
         pub struct Extra { pub b: u8 }",
    );
    let Decision::Nested { embedded, accessor, .. } = decision(&plan, "Outer", "base") else {
        panic!("base should be nested");
    };
    assert!(embedded);
    assert!(!accessor);
    let Decision::Nested { accessor, .. } = decision(&plan, "Outer", "extra") else {
        panic!("extra should be nested");
    };
    assert!(accessor);

    let outer = &plan.specs[0];
    assert_eq!(outer.promoted, Some(0));
    assert_eq!(
        plan.diagnostics.iter().map(ToString::to_string).collect::<Vec<_>>(),
        vec!["Outer: `embedded-ignore-method` names `missing`, which is not an embedded member"]
    );
}

#[test]
fn test_two_eager_embeds_are_not_promoted() {
    let plan = plan(
        "pub struct Outer { #[serde(flatten)] pub a: A, #[serde(flatten)] pub b: B }
         pub struct A { pub x: u8 }
         pub struct B { pub y: u8 }",
    );
    assert_eq!(plan.specs[0].promoted, None);
}

#[test]
fn test_reserved_and_keyword_members() {
    let plan = plan("pub struct Job { pub new: bool, pub build: u8, pub r#type: u8, pub model: Part } pub struct Part;");
    let spec = &plan.specs[0];
    let methods: Vec<&str> = spec.fields.iter().map(|f| f.method.as_str()).collect();
    assert_eq!(methods, vec!["set_new", "set_build", "type", "model"]);
    assert_eq!(spec.model_field, "model_");
    assert_eq!(plan.diagnostics.len(), 2);
}

#[test]
fn test_clashing_method_names_are_renamed() {
    let plan = plan(
        "pub struct Order { pub items: Vec<Item>, pub add_items: u8, pub set_new: bool, pub new: bool }
         pub struct Item { pub qty: u32 }",
    );
    let spec = &plan.specs[0];
    let methods: Vec<&str> = spec.fields.iter().map(|f| f.method.as_str()).collect();
    assert_eq!(methods, vec!["add_items", "set_add_items", "set_new", "set_set_new"]);
    assert_eq!(
        plan.diagnostics.iter().map(ToString::to_string).collect::<Vec<_>>(),
        vec![
            "Order.add_items: method renamed to `set_add_items`, `add_items` is already taken",
            "Order.new: method renamed to `set_set_new`, `set_new` is already taken",
        ]
    );

    let file: syn::File = syn::parse2(plan.emit()).unwrap();
    let syn::Item::Impl(imp) = &file.items[1] else {
        panic!("expected the builder impl");
    };
    let mut names: Vec<String> = imp
        .items
        .iter()
        .filter_map(|item| match item {
            syn::ImplItem::Fn(f) => Some(f.sig.ident.to_string()),
            _ => None,
        })
        .collect();
    let total = names.len();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), total);
}

#[test]
fn test_alias_cycle_is_an_error() {
    let err = try_plan("pub type A = B; pub type B = A; pub struct R { pub a: A }").unwrap_err();
    assert!(matches!(err, GenerateError::AliasCycle { .. }));
}

#[test]
fn test_invalid_new_call_is_an_error() {
    let err = try_plan("/// +builder-gen:new-call=do it\npub struct R { pub a: u8 }").unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid `new-call` directive on `R`: `do it` is not a method name"
    );
}

#[test]
fn test_unknown_package_is_an_error() {
    let err = buildergen_core::plan_unit(&Universe::new(), PKG, DEFAULT_NAMESPACE).unwrap_err();
    assert_eq!(err, GenerateError::UnknownPackage(PKG.to_string()));
}

#[test]
fn test_emitted_code_parses() {
    let plan = plan(
        "use std::collections::HashMap;
         pub struct Order {
             pub id: u64,
             pub lines: Vec<Line>,
             pub by_sku: HashMap<String, Box<Line>>,
             pub note: Option<Box<Line>>,
             #[builder_gen(embed)]
             pub base: Line,
         }
         pub(crate) struct Line { pub sku: String, pub r#in: bool }",
    );
    let file: syn::File = syn::parse2(plan.emit()).unwrap();
    let structs: Vec<String> = file
        .items
        .iter()
        .filter_map(|item| match item {
            syn::Item::Struct(s) => Some(s.ident.to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(structs, vec!["OrderBuilder", "LineBuilder"]);
    let derefs = file
        .items
        .iter()
        .filter(|item| matches!(item, syn::Item::Impl(imp) if imp.trait_.is_some()))
        .count();
    // Default for both builders, Deref + DerefMut for the embedded base.
    assert_eq!(derefs, 4);
}

#[test]
fn test_render_plan_snapshot() {
    let plan = plan(
        "use crate::other::Money;

         /// +builder-gen:new-call=init
         pub struct Order {
             pub id: u64,
             pub total: Money,
             pub lines: Vec<Line>,
             pub notes: Option<Box<Note>>,
             pub callback: fn(),
         }

         pub struct Line {
             pub sku: String,
         }

         pub struct Note {
             pub text: String,
         }",
    );
    insta::assert_snapshot!(render_plan(&plan), @r"
    package crate::model
    OrderBuilder for Order
      new calls: init
      id: setter id [primitive]
      total: setter total [foreign type from crate::other]
      lines: add_lines() -> LineBuilder (value) [sequence of value record Line (local)]
      notes: notes() -> NoteBuilder (optional-boxed) [record Note (local)]
      callback: skipped [unsupported: function pointer]
    LineBuilder for Line
      sku: setter sku [primitive]
    NoteBuilder for Note
      text: setter text [primitive]
    diagnostics:
      Order.callback: skipped, unsupported type: function pointer
    ");
}
