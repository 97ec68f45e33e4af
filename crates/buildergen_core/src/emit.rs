//! Render a [`BuilderSpec`] as Rust tokens.
//!
//! Per builder this emits:
//! - the builder struct (`model` plus one state field per stateful member),
//! - `new()` running the `new-call` hooks and initializing state, and `Default` delegating to it,
//! - one method per member decision,
//! - `build(&self)`, which clones the model and re-derives every nested value from current state,
//! - `Deref`/`DerefMut` to the promoted embedded builder, if any.
//!
//! Generated code only names `core`/`std` items through absolute paths, so it can be included into any module.
//! The models it builds must implement `Default` and `Clone`.

use proc_macro2::TokenStream;
use quote::quote;

use crate::classify::Indirection;
use crate::keywords::ident;
use crate::plan::{BuilderSpec, Decision, FieldPlan, Nested};

/// Emit the builder for one spec.
pub fn emit_builder(spec: &BuilderSpec) -> TokenStream {
    let vis = &spec.vis;
    let model = ident(&spec.model);
    let builder = ident(&spec.builder);
    let model_field = ident(&spec.model_field);

    let state_fields = spec.stateful_fields().filter_map(|f| {
        let name = ident(&f.member);
        let ty = state_type(&f.decision)?;
        Some(quote! { #name: #ty })
    });
    let state_inits = spec.stateful_fields().filter_map(|f| {
        let name = ident(&f.member);
        let init = state_init(&f.decision)?;
        Some(quote! { #name: #init })
    });

    let constructor_model = if spec.new_calls.is_empty() {
        quote! { let #model_field: #model = ::core::default::Default::default(); }
    } else {
        let calls = spec.new_calls.iter().map(|m| {
            let m = ident(m);
            quote! { #model_field.#m(); }
        });
        quote! {
            let mut #model_field: #model = ::core::default::Default::default();
            #(#calls)*
        }
    };

    let methods = spec.fields.iter().filter_map(|f| emit_method(spec, f));

    let steps: Vec<TokenStream> = spec.fields.iter().filter_map(finalize_step).collect();
    let build_body = if steps.is_empty() {
        quote! { ::core::clone::Clone::clone(&self.#model_field) }
    } else {
        quote! {
            let mut model = ::core::clone::Clone::clone(&self.#model_field);
            #(#steps)*
            model
        }
    };

    let struct_doc = format!(" Builder for [`{}`].", spec.model);
    let deref = spec.promoted.and_then(|idx| spec.fields.get(idx)).and_then(|f| emit_deref(&builder, f));

    quote! {
        #[doc = #struct_doc]
        #[derive(Clone)]
        #vis struct #builder {
            #model_field: #model,
            #(#state_fields,)*
        }

        impl #builder {
            /// Start from the default model.
            #vis fn new() -> Self {
                #constructor_model
                Self {
                    #model_field,
                    #(#state_inits,)*
                }
            }

            #(#methods)*

            /// Assemble the model from the current builder state.
            #vis fn build(&self) -> #model {
                #build_body
            }
        }

        impl ::core::default::Default for #builder {
            fn default() -> Self {
                Self::new()
            }
        }

        #deref
    }
}

fn state_type(decision: &Decision) -> Option<TokenStream> {
    let ty = match decision {
        Decision::AddToSequence { elem } => {
            let eb = ident(&elem.builder);
            quote! { ::std::vec::Vec<#eb> }
        }
        Decision::AddToMapping { container, key, value } => {
            let vb = ident(&value.builder);
            quote! { #container<#key, #vb> }
        }
        Decision::Nested { nested, .. } => {
            let tb = ident(&nested.builder);
            let held = if nested.indirection.is_boxed() {
                quote! { ::std::boxed::Box<#tb> }
            } else {
                quote! { #tb }
            };
            if nested.is_eager() {
                held
            } else {
                quote! { ::core::option::Option<#held> }
            }
        }
        Decision::Setter | Decision::Skip => return None,
    };
    Some(ty)
}

fn state_init(decision: &Decision) -> Option<TokenStream> {
    let init = match decision {
        Decision::AddToSequence { .. } => quote! { ::std::vec::Vec::new() },
        Decision::AddToMapping { container, .. } => quote! { #container::new() },
        Decision::Nested { nested, .. } if nested.is_eager() => fresh_nested(nested),
        Decision::Nested { .. } => quote! { ::core::option::Option::None },
        Decision::Setter | Decision::Skip => return None,
    };
    Some(init)
}

fn emit_method(spec: &BuilderSpec, field: &FieldPlan) -> Option<TokenStream> {
    let vis = &field.vis;
    let method = ident(&field.method);
    let name = ident(&field.member);
    let model_field = ident(&spec.model_field);

    let tokens = match &field.decision {
        Decision::Setter => {
            let ty = &field.written;
            let doc = format!(" Set `{}`.", field.member);
            quote! {
                #[doc = #doc]
                #vis fn #method(&mut self, input: #ty) -> &mut Self {
                    self.#model_field.#name = input;
                    self
                }
            }
        }
        Decision::AddToSequence { elem } => {
            let eb = ident(&elem.builder);
            let doc = format!(" Append a new element to `{}` and return its builder.", field.member);
            quote! {
                #[doc = #doc]
                #vis fn #method(&mut self) -> &mut #eb {
                    self.#name.push(#eb::new());
                    let last = self.#name.len() - 1;
                    &mut self.#name[last]
                }
            }
        }
        Decision::AddToMapping { key, value, .. } => {
            let vb = ident(&value.builder);
            let doc = format!(" Start a new `{}` entry under `key`, replacing any previous one.", field.member);
            quote! {
                #[doc = #doc]
                #vis fn #method(&mut self, key: #key) -> &mut #vb {
                    let slot = self.#name.entry(key).or_insert_with(#vb::new);
                    *slot = #vb::new();
                    slot
                }
            }
        }
        Decision::Nested {
            nested, accessor: true, ..
        } => {
            let tb = ident(&nested.builder);
            let body = if nested.is_eager() {
                quote! { &mut self.#name }
            } else if nested.indirection.is_boxed() {
                let fresh = fresh_nested(nested);
                quote! { self.#name.get_or_insert_with(|| #fresh) }
            } else {
                quote! { self.#name.get_or_insert_with(#tb::new) }
            };
            quote! {
                #vis fn #method(&mut self) -> &mut #tb {
                    #body
                }
            }
        }
        Decision::Nested { accessor: false, .. } | Decision::Skip => return None,
    };
    Some(tokens)
}

fn finalize_step(field: &FieldPlan) -> Option<TokenStream> {
    let name = ident(&field.member);
    let step = match &field.decision {
        Decision::AddToSequence { elem } => {
            let built = wrap(quote! { b.build() }, elem.indirection);
            quote! {
                model.#name = self.#name.iter().map(|b| #built).collect();
            }
        }
        Decision::AddToMapping { value, .. } => {
            let built = wrap(quote! { b.build() }, value.indirection);
            quote! {
                model.#name = self
                    .#name
                    .iter()
                    .map(|(k, b)| (::core::clone::Clone::clone(k), #built))
                    .collect();
            }
        }
        Decision::Nested { nested, .. } if nested.is_eager() => {
            let built = wrap(quote! { self.#name.build() }, nested.indirection);
            quote! { model.#name = #built; }
        }
        Decision::Nested { nested, .. } => {
            let built = wrap(quote! { b.build() }, nested.indirection);
            quote! {
                if let ::core::option::Option::Some(b) = &self.#name {
                    model.#name = #built;
                }
            }
        }
        Decision::Setter | Decision::Skip => return None,
    };
    Some(step)
}

/// A new nested builder, boxed when the field is boxed so recursive records stay finite.
fn fresh_nested(nested: &Nested) -> TokenStream {
    let tb = ident(&nested.builder);
    if nested.indirection.is_boxed() {
        quote! { ::std::boxed::Box::new(#tb::new()) }
    } else {
        quote! { #tb::new() }
    }
}

/// Re-apply a reference shape to a built value.
fn wrap(built: TokenStream, indirection: Indirection) -> TokenStream {
    match indirection {
        Indirection::Value => built,
        Indirection::Boxed => quote! { ::std::boxed::Box::new(#built) },
        Indirection::Optional => quote! { ::core::option::Option::Some(#built) },
        Indirection::OptionalBoxed => quote! { ::core::option::Option::Some(::std::boxed::Box::new(#built)) },
    }
}

fn emit_deref(builder: &proc_macro2::Ident, field: &FieldPlan) -> Option<TokenStream> {
    let Decision::Nested { nested, .. } = &field.decision else {
        return None;
    };
    let tb = ident(&nested.builder);
    let name = ident(&field.member);
    Some(quote! {
        impl ::core::ops::Deref for #builder {
            type Target = #tb;

            fn deref(&self) -> &Self::Target {
                &self.#name
            }
        }

        impl ::core::ops::DerefMut for #builder {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.#name
            }
        }
    })
}
