//! Attribute macro generating builders at compile time.
//!
//! `#[builders]` on an inline module runs the builder engine over the module's declarations and appends the
//! generated builder types to the module body:
//!
//! ```ignore
//! #[buildergen::builders]
//! pub mod model {
//!     #[derive(Debug, Clone, Default, PartialEq)]
//!     pub struct Order {
//!         pub id: u64,
//!         pub lines: Vec<Line>,
//!     }
//!
//!     #[derive(Debug, Clone, Default, PartialEq)]
//!     pub struct Line {
//!         pub sku: String,
//!     }
//! }
//!
//! let mut order = model::OrderBuilder::new();
//! order.id(7).add_lines().sku("A-1".into());
//! let built = order.build();
//! ```
//!
//! Options: `package = "crate::path::to::module"` (defaults to `crate::<module name>`), used to tell local records
//! from foreign ones, and `namespace = "..."` for doc-comment directives (defaults to `builder-gen`).

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::ToTokens;
use syn::ext::IdentExt;
use syn::{Item, ItemMod, LitStr, parse_macro_input};

use buildergen_core::{DEFAULT_NAMESPACE, Universe};

#[derive(Default)]
struct MacroArgs {
    package: Option<String>,
    namespace: Option<String>,
}

impl MacroArgs {
    fn parse(&mut self, meta: syn::meta::ParseNestedMeta) -> syn::Result<()> {
        if meta.path.is_ident("package") {
            self.package = Some(meta.value()?.parse::<LitStr>()?.value());
            Ok(())
        } else if meta.path.is_ident("namespace") {
            self.namespace = Some(meta.value()?.parse::<LitStr>()?.value());
            Ok(())
        } else {
            Err(meta.error("unsupported builders option; expected `package` or `namespace`"))
        }
    }
}

/// Generate a builder for every eligible record of an inline module.
#[proc_macro_attribute]
pub fn builders(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut options = MacroArgs::default();
    let parser = syn::meta::parser(|meta| options.parse(meta));
    parse_macro_input!(args with parser);
    let module = parse_macro_input!(input as ItemMod);

    match expand(options, module) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(options: MacroArgs, mut module: ItemMod) -> syn::Result<TokenStream2> {
    let ident = module.ident.clone();
    let Some((_, items)) = module.content.as_mut() else {
        return Err(syn::Error::new(
            ident.span(),
            "#[builders] needs an inline module body: `mod name { ... }`",
        ));
    };

    let package = options
        .package
        .unwrap_or_else(|| format!("crate::{}", ident.unraw()));
    let namespace = options.namespace.unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

    let unit = buildergen_syntax::lower_items(&package, items)?;
    let mut universe = Universe::new();
    universe.insert(unit);
    let plan = buildergen_core::plan_unit(&universe, &package, &namespace)
        .map_err(|err| syn::Error::new(ident.span(), err.to_string()))?;

    buildergen_syntax::attrs::strip_helper_attrs(items);
    if !plan.is_empty() {
        items.push(Item::Verbatim(plan.emit()));
    }
    Ok(module.into_token_stream())
}
