//! `use` declarations of a module, and resolution of type paths into packages.
//!
//! Paths are normalized against the unit's own package: `self::`, `super::` and `crate::` prefixes become absolute
//! module paths. A module reached through a renamed import (`use crate::model as m;`) is rendered as
//! `m "crate::model"` so the package policy can still recognize it as local.

use std::collections::HashMap;

use buildergen_core::policy;
use buildergen_core::NamedRef;
use syn::ext::IdentExt;

/// One name brought into scope by a `use` item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Absolute path of the imported item
    pub path: Vec<String>,
    /// Imported under a different name (`as`)
    pub renamed: bool,
}

/// Names imported into one module.
#[derive(Debug, Clone, Default)]
pub struct ImportMap {
    package: Vec<String>,
    entries: HashMap<String, Import>,
}

impl ImportMap {
    pub fn new(package: &str) -> Self {
        Self {
            package: split_package(package),
            entries: HashMap::new(),
        }
    }

    /// Collect every `use` item. Glob imports and `_` renames bring no names and are skipped.
    pub fn from_items(package: &str, items: &[syn::Item]) -> Self {
        let mut map = Self::new(package);
        for item in items {
            if let syn::Item::Use(item_use) = item {
                map.add_tree(&mut Vec::new(), &item_use.tree);
            }
        }
        map
    }

    pub fn get(&self, name: &str) -> Option<&Import> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn add_tree(&mut self, prefix: &mut Vec<String>, tree: &syn::UseTree) {
        match tree {
            syn::UseTree::Path(path) => {
                prefix.push(path.ident.unraw().to_string());
                self.add_tree(prefix, &path.tree);
                prefix.pop();
            }
            syn::UseTree::Name(name) => {
                let ident = name.ident.unraw().to_string();
                if ident == "self" {
                    if let Some(last) = prefix.last().cloned() {
                        self.insert(last, prefix.clone(), false);
                    }
                } else {
                    let mut path = prefix.clone();
                    path.push(ident.clone());
                    self.insert(ident, path, false);
                }
            }
            syn::UseTree::Rename(rename) => {
                let alias = rename.rename.unraw().to_string();
                if alias == "_" {
                    return;
                }
                let mut path = prefix.clone();
                let ident = rename.ident.unraw().to_string();
                if ident != "self" {
                    path.push(ident);
                }
                self.insert(alias, path, true);
            }
            syn::UseTree::Group(group) => {
                for tree in &group.items {
                    self.add_tree(prefix, tree);
                }
            }
            syn::UseTree::Glob(_) => {}
        }
    }

    fn insert(&mut self, name: String, path: Vec<String>, renamed: bool) {
        let path = self.normalize(&path);
        self.entries.insert(name, Import { path, renamed });
    }

    /// Rewrite a leading `self`/`super`/`crate` into an absolute path.
    pub fn normalize(&self, path: &[String]) -> Vec<String> {
        let mut rest = path;
        let mut base: Option<Vec<String>> = None;
        while let Some((first, tail)) = rest.split_first() {
            match first.as_str() {
                "self" => {
                    base.get_or_insert_with(|| self.package.clone());
                }
                "super" => {
                    let current = base.get_or_insert_with(|| self.package.clone());
                    if current.len() > 1 {
                        current.pop();
                    }
                }
                "crate" if base.is_none() => {
                    base = Some(vec!["crate".to_string()]);
                }
                _ => break,
            }
            rest = tail;
        }
        let mut out = base.unwrap_or_default();
        out.extend(rest.iter().cloned());
        out
    }

    /// Resolve a type path to a package-qualified name.
    pub fn resolve(&self, path: &syn::Path) -> NamedRef {
        let segments: Vec<String> = path.segments.iter().map(|s| s.ident.unraw().to_string()).collect();
        let has_args = path
            .segments
            .last()
            .is_some_and(|s| !matches!(s.arguments, syn::PathArguments::None));
        let here = self.package.join("::");

        let (package, name) = match segments.as_slice() {
            [] => (here, String::new()),
            [single] if path.leading_colon.is_none() => match self.entries.get(single) {
                Some(import) => split_last(&import.path, &here),
                None => (here, single.clone()),
            },
            [first, middle @ .., last] if path.leading_colon.is_none() => {
                match self.entries.get(first).filter(|_| !matches!(first.as_str(), "self" | "super" | "crate")) {
                    Some(import) => {
                        let mut real = import.path.clone();
                        real.extend(middle.iter().cloned());
                        let real = real.join("::");
                        if import.renamed {
                            let mut written = vec![first.clone()];
                            written.extend(middle.iter().cloned());
                            (policy::quoted(&written.join("::"), &real), last.clone())
                        } else {
                            (real, last.clone())
                        }
                    }
                    None => {
                        let normalized = self.normalize(&segments);
                        split_last(&normalized, &here)
                    }
                }
            }
            _ => split_last(&segments, &here),
        };

        NamedRef {
            package,
            name,
            has_args,
        }
    }
}

fn split_package(package: &str) -> Vec<String> {
    policy::canonical_package(package)
        .split("::")
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Package and item name of an absolute path.
fn split_last(path: &[String], fallback_package: &str) -> (String, String) {
    match path.split_last() {
        Some((name, [])) => (fallback_package.to_string(), name.clone()),
        Some((name, package)) => (package.join("::"), name.clone()),
        None => (fallback_package.to_string(), String::new()),
    }
}
