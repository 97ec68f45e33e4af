//! Generation directives attached to record types.
//!
//! Directives come from two places:
//! - doc-comment tags, `+<namespace>:<name>=<value>`, parsed leniently (unknown or malformed tags are ignored);
//! - the `#[builder_gen(...)]` attribute, parsed strictly by the front end into a [`Directives`] value.
//!
//! Both are merged per type and validated once before planning starts.

use std::collections::BTreeMap;

use crate::errors::GenerateError;
use crate::graph::DocText;

/// Tag namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "builder-gen";

pub const IGNORE: &str = "ignore";
pub const NEW_CALL: &str = "new-call";
pub const EMBEDDED_IGNORE_METHOD: &str = "embedded-ignore-method";

/// Raw tag values found in doc text, in encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentTags {
    values: BTreeMap<String, Vec<String>>,
}

impl CommentTags {
    /// Collect `+<namespace>:<name>=<value>` tags from doc lines.
    ///
    /// A tag without `=` records the empty value.
    pub fn extract<'a>(namespace: &str, lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut values: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for line in lines {
            let Some(tag) = line.trim().strip_prefix('+') else {
                continue;
            };
            let Some((ns, rest)) = tag.split_once(':') else {
                continue;
            };
            if ns != namespace {
                continue;
            }
            let (name, value) = rest.split_once('=').unwrap_or((rest, ""));
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            values.entry(name.to_string()).or_default().push(value.trim().to_string());
        }
        Self { values }
    }

    /// Every value recorded for a directive.
    pub fn values(&self, name: &str) -> &[String] {
        self.values.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Comma-separated list values, flattened, empty segments dropped.
    pub fn list(&self, name: &str) -> Vec<String> {
        self.values(name)
            .iter()
            .flat_map(|v| v.split(','))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Boolean directive: the last occurrence decides, and only `true` is true.
    pub fn flag(&self, name: &str) -> bool {
        self.values(name).last().is_some_and(|v| v == "true")
    }
}

/// Directives in effect for one type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directives {
    /// Exclude the type from generation
    pub ignore: bool,
    /// Methods called on the fresh model inside the builder constructor, in order
    pub new_calls: Vec<String>,
    /// Embedded members whose passthrough accessor is suppressed
    pub embedded_ignore_methods: Vec<String>,
}

impl Directives {
    pub fn from_docs(namespace: &str, docs: &DocText) -> Self {
        let tags = CommentTags::extract(namespace, docs.lines());
        Self {
            ignore: tags.flag(IGNORE),
            new_calls: tags.list(NEW_CALL),
            embedded_ignore_methods: tags.list(EMBEDDED_IGNORE_METHOD),
        }
    }

    /// Lists are appended after ours; `ignore` is set if either side sets it.
    pub fn merge(mut self, other: &Directives) -> Self {
        self.ignore |= other.ignore;
        self.new_calls.extend(other.new_calls.iter().cloned());
        self.embedded_ignore_methods
            .extend(other.embedded_ignore_methods.iter().cloned());
        self
    }

    pub fn suppresses_accessor(&self, member: &str) -> bool {
        self.embedded_ignore_methods.iter().any(|m| m == member)
    }

    /// Every `new-call` entry must name a callable method.
    pub fn validate(&self, record: &str) -> Result<(), GenerateError> {
        for method in &self.new_calls {
            if syn::parse_str::<syn::Ident>(method).is_err() {
                return Err(GenerateError::InvalidDirective {
                    record: record.to_string(),
                    directive: NEW_CALL.to_string(),
                    value: method.clone(),
                });
            }
        }
        Ok(())
    }
}
