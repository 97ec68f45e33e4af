//! Engine errors and non-fatal diagnostics.
//!
//! Errors abort generation of the whole unit. Diagnostics are collected while planning and never stop it: the
//! affected member is skipped or downgraded and the diagnostic says why.

use std::fmt;

use thiserror::Error;

/// Error that stops generation for a unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("type alias cycle: {}", chain.join(" -> "))]
    AliasCycle { chain: Vec<String> },

    #[error("invalid `{directive}` directive on `{record}`: `{value}` is not a method name")]
    InvalidDirective {
        record: String,
        directive: String,
        value: String,
    },

    #[error("no compilation unit registered for package `{0}`")]
    UnknownPackage(String),
}

/// Non-fatal note produced while planning a builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Record (or alias) the builder is generated for
    pub record: String,
    /// Member the note is about, if any
    pub member: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn record(record: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            record: record.into(),
            member: None,
            message: message.into(),
        }
    }

    pub fn member(record: impl Into<String>, member: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            record: record.into(),
            member: Some(member.into()),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.member {
            Some(member) => write!(f, "{}.{}: {}", self.record, member, self.message),
            None => write!(f, "{}: {}", self.record, self.message),
        }
    }
}
