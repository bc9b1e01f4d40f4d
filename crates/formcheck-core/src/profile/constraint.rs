//! Constraint specifications attached to fields
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

use crate::callable::ConstraintFn;
use crate::context::ConstraintContext;
use crate::pattern::FieldPattern;
use crate::{ParamValue, Result, Verdict};
use regex::Regex;
use std::fmt;

/// Failure name used for unnamed inline callables
pub const ANONYMOUS_CONSTRAINT: &str = "anonymous";

/// One parameter of a structured constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    /// Resolved to the current working value of the named field
    Field(String),
    /// Passed through unchanged
    Literal(String),
}

impl Param {
    /// Reference to a field's working value
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    /// Literal value
    pub fn literal(value: impl ToString) -> Self {
        Self::Literal(value.to_string())
    }
}

/// How a field is constrained
#[derive(Clone)]
pub enum ConstraintSpec {
    /// Registered constraint, looked up by name
    Named(String),
    /// Inline pattern; on success the matched span is the untainted value
    Pattern(FieldPattern),
    /// Inline function
    Callable {
        name: Option<String>,
        func: ConstraintFn,
    },
    /// Constraint with an explicit name, params or invocation style
    Structured(StructuredConstraint),
}

/// Constraint carrying its name, params and method flag
#[derive(Clone)]
pub struct StructuredConstraint {
    /// The underlying constraint (not itself structured)
    pub constraint: Box<ConstraintSpec>,
    /// Name reported on failure
    pub name: Option<String>,
    /// Ordered params; `None` means the checked value alone
    pub params: Option<Vec<Param>>,
    /// Force method invocation (`Some(true)`) or plain invocation
    pub is_method: Option<bool>,
}

impl ConstraintSpec {
    /// Registered constraint by name
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Interpret profile text: delimited text is a pattern, anything else a name
    pub fn parse(text: &str) -> Self {
        if FieldPattern::is_delimited(text) {
            Self::Pattern(FieldPattern::legacy(text))
        } else {
            Self::Named(text.to_string())
        }
    }

    /// Inline compiled pattern
    pub fn regex(regex: Regex) -> Self {
        Self::Pattern(FieldPattern::native(regex))
    }

    /// Inline boolean predicate over the checked value
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::Callable {
            name: None,
            func: ConstraintFn::predicate(f),
        }
    }

    /// Inline constraint method
    pub fn method<F>(f: F) -> Self
    where
        F: Fn(&mut ConstraintContext<'_>, &[ParamValue]) -> Result<Verdict> + Send + Sync + 'static,
    {
        Self::Callable {
            name: None,
            func: ConstraintFn::method(f),
        }
    }

    /// Report failures under `name`
    pub fn with_name(self, name: impl Into<String>) -> Self {
        let mut structured = self.into_structured();
        structured.name = Some(name.into());
        Self::Structured(structured)
    }

    /// Invoke with `params` instead of the checked value
    pub fn with_params(self, params: Vec<Param>) -> Self {
        let mut structured = self.into_structured();
        structured.params = Some(params);
        Self::Structured(structured)
    }

    /// Invoke as a method, passing the evaluation context
    pub fn as_method(self) -> Self {
        let mut structured = self.into_structured();
        structured.is_method = Some(true);
        Self::Structured(structured)
    }

    /// Name reported when this constraint fails
    pub fn declared_name(&self) -> String {
        match self {
            Self::Named(name) => name.clone(),
            Self::Pattern(pattern) => pattern.source().to_string(),
            Self::Callable { name, .. } => name
                .clone()
                .unwrap_or_else(|| ANONYMOUS_CONSTRAINT.to_string()),
            Self::Structured(s) => s
                .name
                .clone()
                .unwrap_or_else(|| s.constraint.declared_name()),
        }
    }

    fn into_structured(self) -> StructuredConstraint {
        match self {
            Self::Structured(s) => s,
            other => StructuredConstraint {
                constraint: Box::new(other),
                name: None,
                params: None,
                is_method: None,
            },
        }
    }
}

impl From<&str> for ConstraintSpec {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl From<Regex> for ConstraintSpec {
    fn from(regex: Regex) -> Self {
        Self::regex(regex)
    }
}

impl fmt::Debug for ConstraintSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Pattern(pattern) => f.debug_tuple("Pattern").field(&pattern.source()).finish(),
            Self::Callable { name, func } => f
                .debug_struct("Callable")
                .field("name", name)
                .field("method", &func.is_method())
                .finish(),
            Self::Structured(s) => f
                .debug_struct("Structured")
                .field("constraint", &s.constraint)
                .field("name", &s.name)
                .field("params", &s.params)
                .field("is_method", &s.is_method)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_distinguishes_patterns() {
        assert!(matches!(ConstraintSpec::parse("email"), ConstraintSpec::Named(_)));
        assert!(matches!(ConstraintSpec::parse("/^\\d+$/"), ConstraintSpec::Pattern(_)));
    }

    #[test]
    fn test_declared_names() {
        assert_eq!(ConstraintSpec::named("zip").declared_name(), "zip");
        assert_eq!(ConstraintSpec::parse("/^a/").declared_name(), "/^a/");
        assert_eq!(
            ConstraintSpec::predicate(|_| true).declared_name(),
            ANONYMOUS_CONSTRAINT
        );
        assert_eq!(
            ConstraintSpec::named("zip").with_name("zip_code").declared_name(),
            "zip_code"
        );
    }

    #[test]
    fn test_builders_merge_into_one_structure() {
        let spec = ConstraintSpec::named("cc_number")
            .with_params(vec![Param::field("cc_no"), Param::field("cc_type")])
            .with_name("card");

        match spec {
            ConstraintSpec::Structured(s) => {
                assert_eq!(s.name.as_deref(), Some("card"));
                assert_eq!(s.params.as_ref().map(Vec::len), Some(2));
                assert!(matches!(*s.constraint, ConstraintSpec::Named(_)));
            }
            other => panic!("expected structured, got {other:?}"),
        }
    }
}
