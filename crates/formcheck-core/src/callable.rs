//! Function types for filters and constraints
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

use crate::context::ConstraintContext;
use crate::{FieldValue, Result};
use std::fmt;
use std::sync::Arc;

/// A filter rewrites one string value
pub type FilterFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// A resolved constraint parameter; `None` when it names an absent field
pub type ParamValue = Option<FieldValue>;

/// Constraint receiving only its resolved parameters
pub type PlainFn = Arc<dyn Fn(&[ParamValue]) -> Result<Verdict> + Send + Sync>;

/// Constraint that also receives the evaluation context
pub type MethodFn =
    Arc<dyn Fn(&mut ConstraintContext<'_>, &[ParamValue]) -> Result<Verdict> + Send + Sync>;

/// Outcome of one constraint invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Accepted; carries the value to keep when untainting
    Matched(String),
    /// Rejected
    Rejected,
}

impl Verdict {
    /// Accept `value` when `ok` holds
    pub fn check(ok: bool, value: &str) -> Self {
        if ok {
            Self::Matched(value.to_string())
        } else {
            Self::Rejected
        }
    }

    /// Whether the constraint accepted the value
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

/// A registered constraint function
#[derive(Clone)]
pub enum ConstraintFn {
    /// Called with parameters only; with no declared params, the value being checked
    Plain(PlainFn),
    /// Called with the evaluation context and declared params
    Method(MethodFn),
}

impl ConstraintFn {
    /// Wrap a plain constraint
    pub fn plain<F>(f: F) -> Self
    where
        F: Fn(&[ParamValue]) -> Result<Verdict> + Send + Sync + 'static,
    {
        Self::Plain(Arc::new(f))
    }

    /// Wrap a constraint method
    pub fn method<F>(f: F) -> Self
    where
        F: Fn(&mut ConstraintContext<'_>, &[ParamValue]) -> Result<Verdict> + Send + Sync + 'static,
    {
        Self::Method(Arc::new(f))
    }

    /// Wrap a boolean predicate over the checked value
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::plain(move |params| {
            let value = param_str(params, 0).unwrap_or_default();
            Ok(Verdict::check(f(value), value))
        })
    }

    /// Whether this function expects the evaluation context
    pub fn is_method(&self) -> bool {
        matches!(self, Self::Method(_))
    }
}

impl fmt::Debug for ConstraintFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(_) => write!(f, "ConstraintFn::Plain(..)"),
            Self::Method(_) => write!(f, "ConstraintFn::Method(..)"),
        }
    }
}

/// Wrap a closure as a filter
pub fn filter_fn<F>(f: F) -> FilterFn
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    Arc::new(f)
}

/// String form of parameter `index`: the scalar, or the first element of a list
pub fn param_str(params: &[ParamValue], index: usize) -> Option<&str> {
    params.get(index)?.as_ref()?.element(0)
}

/// Parameter `index` parsed as an integer
pub fn param_int(params: &[ParamValue], index: usize) -> Option<i64> {
    param_str(params, index)?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicate_wraps_value() {
        let constraint = ConstraintFn::predicate(|v| v.len() > 2);
        let ConstraintFn::Plain(f) = constraint else {
            panic!("predicate should be plain");
        };
        let params = vec![Some(FieldValue::scalar("abcd"))];
        assert_eq!(f(&params).unwrap(), Verdict::Matched("abcd".to_string()));
        let params = vec![Some(FieldValue::scalar("a"))];
        assert_eq!(f(&params).unwrap(), Verdict::Rejected);
    }

    #[test]
    fn test_param_helpers() {
        let params = vec![
            Some(FieldValue::scalar(" 12 ")),
            None,
            Some(FieldValue::list(["x", "y"])),
        ];
        assert_eq!(param_int(&params, 0), Some(12));
        assert_eq!(param_str(&params, 1), None);
        assert_eq!(param_str(&params, 2), Some("x"));
        assert_eq!(param_str(&params, 3), None);
    }
}
