//! Validation profiles
//!
//! A profile declares which fields are required or optional, how they are
//! filtered, which constraints they must satisfy and which fields become
//! required through dependencies. Profiles are built in memory with
//! [`ProfileBuilder`] or read from JSON-shaped data with
//! [`Profile::from_value`].
//!
//! # Module Organization
//!
//! - [`constraint`] - Constraint specifications and params
//! - [`builder`] - Fluent builder API
//! - [`raw`] - Conversion from JSON-shaped profile data
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

pub mod builder;
pub mod constraint;
pub mod raw;

pub use builder::ProfileBuilder;
pub use constraint::{ConstraintSpec, Param, StructuredConstraint, ANONYMOUS_CONSTRAINT};
pub use raw::KNOWN_PROFILE_KEYS;

use crate::callable::FilterFn;
use crate::messages::MessageConfig;
use crate::pattern::FieldPattern;
use crate::{FieldValue, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A filter reference in a profile
#[derive(Clone)]
pub enum FilterSpec {
    /// Registered filter, looked up by name
    Named(String),
    /// Inline filter function
    Func(FilterFn),
}

impl FilterSpec {
    /// Registered filter by name
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Inline filter
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self::Func(Arc::new(f))
    }
}

impl From<&str> for FilterSpec {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl fmt::Debug for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Func(_) => write!(f, "Func(..)"),
        }
    }
}

/// Computes dependent fields from the trigger's value
pub type DependencyFn = Arc<dyn Fn(&FieldValue) -> Vec<String> + Send + Sync>;

/// Fields required once a trigger field is present
#[derive(Clone)]
pub enum Dependency {
    /// Always required when the trigger is present
    Fields(Vec<String>),
    /// Required only when the trigger's value equals the key
    ByValue(BTreeMap<String, Vec<String>>),
    /// Computed from the trigger's value
    Computed(DependencyFn),
}

impl Dependency {
    /// Dependent fields triggered by `value`
    pub fn triggered_by(&self, value: &FieldValue) -> Vec<String> {
        match self {
            Self::Fields(fields) => fields.clone(),
            Self::ByValue(by_value) => by_value
                .iter()
                .filter(|(key, _)| value.contains(key))
                .flat_map(|(_, fields)| fields.iter().cloned())
                .collect(),
            Self::Computed(f) => f(value),
        }
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fields(fields) => f.debug_tuple("Fields").field(fields).finish(),
            Self::ByValue(map) => f.debug_tuple("ByValue").field(map).finish(),
            Self::Computed(_) => write!(f, "Computed(..)"),
        }
    }
}

/// A require-some group: at least `minimum` of `members` must be present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireSome {
    pub minimum: usize,
    pub members: Vec<String>,
}

impl RequireSome {
    /// Group with an explicit minimum
    pub fn new<I, S>(minimum: usize, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            minimum,
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    /// Build from a flat list whose first element may be the count.
    ///
    /// A numeric first element is the minimum and is not a member. Otherwise
    /// the minimum is 1 and every element, the first included, is a member.
    pub fn from_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut members: Vec<String> = items.into_iter().map(Into::into).collect();
        let count = members
            .first()
            .filter(|first| !first.is_empty() && first.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|first| first.parse::<usize>().ok());

        match count {
            Some(minimum) => {
                members.remove(0);
                Self { minimum, members }
            }
            None => Self { minimum: 1, members },
        }
    }
}

/// A complete validation profile
#[derive(Debug, Clone, Default)]
pub struct Profile {
    pub required: Vec<String>,
    pub optional: Vec<String>,
    pub required_regexp: Option<FieldPattern>,
    pub optional_regexp: Option<FieldPattern>,
    pub require_some: BTreeMap<String, RequireSome>,
    pub dependencies: BTreeMap<String, Dependency>,
    pub dependency_groups: BTreeMap<String, Vec<String>>,
    pub defaults: BTreeMap<String, FieldValue>,
    pub filters: Vec<FilterSpec>,
    pub field_filters: BTreeMap<String, Vec<FilterSpec>>,
    pub field_filter_regexp_map: Vec<(FieldPattern, Vec<FilterSpec>)>,
    pub constraints: BTreeMap<String, Vec<ConstraintSpec>>,
    pub constraint_regexp_map: Vec<(FieldPattern, Vec<ConstraintSpec>)>,
    pub untaint_all_constraints: bool,
    pub untaint_constraint_fields: Vec<String>,
    pub untaint_regexp_map: Vec<FieldPattern>,
    pub missing_optional_valid: bool,
    pub validator_packages: Vec<String>,
    pub msgs: MessageConfig,
}

impl Profile {
    /// Start building a profile
    pub fn builder() -> ProfileBuilder {
        ProfileBuilder::new()
    }

    /// Read a profile from JSON-shaped data, rejecting unknown option keys
    pub fn from_value(value: &Value) -> Result<Self> {
        raw::profile_from_value(value)
    }

    /// Read a profile from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_some_numeric_first_element() {
        let group = RequireSome::from_list(["2", "a", "b", "c"]);
        assert_eq!(group.minimum, 2);
        assert_eq!(group.members, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_require_some_defaults_to_one() {
        let group = RequireSome::from_list(["city", "state"]);
        assert_eq!(group.minimum, 1);
        assert_eq!(group.members, vec!["city", "state"]);
    }

    #[test]
    fn test_require_some_non_numeric_first_is_member() {
        let group = RequireSome::from_list(["2nd_phone", "phone"]);
        assert_eq!(group.minimum, 1);
        assert_eq!(group.members.len(), 2);
    }

    #[test]
    fn test_dependency_by_value() {
        let mut by_value = BTreeMap::new();
        by_value.insert("check".to_string(), vec!["check_no".to_string()]);
        by_value.insert("card".to_string(), vec!["cc_no".to_string(), "cc_exp".to_string()]);
        let dep = Dependency::ByValue(by_value);

        assert_eq!(dep.triggered_by(&FieldValue::scalar("card")), vec!["cc_no", "cc_exp"]);
        assert!(dep.triggered_by(&FieldValue::scalar("cash")).is_empty());
        assert_eq!(
            dep.triggered_by(&FieldValue::list(["cash", "check"])),
            vec!["check_no"]
        );
    }
}
