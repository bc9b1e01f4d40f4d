//! Field values carried through the working set
//!
//! A field is either a single string or an ordered list of strings (a
//! multi-select, repeated query parameter and so on). Filters, constraints and
//! the result maps all operate on this one tagged type.
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of one input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Single-valued field
    Scalar(String),
    /// Multi-valued field; emptied elements are kept as `""` so the list shape survives
    List(Vec<String>),
}

impl FieldValue {
    /// Create a scalar value
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(value.into())
    }

    /// Create a list value
    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    /// Whether this is a multi-valued field
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// The scalar string, if this is a scalar
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(value) => Some(value),
            Self::List(_) => None,
        }
    }

    /// Number of values carried (1 for a scalar)
    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::List(values) => values.len(),
        }
    }

    /// True when no element carries any content
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Scalar(value) => value.is_empty(),
            Self::List(values) => values.iter().all(|v| v.is_empty()),
        }
    }

    /// Iterate over every element (a scalar yields itself once)
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::Scalar(value) => std::slice::from_ref(value),
            Self::List(values) => values,
        };
        slice.iter().map(String::as_str)
    }

    /// Element at `index`; index 0 of a scalar is the scalar itself
    pub fn element(&self, index: usize) -> Option<&str> {
        match self {
            Self::Scalar(value) if index == 0 => Some(value),
            Self::Scalar(_) => None,
            Self::List(values) => values.get(index).map(String::as_str),
        }
    }

    /// Replace the element at `index`, returning false when out of range
    pub fn set_element(&mut self, index: usize, replacement: String) -> bool {
        match self {
            Self::Scalar(value) if index == 0 => {
                *value = replacement;
                true
            }
            Self::Scalar(_) => false,
            Self::List(values) => match values.get_mut(index) {
                Some(slot) => {
                    *slot = replacement;
                    true
                }
                None => false,
            },
        }
    }

    /// Whether any element equals `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.iter().any(|v| v == needle)
    }

    /// Apply `f` to every element in order, replacing each
    pub fn map_each<F>(&mut self, mut f: F)
    where
        F: FnMut(&str) -> String,
    {
        match self {
            Self::Scalar(value) => *value = f(value),
            Self::List(values) => {
                for value in values.iter_mut() {
                    *value = f(value);
                }
            }
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(value) => write!(f, "{}", value),
            Self::List(values) => write!(f, "{}", values.join(", ")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(values: Vec<&str>) -> Self {
        Self::list(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_iterates_once() {
        let value = FieldValue::scalar("x");
        assert_eq!(value.iter().collect::<Vec<_>>(), vec!["x"]);
        assert_eq!(value.len(), 1);
        assert!(!value.is_list());
    }

    #[test]
    fn test_list_emptiness_is_elementwise() {
        assert!(FieldValue::list(["", ""]).is_empty());
        assert!(!FieldValue::list(["", "a"]).is_empty());
        assert!(FieldValue::scalar("").is_empty());
    }

    #[test]
    fn test_map_each_replaces_in_order() {
        let mut value = FieldValue::list(["a", "b"]);
        value.map_each(|v| v.to_uppercase());
        assert_eq!(value, FieldValue::list(["A", "B"]));
    }

    #[test]
    fn test_set_element_bounds() {
        let mut value = FieldValue::scalar("a");
        assert!(value.set_element(0, "b".to_string()));
        assert!(!value.set_element(1, "c".to_string()));
        assert_eq!(value.as_scalar(), Some("b"));
    }

    #[test]
    fn test_untagged_serde() {
        let scalar: FieldValue = serde_json::from_str("\"a\"").unwrap();
        let list: FieldValue = serde_json::from_str("[\"a\",\"b\"]").unwrap();
        assert_eq!(scalar, FieldValue::scalar("a"));
        assert_eq!(list, FieldValue::list(["a", "b"]));
        assert_eq!(serde_json::to_string(&list).unwrap(), "[\"a\",\"b\"]");
    }
}
