//! Input adapters
//!
//! The engine accepts either a plain field map or anything that can list
//! parameter names and return the values of one parameter (a web form, a
//! decoded query string). Both are normalised into a [`Record`] before any
//! profile step runs.
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

use crate::{Error, FieldValue, Result};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Normalised field map used for input, the working set and the valid map
pub type Record = BTreeMap<String, FieldValue>;

/// Something the engine can read fields from
pub trait InputSource {
    /// Every parameter name present
    fn param_names(&self) -> Vec<String>;

    /// All values of one parameter, in submission order
    fn param_values(&self, name: &str) -> Vec<String>;

    /// Normalise into a record: more than one value becomes a list, exactly
    /// one is unwrapped to a scalar, none drops the parameter.
    fn to_record(&self) -> Record {
        let mut record = Record::new();
        for name in self.param_names() {
            let mut values = self.param_values(&name);
            match values.len() {
                0 => {}
                1 => {
                    record.insert(name, FieldValue::Scalar(values.remove(0)));
                }
                _ => {
                    record.insert(name, FieldValue::List(values));
                }
            }
        }
        record
    }
}

impl InputSource for Record {
    fn param_names(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }

    fn param_values(&self, name: &str) -> Vec<String> {
        self.get(name)
            .map(|value| value.iter().map(str::to_string).collect())
            .unwrap_or_default()
    }

    // Plain maps are copied as-is so single-element lists stay lists
    fn to_record(&self) -> Record {
        self.clone()
    }
}

impl InputSource for HashMap<String, FieldValue> {
    fn param_names(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }

    fn param_values(&self, name: &str) -> Vec<String> {
        self.get(name)
            .map(|value| value.iter().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn to_record(&self) -> Record {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl InputSource for HashMap<String, String> {
    fn param_names(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }

    fn param_values(&self, name: &str) -> Vec<String> {
        self.get(name).cloned().into_iter().collect()
    }
}

impl InputSource for BTreeMap<String, String> {
    fn param_names(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }

    fn param_values(&self, name: &str) -> Vec<String> {
        self.get(name).cloned().into_iter().collect()
    }
}

impl InputSource for HashMap<String, Vec<String>> {
    fn param_names(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }

    fn param_values(&self, name: &str) -> Vec<String> {
        self.get(name).cloned().unwrap_or_default()
    }
}

/// Ordered name/value pairs, as submitted by an HTML form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormParams {
    pairs: Vec<(String, String)>,
}

impl FormParams {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an `application/x-www-form-urlencoded` string
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = url::form_urlencoded::parse(query.as_bytes())
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();
        Self { pairs }
    }

    /// Append one value for `name`
    pub fn append(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((name.into(), value.into()));
        self
    }

    /// Number of submitted pairs
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether nothing was submitted
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl InputSource for FormParams {
    fn param_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for (name, _) in &self.pairs {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    fn param_values(&self, name: &str) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
            .collect()
    }
}

/// Convert a JSON object into a record.
///
/// Strings, numbers and booleans become scalars, arrays become lists and
/// `null` members are dropped. Nested objects are rejected.
pub fn record_from_json(value: &Value) -> Result<Record> {
    let object = value.as_object().ok_or_else(|| Error::InvalidInput {
        message: "expected a JSON object of field names to values".to_string(),
    })?;

    let mut record = Record::new();
    for (name, member) in object {
        let field = match member {
            Value::Null => continue,
            Value::Array(items) => {
                let values = items
                    .iter()
                    .map(|item| json_scalar(name, item))
                    .collect::<Result<Vec<_>>>()?;
                FieldValue::List(values)
            }
            other => FieldValue::Scalar(json_scalar(name, other)?),
        };
        record.insert(name.clone(), field);
    }
    Ok(record)
}

fn json_scalar(name: &str, value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Array(_) | Value::Object(_) => Err(Error::InvalidInput {
            message: format!("field '{}' holds a nested structure", name),
        }),
    }
}
