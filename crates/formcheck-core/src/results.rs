//! Classification outcome of one evaluation
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

use crate::input::Record;
use crate::messages::{FieldFailure, MessageConfig, MessageFormatter, Messages};
use crate::{FieldValue, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Per-field classification produced by [`evaluate`](crate::evaluate).
///
/// Every field named by the input or the profile ends up in exactly one of
/// the four classifications.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationResults {
    valid: Record,
    missing: BTreeSet<String>,
    invalid: BTreeMap<String, Vec<String>>,
    unknown: BTreeSet<String>,
    #[serde(skip)]
    msgs: MessageConfig,
}

impl ValidationResults {
    pub(crate) fn new(
        valid: Record,
        missing: BTreeSet<String>,
        invalid: BTreeMap<String, Vec<String>>,
        unknown: BTreeSet<String>,
        msgs: MessageConfig,
    ) -> Self {
        Self {
            valid,
            missing,
            invalid,
            unknown,
            msgs,
        }
    }

    /// True when nothing is missing or invalid
    pub fn success(&self) -> bool {
        self.missing.is_empty() && self.invalid.is_empty()
    }

    /// All valid fields with their values
    pub fn valid(&self) -> &Record {
        &self.valid
    }

    /// Valid value of one field
    pub fn valid_value(&self, field: &str) -> Option<&FieldValue> {
        self.valid.get(field)
    }

    /// Names of the valid fields
    pub fn valid_fields(&self) -> impl Iterator<Item = &str> {
        self.valid.keys().map(String::as_str)
    }

    /// Write or correct a valid value after evaluation
    pub fn set_valid(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.valid.insert(field.into(), value.into());
    }

    /// All missing fields
    pub fn missing(&self) -> &BTreeSet<String> {
        &self.missing
    }

    /// Whether `field` is missing
    pub fn is_missing(&self, field: &str) -> bool {
        self.missing.contains(field)
    }

    /// All invalid fields with their failed constraint names, in declaration order
    pub fn invalid(&self) -> &BTreeMap<String, Vec<String>> {
        &self.invalid
    }

    /// Failed constraint names of one field
    pub fn invalid_constraints(&self, field: &str) -> Option<&[String]> {
        self.invalid.get(field).map(Vec::as_slice)
    }

    /// Names of the invalid fields
    pub fn invalid_fields(&self) -> impl Iterator<Item = &str> {
        self.invalid.keys().map(String::as_str)
    }

    /// All unknown fields
    pub fn unknown(&self) -> &BTreeSet<String> {
        &self.unknown
    }

    /// Whether `field` is unknown
    pub fn is_unknown(&self, field: &str) -> bool {
        self.unknown.contains(field)
    }

    pub fn has_valid(&self) -> bool {
        !self.valid.is_empty()
    }

    pub fn has_missing(&self) -> bool {
        !self.missing.is_empty()
    }

    pub fn has_invalid(&self) -> bool {
        !self.invalid.is_empty()
    }

    pub fn has_unknown(&self) -> bool {
        !self.unknown.is_empty()
    }

    /// Message configuration accumulated so far
    pub fn message_config(&self) -> &MessageConfig {
        &self.msgs
    }

    /// Error messages keyed by field.
    ///
    /// `overrides` merge into the configuration kept by this result, so later
    /// calls see earlier overrides.
    pub fn messages(&mut self, overrides: Option<&MessageConfig>) -> Result<BTreeMap<String, String>> {
        if let Some(overrides) = overrides {
            self.msgs.merge(overrides);
        }
        let formatter = Messages::new(self.msgs.clone())?;
        self.messages_with(&formatter)
    }

    /// Error messages produced by a custom formatting policy
    pub fn messages_with(&self, formatter: &dyn MessageFormatter) -> Result<BTreeMap<String, String>> {
        let mut out = BTreeMap::new();

        for field in &self.missing {
            out.insert(
                formatter.key(field),
                formatter.format(field, FieldFailure::Missing)?,
            );
        }
        for (field, names) in &self.invalid {
            out.insert(
                formatter.key(field),
                formatter.format(field, FieldFailure::Invalid(names))?,
            );
        }

        if !out.is_empty() {
            if let Some(key) = formatter.any_errors_key() {
                out.insert(key, "1".to_string());
            }
        }
        Ok(out)
    }
}
