//! Evaluation context handed to constraint methods
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

use crate::input::{InputSource, Record};
use crate::FieldValue;
use std::collections::BTreeSet;

/// View of the evaluation in progress, passed to constraint methods.
///
/// The valid map is the working set as it stands while constraints run:
/// fields already rejected have left it, fields not yet checked are still in
/// it, and a method may write derived values for sibling fields.
pub struct ConstraintContext<'a> {
    field: &'a str,
    value: String,
    input: &'a dyn InputSource,
    valid: &'a mut Record,
    classified: Option<&'a BTreeSet<String>>,
    constraint_name: Option<String>,
}

impl<'a> ConstraintContext<'a> {
    /// Create a context for checking `value` of `field`
    pub fn new(
        field: &'a str,
        value: impl Into<String>,
        input: &'a dyn InputSource,
        valid: &'a mut Record,
    ) -> Self {
        Self {
            field,
            value: value.into(),
            input,
            valid,
            classified: None,
            constraint_name: None,
        }
    }

    /// Fields already reported missing, unknown or invalid; writes to them are refused
    pub(crate) fn with_classified(mut self, classified: &'a BTreeSet<String>) -> Self {
        self.classified = Some(classified);
        self
    }

    /// Name of the field being checked
    pub fn field(&self) -> &str {
        self.field
    }

    /// Value being checked; for list fields, the current element
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whole working value of the field being checked
    pub fn field_value(&self) -> Option<&FieldValue> {
        self.valid.get(self.field)
    }

    /// The caller's input, before normalisation and filtering
    pub fn input(&self) -> &dyn InputSource {
        self.input
    }

    /// Original submitted values of a field
    pub fn input_values(&self, name: &str) -> Vec<String> {
        self.input.param_values(name)
    }

    /// Current validated value of a field
    pub fn valid(&self, name: &str) -> Option<&FieldValue> {
        self.valid.get(name)
    }

    /// Write a validated value for a field.
    ///
    /// Returns `false` without writing when the field is already classified
    /// as missing, unknown or invalid.
    pub fn set_valid(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> bool {
        let name = name.into();
        if self.classified.is_some_and(|closed| closed.contains(&name)) {
            return false;
        }
        self.valid.insert(name, value.into());
        true
    }

    /// The whole valid map
    pub fn valid_map(&self) -> &Record {
        self.valid
    }

    /// Report a failure of this constraint under a different name
    pub fn set_constraint_name(&mut self, name: impl Into<String>) {
        self.constraint_name = Some(name.into());
    }

    /// Name set through [`set_constraint_name`](Self::set_constraint_name)
    pub fn constraint_name(&self) -> Option<&str> {
        self.constraint_name.as_deref()
    }

    pub(crate) fn take_constraint_name(&mut self) -> Option<String> {
        self.constraint_name.take()
    }
}
