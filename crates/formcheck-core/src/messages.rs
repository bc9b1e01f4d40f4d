//! Error message formatting for validation results
//!
//! [`MessageConfig`] is a partial configuration: every setting is optional and
//! unset settings fall back to the defaults below. Configurations merge, so a
//! profile's `msgs` can be refined by per-call overrides without restating
//! everything.
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Wrapper used when no `format` is configured
pub const DEFAULT_FORMAT: &str =
    r#"<span style="color:red;font-weight:bold" class="field_errors">* %s</span>"#;

/// Text for a missing field
pub const DEFAULT_MISSING: &str = "Missing";

/// Text for a failed constraint without an override
pub const DEFAULT_INVALID: &str = "Invalid";

/// Joins the texts of several failed constraints
pub const DEFAULT_SEPARATOR: &str = " ";

/// Message formatting settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MessageConfig {
    /// Prepended to every field name in the output keys
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Text for missing fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<String>,
    /// Text for failed constraints without an override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid: Option<String>,
    /// Joins several failure texts for one field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_separator: Option<String>,
    /// Wrapper with exactly one `%s` placeholder; `%%` is a literal percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Text per failed constraint name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub constraints: BTreeMap<String, String>,
    /// Key set to "1" when any field is missing or invalid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any_errors: Option<String>,
}

impl MessageConfig {
    /// Overlay `other` onto this configuration
    pub fn merge(&mut self, other: &MessageConfig) {
        fn overlay(slot: &mut Option<String>, value: &Option<String>) {
            if value.is_some() {
                slot.clone_from(value);
            }
        }

        overlay(&mut self.prefix, &other.prefix);
        overlay(&mut self.missing, &other.missing);
        overlay(&mut self.invalid, &other.invalid);
        overlay(&mut self.invalid_separator, &other.invalid_separator);
        overlay(&mut self.format, &other.format);
        overlay(&mut self.any_errors, &other.any_errors);
        self.constraints.extend(
            other
                .constraints
                .iter()
                .map(|(name, text)| (name.clone(), text.clone())),
        );
    }

    /// This configuration with `other` overlaid
    pub fn merged(mut self, other: &MessageConfig) -> Self {
        self.merge(other);
        self
    }

    /// Set the text for one constraint name
    pub fn constraint_message(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.constraints.insert(name.into(), text.into());
        self
    }

    /// Set the wrapper format
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Set the sentinel key
    pub fn with_any_errors(mut self, key: impl Into<String>) -> Self {
        self.any_errors = Some(key.into());
        self
    }

    /// Set the key prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

/// Why a field is reported
#[derive(Debug, Clone, Copy)]
pub enum FieldFailure<'a> {
    Missing,
    /// Failed constraint names, in declaration order
    Invalid(&'a [String]),
}

/// Policy turning classification outcomes into display strings
pub trait MessageFormatter {
    /// Message for one reported field
    fn format(&self, field: &str, failure: FieldFailure<'_>) -> Result<String>;

    /// Output key for a field
    fn key(&self, field: &str) -> String {
        field.to_string()
    }

    /// Sentinel key inserted when anything is reported
    fn any_errors_key(&self) -> Option<String> {
        None
    }
}

/// The standard formatting policy, driven by a [`MessageConfig`]
#[derive(Debug, Clone)]
pub struct Messages {
    config: MessageConfig,
}

impl Messages {
    /// Create a formatter, rejecting a malformed wrapper format
    pub fn new(config: MessageConfig) -> Result<Self> {
        if let Some(format) = &config.format {
            apply_format(format, "")?;
        }
        Ok(Self { config })
    }

    /// The effective configuration
    pub fn config(&self) -> &MessageConfig {
        &self.config
    }

    fn wrap(&self, text: &str) -> Result<String> {
        apply_format(self.config.format.as_deref().unwrap_or(DEFAULT_FORMAT), text)
    }
}

impl MessageFormatter for Messages {
    fn format(&self, _field: &str, failure: FieldFailure<'_>) -> Result<String> {
        match failure {
            FieldFailure::Missing => {
                self.wrap(self.config.missing.as_deref().unwrap_or(DEFAULT_MISSING))
            }
            FieldFailure::Invalid(names) => {
                let fallback = self.config.invalid.as_deref().unwrap_or(DEFAULT_INVALID);
                let mut texts: Vec<&str> = Vec::with_capacity(names.len());
                for name in names {
                    let text = self
                        .config
                        .constraints
                        .get(name)
                        .map(String::as_str)
                        .unwrap_or(fallback);
                    if !texts.contains(&text) {
                        texts.push(text);
                    }
                }
                let separator = self
                    .config
                    .invalid_separator
                    .as_deref()
                    .unwrap_or(DEFAULT_SEPARATOR);
                self.wrap(&texts.join(separator))
            }
        }
    }

    fn key(&self, field: &str) -> String {
        match &self.config.prefix {
            Some(prefix) => format!("{}{}", prefix, field),
            None => field.to_string(),
        }
    }

    fn any_errors_key(&self) -> Option<String> {
        self.config.any_errors.clone()
    }
}

/// Substitute `text` for the single `%s` in `format`
pub fn apply_format(format: &str, text: &str) -> Result<String> {
    let mut out = String::with_capacity(format.len() + text.len());
    let mut placeholders = 0;
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some('s') => {
                chars.next();
                placeholders += 1;
                out.push_str(text);
            }
            _ => out.push('%'),
        }
    }

    if placeholders == 1 {
        Ok(out)
    } else {
        Err(Error::InvalidMessageFormat {
            format: format.to_string(),
        })
    }
}
