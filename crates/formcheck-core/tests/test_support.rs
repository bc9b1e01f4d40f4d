//! Shared test support utilities for integration tests

#![allow(dead_code)]

use formcheck_core::{FieldValue, Profile, Record};
use serde_json::json;

/// Build a record of scalar fields
pub fn record(pairs: &[(&str, &str)]) -> Record {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), FieldValue::scalar(*value)))
        .collect()
}

/// Build a record from (name, values) pairs; one value stays a scalar
pub fn multi_record(pairs: &[(&str, &[&str])]) -> Record {
    pairs
        .iter()
        .map(|(name, values)| {
            let value = match values {
                [single] => FieldValue::scalar(*single),
                many => FieldValue::list(many.iter().copied()),
            };
            (name.to_string(), value)
        })
        .collect()
}

/// Field names as plain strings, for comparisons
pub fn names<'a>(fields: impl IntoIterator<Item = &'a String>) -> Vec<&'a str> {
    fields.into_iter().map(String::as_str).collect()
}

/// A checkout form profile exercising most options
pub fn checkout_profile() -> Profile {
    Profile::from_value(&json!({
        "required": ["email", "first_name", "last_name", "pay_type"],
        "optional": ["phone", "zip", "cc_no", "cc_type", "cc_exp", "check_no", "comments"],
        "dependencies": {
            "pay_type": {"card": ["cc_no", "cc_type", "cc_exp"], "check": "check_no"},
        },
        "filters": ["trim"],
        "field_filter_regexp_map": {"/_name$/": "ucfirst"},
        "constraints": {
            "email": "email",
            "zip": "zip",
            "cc_no": {"constraint": "cc_number", "params": ["cc_no", "cc_type"]},
            "cc_type": "cc_type",
        },
        "untaint_constraint_fields": ["zip"],
        "msgs": {"format": "%s", "any_errors": "err__"},
    }))
    .expect("checkout profile is well formed")
}
