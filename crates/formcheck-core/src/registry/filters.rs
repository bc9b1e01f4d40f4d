//! Built-in filters
//!
//! Extraction filters (`integer`, `decimal`, `dollars` and their signed
//! variants) keep the first matching number and yield an empty string when
//! there is none, which the empty-stripping step then removes.
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

use super::Registry;
use regex::Regex;
use std::sync::OnceLock;

macro_rules! cached_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).expect("built-in filter pattern"))
        }
    };
}

cached_regex!(whitespace_run, r"\s+");
cached_regex!(integer_re, r"[-+]?\d+");
cached_regex!(pos_integer_re, r"\+?\d+");
cached_regex!(neg_integer_re, r"-\d+");
cached_regex!(decimal_re, r"[-+]?\d+\.?\d*");
cached_regex!(pos_decimal_re, r"\+?\d+\.?\d*");
cached_regex!(neg_decimal_re, r"-\d+\.?\d*");
cached_regex!(dollars_re, r"\d+\.?\d?\d?");

/// Register every built-in filter
pub fn register_builtins(registry: &Registry) {
    registry.register_filter("trim", trim);
    registry.register_filter("strip", strip);
    registry.register_filter("digit", digit);
    registry.register_filter("alphanum", alphanum);
    registry.register_filter("integer", |v| first_match(integer_re(), v));
    registry.register_filter("pos_integer", |v| first_match(pos_integer_re(), v));
    registry.register_filter("neg_integer", |v| first_match(neg_integer_re(), v));
    registry.register_filter("decimal", |v| first_match(decimal_re(), &v.replace(',', ".")));
    registry.register_filter("pos_decimal", |v| {
        first_match(pos_decimal_re(), &v.replace(',', "."))
    });
    registry.register_filter("neg_decimal", |v| {
        first_match(neg_decimal_re(), &v.replace(',', "."))
    });
    registry.register_filter("dollars", |v| first_match(dollars_re(), &v.replace(',', ".")));
    registry.register_filter("phone", phone);
    registry.register_filter("sql_wildcard", |v| v.replace('*', "%"));
    registry.register_filter("quotemeta", quotemeta);
    registry.register_filter("lc", |v| v.to_lowercase());
    registry.register_filter("uc", |v| v.to_uppercase());
    registry.register_filter("ucfirst", ucfirst);
}

/// Remove leading and trailing whitespace
pub fn trim(value: &str) -> String {
    value.trim().to_string()
}

/// Trim and collapse inner whitespace runs to one space
pub fn strip(value: &str) -> String {
    whitespace_run().replace_all(value.trim(), " ").into_owned()
}

/// Keep only digits
pub fn digit(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Keep only letters and digits
pub fn alphanum(value: &str) -> String {
    value.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Keep characters that can appear in a written phone number
pub fn phone(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_digit() || c.is_whitespace() || "(),.-#".contains(*c))
        .collect()
}

/// Backslash-escape every character that is not a word character
pub fn quotemeta(value: &str) -> String {
    let mut out = String::with_capacity(value.len() * 2);
    for c in value.chars() {
        if !(c.is_alphanumeric() || c == '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Lowercase, then capitalise the first character
pub fn ucfirst(value: &str) -> String {
    let lower = value.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn first_match(regex: &Regex, value: &str) -> String {
    regex
        .find(value)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}
