//! Field-name and value patterns
//!
//! Patterns reach the engine in two forms: an already compiled [`Regex`], or
//! a legacy delimited string such as `/^addr_/i` or `m{_name$}` found in
//! profile files. Legacy strings are only compiled when a profile step
//! resolves them, so a malformed one surfaces as a structural error of the
//! evaluation that uses it.
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

/// A pattern matched against field names or field values
#[derive(Debug, Clone)]
pub enum FieldPattern {
    /// Compiled by the caller
    Native(Regex),
    /// Delimited string, compiled on resolution
    Legacy(String),
}

impl FieldPattern {
    /// Wrap a compiled regex
    pub fn native(regex: Regex) -> Self {
        Self::Native(regex)
    }

    /// Keep a delimited string for later compilation
    pub fn legacy(text: impl Into<String>) -> Self {
        Self::Legacy(text.into())
    }

    /// Original text of the pattern
    pub fn source(&self) -> &str {
        match self {
            Self::Native(regex) => regex.as_str(),
            Self::Legacy(text) => text,
        }
    }

    /// Whether `text` uses the delimiter convention (`/.../flags` or `m<d>...<d>flags`)
    pub fn is_delimited(text: &str) -> bool {
        let mut chars = text.chars();
        match chars.next() {
            Some('/') => true,
            Some('m') => chars
                .next()
                .map(|c| !c.is_alphanumeric() && !c.is_whitespace() && c != '_')
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Compile the pattern
    pub fn compile(&self) -> Result<Regex> {
        match self {
            Self::Native(regex) => Ok(regex.clone()),
            Self::Legacy(text) => {
                let source = translate_legacy(text)?;
                Regex::new(&source).map_err(|e| Error::invalid_pattern(text.as_str(), e))
            }
        }
    }

    /// Subset of `keys` matching this pattern
    pub fn matching_fields<'a, I>(&self, keys: I) -> Result<BTreeSet<String>>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let regex = self.compile()?;
        Ok(matching_fields(&regex, keys))
    }
}

/// Subset of `keys` matched by an already compiled pattern
pub fn matching_fields<'a, I>(regex: &Regex, keys: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a String>,
{
    keys.into_iter()
        .filter(|key| regex.is_match(key))
        .cloned()
        .collect()
}

/// Turn a delimited pattern into regex syntax with inline flags.
///
/// Undelimited text is taken as a bare expression.
fn translate_legacy(text: &str) -> Result<String> {
    if !FieldPattern::is_delimited(text) {
        return Ok(text.to_string());
    }

    let (open, rest) = if let Some(rest) = text.strip_prefix('/') {
        ('/', rest)
    } else {
        let mut chars = text[1..].chars();
        let open = chars
            .next()
            .ok_or_else(|| Error::invalid_pattern(text, "missing delimiter"))?;
        (open, chars.as_str())
    };
    let close = match open {
        '(' => ')',
        '{' => '}',
        '[' => ']',
        '<' => '>',
        other => other,
    };

    let end = rest
        .rfind(close)
        .ok_or_else(|| Error::invalid_pattern(text, "unterminated pattern"))?;
    let body = &rest[..end];
    let flags = &rest[end + close.len_utf8()..];

    let mut inline = String::new();
    for flag in flags.chars() {
        match flag {
            'i' | 'm' | 's' | 'x' => {
                if !inline.contains(flag) {
                    inline.push(flag);
                }
            }
            // compile-once and global have no meaning for a single match
            'o' | 'g' => {}
            other => {
                return Err(Error::invalid_pattern(
                    text,
                    format!("unsupported flag '{}'", other),
                ))
            }
        }
    }

    if inline.is_empty() {
        Ok(body.to_string())
    } else {
        Ok(format!("(?{}){}", inline, body))
    }
}

impl From<Regex> for FieldPattern {
    fn from(regex: Regex) -> Self {
        Self::Native(regex)
    }
}

impl From<&str> for FieldPattern {
    fn from(text: &str) -> Self {
        Self::Legacy(text.to_string())
    }
}

impl fmt::Display for FieldPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source())
    }
}

impl Serialize for FieldPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.source())
    }
}

impl<'de> Deserialize<'de> for FieldPattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(FieldPattern::Legacy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_delimiter_detection() {
        assert!(FieldPattern::is_delimited("/^a/"));
        assert!(FieldPattern::is_delimited("m{^a}i"));
        assert!(FieldPattern::is_delimited("m!x!"));
        assert!(!FieldPattern::is_delimited("email"));
        assert!(!FieldPattern::is_delimited("max_length"));
    }

    #[test]
    fn test_legacy_with_flags() {
        let pattern = FieldPattern::legacy("/^ADDR_/i");
        let matched = pattern.matching_fields(&keys(&["addr_1", "Addr_2", "name"])).unwrap();
        assert_eq!(matched.into_iter().collect::<Vec<_>>(), vec!["Addr_2", "addr_1"]);
    }

    #[test]
    fn test_bracket_delimiters() {
        let pattern = FieldPattern::legacy("m{_name$}");
        let matched = pattern
            .matching_fields(&keys(&["first_name", "last_name", "named"]))
            .unwrap();
        assert_eq!(matched.len(), 2);
    }

    #[test]
    fn test_native_pattern() {
        let pattern = FieldPattern::native(Regex::new("^x").unwrap());
        assert_eq!(pattern.source(), "^x");
        assert!(pattern.matching_fields(&keys(&["xa", "ax"])).unwrap().contains("xa"));
    }

    #[test]
    fn test_bare_expression() {
        let pattern = FieldPattern::legacy("^opt_");
        assert_eq!(pattern.matching_fields(&keys(&["opt_a", "a"])).unwrap().len(), 1);
    }

    #[test]
    fn test_compile_failure_names_pattern() {
        let err = FieldPattern::legacy("/([a-z/").compile().unwrap_err();
        match err {
            Error::InvalidPattern { pattern, .. } => assert_eq!(pattern, "/([a-z/"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_flag() {
        assert!(FieldPattern::legacy("/a/q").compile().is_err());
        assert!(FieldPattern::legacy("/abc").compile().is_err());
    }
}
