//! Error types for the formcheck core library
//!
//! Every variant here is a structural error: it means the profile (or a
//! collaborator function) was built incorrectly, and evaluation is aborted.
//! Missing, invalid and unknown fields are never errors; they are recorded in
//! [`ValidationResults`](crate::ValidationResults).
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

use thiserror::Error;

/// Main error type for formcheck operations
#[derive(Error, Debug)]
pub enum Error {
    /// A profile contained an option key the engine does not know
    #[error("Invalid profile: unknown option '{key}'")]
    UnknownProfileKey { key: String },

    /// A profile option had the wrong shape
    #[error("Invalid profile: {message}")]
    InvalidProfile { message: String },

    /// A filter name could not be resolved in the registry
    #[error("No filter found named '{name}'")]
    UnknownFilter { name: String },

    /// A constraint name could not be resolved in the registry
    #[error("No constraint found named '{name}'")]
    UnknownConstraint { name: String },

    /// A validator package listed in the profile was never registered
    #[error("Validator package '{name}' is not registered")]
    UnknownPackage { name: String },

    /// A field or constraint pattern failed to compile
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Constraint parameters had the wrong shape or arity
    #[error("Invalid params for constraint '{constraint}': {message}")]
    InvalidParams { constraint: String, message: String },

    /// A message format string did not contain exactly one `%s`
    #[error("Message format '{format}' must contain exactly one '%s' placeholder")]
    InvalidMessageFormat { format: String },

    /// A record could not be converted into field values
    #[error("Invalid input record: {message}")]
    InvalidInput { message: String },

    /// JSON conversion errors
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid profile error
    pub fn invalid_profile(message: impl Into<String>) -> Self {
        Self::InvalidProfile {
            message: message.into(),
        }
    }

    /// Create an invalid params error
    pub fn invalid_params(constraint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParams {
            constraint: constraint.into(),
            message: message.into(),
        }
    }

    /// Create an invalid pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownProfileKey {
            key: "requried".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid profile: unknown option 'requried'");
    }

    #[test]
    fn test_pattern_error_names_pattern() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = Error::invalid_pattern("/(/", source);
        assert!(err.to_string().contains("/(/"));
    }

    #[test]
    fn test_message_format_error() {
        let err = Error::InvalidMessageFormat {
            format: "%s and %s".to_string(),
        };
        assert!(err.to_string().contains("exactly one"));
    }
}
