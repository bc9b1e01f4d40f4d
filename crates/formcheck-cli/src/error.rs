//! Error types and handling for the CLI
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The record was checked and has missing or invalid fields
    #[error("Record rejected: {missing} missing, {invalid} invalid")]
    RecordRejected { missing: usize, invalid: usize },

    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Structural error in a profile
    #[error("Profile error: {0}")]
    Core(#[from] formcheck_core::Error),

    /// Profile file could not be loaded
    #[error("{0}")]
    Loader(#[from] formcheck_profiles::LoaderError),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Invalid file format
    #[error("Invalid file format for {}: expected {}", path.display(), expected)]
    InvalidFormat { path: PathBuf, expected: String },

    /// Invalid argument combination
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML configuration error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create an invalid arguments error
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::RecordRejected { .. } => 1,
            Self::Io(_) => 2,
            Self::Core(_) => 3,
            Self::Loader(_) => 4,
            Self::FileNotFound { .. } => 5,
            Self::InvalidFormat { .. } => 6,
            Self::InvalidArgs(_) => 7,
            Self::Json(_) => 8,
            Self::Yaml(_) => 9,
            Self::Toml(_) => 10,
            Self::Other { .. } => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::InvalidArgs(_))
    }

    /// Whether the failure is a verdict on the data rather than a fault
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::RecordRejected { .. })
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = [
            Error::RecordRejected { missing: 1, invalid: 0 },
            Error::Io(io::Error::new(io::ErrorKind::Other, "boom")),
            Error::Core(formcheck_core::Error::UnknownFilter {
                name: "nope".to_string(),
            }),
            Error::FileNotFound {
                path: PathBuf::from("a.json"),
            },
            Error::invalid_args("bad"),
            Error::other("other"),
        ];
        let mut codes: Vec<i32> = errors.iter().map(Error::exit_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert_eq!(errors[0].exit_code(), 1);
    }

    #[test]
    fn test_format_error_plain() {
        let err = Error::RecordRejected { missing: 2, invalid: 1 };
        assert_eq!(
            format_error(&err, false),
            "Error: Record rejected: 2 missing, 1 invalid"
        );
        assert!(err.is_rejection());
        assert!(!err.should_show_help());
        assert!(Error::invalid_args("x").should_show_help());
    }
}
