//! Error types for profile loading
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

use std::path::PathBuf;
use thiserror::Error;

/// Result type for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Errors raised while reading, parsing or building profile files
#[derive(Error, Debug)]
pub enum LoaderError {
    /// File I/O errors
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// YAML parsing errors
    #[error("Failed to parse YAML file '{path}': {source}")]
    YamlParseError {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// JSON parsing errors
    #[error("Failed to parse JSON file '{path}': {source}")]
    JsonParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Unsupported file format
    #[error("Unsupported file format for '{path}'. Expected .yaml, .yml, or .json")]
    UnsupportedFormat { path: PathBuf },

    /// A requested profile is not defined in the file
    #[error("Profile '{name}' not found in '{path}'")]
    ProfileNotFound { name: String, path: PathBuf },

    /// A profile definition was rejected by the engine
    #[error("Invalid profile '{name}' in '{path}': {source}")]
    InvalidProfile {
        name: String,
        path: PathBuf,
        source: formcheck_core::Error,
    },

    /// File shape errors
    #[error("Validation failed for '{path}': {reason}")]
    ValidationError { path: PathBuf, reason: String },
}

impl From<std::io::Error> for LoaderError {
    fn from(error: std::io::Error) -> Self {
        Self::IoError {
            path: PathBuf::from("<unknown>"),
            source: error,
        }
    }
}

impl LoaderError {
    /// Create an I/O error with path context
    pub fn io_error(path: PathBuf, error: std::io::Error) -> Self {
        Self::IoError {
            path,
            source: error,
        }
    }

    /// Create a YAML parsing error with path context
    pub fn yaml_parse_error(path: PathBuf, error: serde_yaml::Error) -> Self {
        Self::YamlParseError {
            path,
            source: error,
        }
    }

    /// Create a JSON parsing error with path context
    pub fn json_parse_error(path: PathBuf, error: serde_json::Error) -> Self {
        Self::JsonParseError {
            path,
            source: error,
        }
    }

    /// Create an unsupported format error
    pub fn unsupported_format(path: PathBuf) -> Self {
        Self::UnsupportedFormat { path }
    }

    /// Create a profile-not-found error
    pub fn profile_not_found(name: impl Into<String>, path: PathBuf) -> Self {
        Self::ProfileNotFound {
            name: name.into(),
            path,
        }
    }

    /// Wrap an engine error for one named profile
    pub fn invalid_profile(name: impl Into<String>, path: PathBuf, error: formcheck_core::Error) -> Self {
        Self::InvalidProfile {
            name: name.into(),
            path,
            source: error,
        }
    }

    /// Create a validation error
    pub fn validation_error(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::ValidationError {
            path,
            reason: reason.into(),
        }
    }

    /// Get the path associated with this error
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::IoError { path, .. }
            | Self::YamlParseError { path, .. }
            | Self::JsonParseError { path, .. }
            | Self::UnsupportedFormat { path }
            | Self::ProfileNotFound { path, .. }
            | Self::InvalidProfile { path, .. }
            | Self::ValidationError { path, .. } => path,
        }
    }

    /// Whether the file itself was readable and well-formed
    pub fn is_content_error(&self) -> bool {
        matches!(
            self,
            Self::ProfileNotFound { .. } | Self::InvalidProfile { .. } | Self::ValidationError { .. }
        )
    }
}
