//! Profile-file parsing for YAML and JSON formats
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use serde_json::{Map, Value};
use std::path::Path;

/// Supported profile-file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML format (.yaml, .yml)
    Yaml,
    /// JSON format (.json)
    Json,
}

impl Format {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> LoaderResult<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            _ => Err(LoaderError::unsupported_format(path.to_path_buf())),
        }
    }

    /// Get the primary file extension for this format
    pub fn primary_extension(&self) -> &'static str {
        match self {
            Format::Yaml => "yaml",
            Format::Json => "json",
        }
    }
}

/// Parser turning profile files into JSON-shaped profile maps
#[derive(Debug, Default)]
pub struct ProfileParser;

impl ProfileParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    /// Parse a profile file, detecting format from extension
    pub fn parse_file(&self, path: &Path) -> LoaderResult<Map<String, Value>> {
        let format = Format::from_path(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| LoaderError::io_error(path.to_path_buf(), e))?;

        self.parse_content(&content, format, path)
    }

    /// Parse profile-file content with an explicit format
    pub fn parse_content(
        &self,
        content: &str,
        format: Format,
        path: &Path,
    ) -> LoaderResult<Map<String, Value>> {
        let value = match format {
            Format::Yaml => self.parse_yaml(content, path)?,
            Format::Json => self.parse_json(content, path)?,
        };
        self.validate_structure(value, path)
    }

    /// Parse YAML content
    pub fn parse_yaml(&self, content: &str, path: &Path) -> LoaderResult<Value> {
        let yaml_value: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| LoaderError::yaml_parse_error(path.to_path_buf(), e))?;

        serde_json::to_value(yaml_value)
            .map_err(|e| LoaderError::json_parse_error(path.to_path_buf(), e))
    }

    /// Parse JSON content
    pub fn parse_json(&self, content: &str, path: &Path) -> LoaderResult<Value> {
        serde_json::from_str(content).map_err(|e| LoaderError::json_parse_error(path.to_path_buf(), e))
    }

    /// The root must map profile names to profile objects
    fn validate_structure(&self, value: Value, path: &Path) -> LoaderResult<Map<String, Value>> {
        let Value::Object(profiles) = value else {
            return Err(LoaderError::validation_error(
                path.to_path_buf(),
                "Profile file must map profile names to profile definitions",
            ));
        };

        if let Some((name, _)) = profiles.iter().find(|(_, definition)| !definition.is_object()) {
            return Err(LoaderError::validation_error(
                path.to_path_buf(),
                format!("Profile '{}' must be a mapping of profile options", name),
            ));
        }

        Ok(profiles)
    }
}
