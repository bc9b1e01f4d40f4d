//! Configuration management for the CLI
//!
//! Configuration is read from an explicit `--config` path or the first file
//! found in the default locations:
//! - `.formcheck.{yaml,yml,json,toml}` in the current directory
//! - `formcheck/config.{yaml,json,toml}` in the user config directory
//! - `.formcheck.{yaml,json,toml}` in the home directory
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use formcheck_core::MessageConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Profile file used when `--profiles` is not given
    pub profiles_file: Option<PathBuf>,

    /// Profile used when `--profile` is not given
    pub default_profile: Option<String>,

    /// Message settings merged over each profile's own
    pub messages: Option<MessageConfig>,

    pub output: OutputConfig,

    pub logging: LoggingSection,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format (human, json, json-pretty, yaml)
    pub format: Option<String>,

    /// Always include formatted messages in check output
    pub messages: bool,

    /// Print sensitive-looking values unmasked in human output
    pub show_sensitive: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,
}

impl Config {
    /// Load configuration from a file, choosing the parser by extension
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let config = match path.extension().and_then(|s| s.to_str()) {
            Some("yaml" | "yml") => serde_yaml::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            _ => {
                return Err(Error::InvalidFormat {
                    path: path.to_path_buf(),
                    expected: "YAML, JSON or TOML".to_string(),
                })
            }
        };

        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "ignoring unreadable configuration");
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        match file {
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = ["yaml", "yml", "json", "toml"]
            .iter()
            .map(|ext| PathBuf::from(format!(".formcheck.{}", ext)))
            .collect();

        if let Some(config_dir) = dirs::config_dir() {
            let formcheck_dir = config_dir.join("formcheck");
            for ext in ["yaml", "json", "toml"] {
                paths.push(formcheck_dir.join(format!("config.{}", ext)));
            }
        }

        if let Some(home_dir) = dirs::home_dir() {
            for ext in ["yaml", "json", "toml"] {
                paths.push(home_dir.join(format!(".formcheck.{}", ext)));
            }
        }

        paths
    }

    /// Profile file from the command line, else the configured one
    pub fn profiles_file(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.profiles_file.clone())
            .ok_or_else(|| {
                Error::invalid_args("no profile file given; pass --profiles or set profiles_file in the configuration")
            })
    }

    /// Profile name from the command line, else the configured default
    pub fn profile_name(&self, explicit: Option<&str>) -> Result<String> {
        explicit
            .map(str::to_string)
            .or_else(|| self.default_profile.clone())
            .ok_or_else(|| {
                Error::invalid_args("no profile selected; pass --profile or set default_profile in the configuration")
            })
    }
}
