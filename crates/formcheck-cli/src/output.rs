//! Output formatting and writing utilities
//!
//! Results are written as JSON, pretty JSON, YAML or a human-readable
//! summary. Human output masks sensitive-looking values unless configured
//! otherwise.
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::logging::redaction;
use colored::Colorize;
use formcheck_core::ValidationResults;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};
use tracing::trace;

/// Outcome of one `check` run
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub profile: String,
    pub success: bool,
    #[serde(flatten)]
    pub results: ValidationResults,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<BTreeMap<String, String>>,
}

/// Formatting of serializable values and check reports
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a check report; `redact` masks sensitive values in human output
    fn format_check_report(&self, report: &CheckReport, redact: bool, use_color: bool) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty | OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        }
    }

    fn format_check_report(&self, report: &CheckReport, redact: bool, use_color: bool) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_check_report_human(report, redact, use_color)),
            _ => self.format(report),
        }
    }
}

/// Writes command output to stdout or a supplied writer
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self::with_writer(format, use_color, quiet, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(format: OutputFormat, use_color: bool, quiet: bool, writer: Box<dyn Write>) -> Self {
        Self {
            format,
            use_color,
            quiet,
            writer,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an informational line; human format only, silent when quiet
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        trace!(bytes = formatted.len(), "writing data");

        if self.format == OutputFormat::Yaml {
            self.write(&formatted)
        } else {
            self.writeln(&formatted)
        }
    }

    /// Write a check report
    pub fn check_report(&mut self, report: &CheckReport, redact: bool) -> Result<()> {
        let formatted = self.format.format_check_report(report, redact, self.use_color)?;
        if self.format == OutputFormat::Yaml {
            self.write(&formatted)
        } else {
            self.writeln(&formatted)
        }
    }

    /// Write a table (human format only)
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        let mut widths = headers.iter().map(|h| h.len()).collect::<Vec<_>>();
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let header_row = headers
            .iter()
            .zip(&widths)
            .map(|(h, width)| format!("{:width$}", h, width = *width))
            .collect::<Vec<_>>()
            .join(" │ ");
        if self.use_color {
            self.writeln(&header_row.bold().to_string())?;
        } else {
            self.writeln(&header_row)?;
        }

        let separator = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        self.writeln(&separator)?;

        for row in rows {
            let row_str = row
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:width$}", cell, width = *width))
                .collect::<Vec<_>>()
                .join(" │ ");
            self.writeln(row_str.trim_end())?;
        }

        Ok(())
    }
}

fn section(title: &str, use_color: bool) -> String {
    if use_color {
        format!("=== {} ===", title).bright_blue().to_string()
    } else {
        format!("=== {} ===", title)
    }
}

fn format_check_report_human(report: &CheckReport, redact: bool, use_color: bool) -> String {
    let results = &report.results;
    let mut lines = Vec::new();

    let status = if report.success { "✓ record accepted" } else { "✗ record rejected" };
    let status = match (use_color, report.success) {
        (true, true) => status.green().to_string(),
        (true, false) => status.red().to_string(),
        (false, _) => status.to_string(),
    };
    lines.push(format!("Profile '{}': {}", report.profile, status));

    let valid = if redact {
        redaction::redact_record(results.valid())
    } else {
        results.valid().clone()
    };
    if !valid.is_empty() {
        lines.push(section("Valid", use_color));
        lines.extend(valid.iter().map(|(name, value)| format!("  {}: {}", name, value)));
    }

    if results.has_missing() {
        lines.push(section("Missing", use_color));
        lines.extend(results.missing().iter().map(|name| format!("  {}", name)));
    }

    if results.has_invalid() {
        lines.push(section("Invalid", use_color));
        lines.extend(
            results
                .invalid()
                .iter()
                .map(|(name, failed)| format!("  {}: {}", name, failed.join(", "))),
        );
    }

    if results.has_unknown() {
        lines.push(section("Unknown", use_color));
        lines.extend(results.unknown().iter().map(|name| format!("  {}", name)));
    }

    if let Some(messages) = report.messages.as_ref().filter(|m| !m.is_empty()) {
        lines.push(section("Messages", use_color));
        lines.extend(messages.iter().map(|(key, text)| format!("  {}: {}", key, text)));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests;
