//! Command-line interface argument parsing and definitions
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Formcheck - check form-like records against declarative validation profiles
///
/// Classifies every field of a record as valid, missing, invalid or unknown
/// according to a named profile loaded from a YAML or JSON profile file.
#[derive(Parser, Debug)]
#[command(
    name = "formcheck",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "FORMCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results [default: human, or the configured format]
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a record against a named profile
    Check(CheckArgs),

    /// List the profiles defined in a profile file
    Profiles(ProfilesArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Record to check (JSON or YAML); reads stdin when omitted or "-"
    #[arg(value_name = "INPUT", conflicts_with = "query")]
    pub input: Option<PathBuf>,

    /// Profile file (YAML or JSON)
    #[arg(short, long, value_name = "FILE")]
    pub profiles: Option<PathBuf>,

    /// Name of the profile to apply
    #[arg(short = 'n', long, value_name = "NAME")]
    pub profile: Option<String>,

    /// Read the record from an urlencoded query string instead
    #[arg(long, value_name = "QUERY")]
    pub query: Option<String>,

    /// Include formatted error messages in the output
    #[arg(short, long)]
    pub messages: bool,
}

/// Arguments for the profiles command
#[derive(Parser, Debug)]
pub struct ProfilesArgs {
    /// Profile file to list; defaults to the configured profiles file
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }

    /// Command-line format, then the configured one, then human
    pub fn output_format(&self, configured: Option<&str>) -> OutputFormat {
        self.output
            .or_else(|| configured.and_then(|name| OutputFormat::from_str(name, true).ok()))
            .unwrap_or(OutputFormat::Human)
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_check_arguments() {
        let cli = Cli::parse_from([
            "formcheck", "-vv", "check", "--profiles", "p.yaml", "-n", "signup", "record.json",
        ]);
        assert_eq!(cli.verbosity_level(), 2);
        match cli.command {
            Commands::Check(args) => {
                assert_eq!(args.profiles, Some(PathBuf::from("p.yaml")));
                assert_eq!(args.profile.as_deref(), Some("signup"));
                assert_eq!(args.input, Some(PathBuf::from("record.json")));
                assert!(!args.messages);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_query_conflicts_with_input() {
        let result = Cli::try_parse_from([
            "formcheck", "check", "record.json", "--query", "a=1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_output_format_resolution() {
        let cli = Cli::parse_from(["formcheck", "profiles"]);
        assert_eq!(cli.output_format(None), OutputFormat::Human);
        assert_eq!(cli.output_format(Some("json-pretty")), OutputFormat::JsonPretty);
        assert_eq!(cli.output_format(Some("bogus")), OutputFormat::Human);

        let cli = Cli::parse_from(["formcheck", "-o", "yaml", "profiles"]);
        assert_eq!(cli.output_format(Some("json")), OutputFormat::Yaml);
    }

    #[test]
    fn test_quiet_overrides_verbosity() {
        let cli = Cli::parse_from(["formcheck", "--quiet", "profiles"]);
        assert!(cli.quiet);
        assert_eq!(cli.verbosity_level(), 0);
    }
}
