//! Formcheck CLI - check form-like records against validation profiles
//!
//! Entry point for the `formcheck` binary: checks records against named
//! profiles, lists the profiles in a file and generates shell completions.
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;

fn main() {
    let cli = Cli::parse_args();
    control::set_override(cli.use_color());

    let config = match Config::load_with_file(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => exit_with(&e, cli.quiet),
    };

    if let Err(e) = init_logging(&cli, &config) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let quiet = cli.quiet;
    if let Err(e) = run(cli, &config) {
        exit_with(&e, quiet);
    }
}

fn exit_with(e: &error::Error, quiet: bool) -> ! {
    if !(quiet && e.is_rejection()) {
        eprintln!("{}", error::format_error(e, control::SHOULD_COLORIZE.should_colorize()));
    }
    if e.should_show_help() {
        eprintln!("\nFor more information, try '--help'");
    }
    process::exit(e.exit_code());
}

/// Main application logic
#[instrument(skip_all, fields(command = ?cli.command))]
fn run(cli: Cli, config: &Config) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let format = cli.output_format(config.output.format.as_deref());
    let mut output = OutputWriter::new(format, cli.use_color(), cli.quiet);

    tracing::info!(command = ?cli.command, verbosity = cli.verbosity_level(), "executing command");

    match cli.command {
        Commands::Check(args) => handlers::handle_check(args, config, &mut output),
        Commands::Profiles(args) => handlers::handle_profiles(args, config, &mut output),
        Commands::Completions(args) => handlers::handle_completions(args),
    }
}

/// Initialize the logging system from verbosity, the config file and the environment
fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());
    // -v flags take precedence over the configured section
    if cli.verbosity_level() == 0 {
        logging_config.apply_section(&config.logging);
    }
    logging_config.merge_with_env();

    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}
