//! Record checking command handler
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

use crate::cli::CheckArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::{CheckReport, OutputWriter};
use formcheck_core::{record_from_json, FormParams, InputSource, Record, Validator};
use formcheck_profiles::ProfileLoader;
use serde_json::Value;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Handle the check command
#[instrument(skip_all, fields(profile = tracing::field::Empty))]
pub fn handle_check(args: CheckArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let path = config.profiles_file(args.profiles.as_deref())?;
    let name = config.profile_name(args.profile.as_deref())?;
    tracing::Span::current().record("profile", name.as_str());
    let timer = Timer::with_details("check_command", &format!("profile: {}", name));

    let profile = ProfileLoader::new().load_profile(&path, &name)?;
    let input = read_record(&args)?;
    info!(fields = input.len(), "record loaded");

    let mut results = Validator::with_builtins().evaluate(&profile, &input)?;
    debug!(elapsed_ms = timer.elapsed().as_millis() as u64, "record evaluated");

    let messages = if args.messages || config.output.messages {
        Some(results.messages(config.messages.as_ref())?)
    } else {
        None
    };

    let report = CheckReport {
        profile: name,
        success: results.success(),
        results,
        messages,
    };
    output.check_report(&report, !config.output.show_sensitive)?;

    if report.success {
        Ok(())
    } else {
        Err(Error::RecordRejected {
            missing: report.results.missing().len(),
            invalid: report.results.invalid().len(),
        })
    }
}

/// Record from the query string, the input file, or stdin
fn read_record(args: &CheckArgs) -> Result<Record> {
    if let Some(query) = &args.query {
        return Ok(FormParams::from_query(query).to_record());
    }

    match args.input.as_deref() {
        Some(path) if path != Path::new("-") => read_record_file(path),
        _ => {
            let mut content = String::new();
            io::stdin().read_to_string(&mut content)?;
            parse_record_text(&content)
        }
    }
}

fn read_record_file(path: &Path) -> Result<Record> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = content.len(), "reading record");

    let value: Value = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml" | "yml") => serde_yaml::from_str(&content)?,
        Some("json") => serde_json::from_str(&content)?,
        _ => {
            return Err(Error::InvalidFormat {
                path: path.to_path_buf(),
                expected: "JSON or YAML".to_string(),
            })
        }
    };
    Ok(record_from_json(&value)?)
}

/// JSON first, then YAML
fn parse_record_text(content: &str) -> Result<Record> {
    let value: Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(_) => serde_yaml::from_str(content)?,
    };
    Ok(record_from_json(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use formcheck_core::FieldValue;
    use std::path::PathBuf;
    use tempfile::{tempdir, TempDir};

    const PROFILES: &str = r#"
signup:
  required: [email]
  optional: [name, toppings]
  field_filters:
    name: ucfirst
  constraints:
    email: email
"#;

    fn fixture() -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profiles.yaml");
        fs::write(&path, PROFILES).unwrap();
        (dir, path)
    }

    fn args(profiles: &Path, input: Option<PathBuf>, query: Option<&str>) -> CheckArgs {
        CheckArgs {
            input,
            profiles: Some(profiles.to_path_buf()),
            profile: Some("signup".to_string()),
            query: query.map(str::to_string),
            messages: false,
        }
    }

    fn quiet_output() -> OutputWriter {
        OutputWriter::with_writer(OutputFormat::Json, false, true, Box::new(io::sink()))
    }

    #[test]
    fn test_query_input_accepted() {
        let (_dir, profiles) = fixture();
        let args = args(&profiles, None, Some("email=ada%40example.com&toppings=a&toppings=b"));

        let record = read_record(&args).unwrap();
        assert_eq!(record["toppings"], FieldValue::list(["a", "b"]));

        handle_check(args, &Config::default(), &mut quiet_output()).unwrap();
    }

    #[test]
    fn test_rejected_record_is_error() {
        let (dir, profiles) = fixture();
        let input = dir.path().join("record.json");
        fs::write(&input, r#"{"email": "nope", "name": "ada"}"#).unwrap();

        let err = handle_check(args(&profiles, Some(input), None), &Config::default(), &mut quiet_output())
            .unwrap_err();
        assert!(matches!(err, Error::RecordRejected { missing: 0, invalid: 1 }));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_yaml_record_file() {
        let (dir, _profiles) = fixture();
        let input = dir.path().join("record.yml");
        fs::write(&input, "email: ada@example.com\ntoppings: [a, b]\nage: 36\n").unwrap();

        let record = read_record_file(&input).unwrap();
        assert_eq!(record["email"], FieldValue::scalar("ada@example.com"));
        assert_eq!(record["age"], FieldValue::scalar("36"));
        assert!(record["toppings"].is_list());
    }

    #[test]
    fn test_unknown_profile_name() {
        let (_dir, profiles) = fixture();
        let mut args = args(&profiles, None, Some("email=a@b.co"));
        args.profile = Some("checkout".to_string());

        let err = handle_check(args, &Config::default(), &mut quiet_output()).unwrap_err();
        assert!(matches!(err, Error::Loader(_)));
    }

    #[test]
    fn test_record_text_fallback_to_yaml() {
        let record = parse_record_text("email: ada@example.com\n").unwrap();
        assert_eq!(record["email"], FieldValue::scalar("ada@example.com"));

        let record = parse_record_text(r#"{"email": "x"}"#).unwrap();
        assert_eq!(record.len(), 1);

        assert!(matches!(parse_record_text("[1, 2]"), Err(Error::Core(_))));
    }

    #[test]
    fn test_unsupported_record_extension() {
        let (dir, _profiles) = fixture();
        let input = dir.path().join("record.txt");
        fs::write(&input, "email=x").unwrap();
        assert!(matches!(read_record_file(&input), Err(Error::InvalidFormat { .. })));
    }
}
