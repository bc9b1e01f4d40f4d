//! End-to-end tests: load profile files and evaluate records against them


use formcheck_core::{evaluate, FieldValue, Record};
use formcheck_profiles::{LoaderError, ProfileLoader};
use test_support::{write_profile_file, SIGNUP_YAML};

fn record(pairs: &[(&str, &str)]) -> Record {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), FieldValue::scalar(*value)))
        .collect()
}

#[test]
fn test_loaded_profile_evaluates() {
    let (_dir, path) = write_profile_file("profiles.yaml", SIGNUP_YAML);
    let mut loader = ProfileLoader::new();
    let profile = loader.load_profile(&path, "signup").unwrap();

    let input = record(&[
        ("email", " ada@example.com "),
        ("name", "ada"),
        ("phone", "12"),
        ("extra", "x"),
    ]);
    let results = evaluate(&profile, &input).unwrap();

    assert_eq!(
        results.valid_value("email"),
        Some(&FieldValue::scalar("ada@example.com"))
    );
    assert_eq!(results.valid_value("name"), Some(&FieldValue::scalar("Ada")));
    assert_eq!(results.invalid_constraints("phone"), Some(&["phone".to_string()][..]));
    assert!(results.is_unknown("extra"));
}

#[test]
fn test_require_some_from_file() {
    let (_dir, path) = write_profile_file("profiles.yaml", SIGNUP_YAML);
    let mut loader = ProfileLoader::new();
    let profile = loader.load_profile(&path, "contact").unwrap();

    let results = evaluate(&profile, &record(&[("note", "hi")])).unwrap();
    assert!(results.is_missing("reach"));

    let results = evaluate(&profile, &record(&[("phone", "555-1234")])).unwrap();
    assert!(results.success());
}

#[test]
fn test_json_and_yaml_files_agree() {
    let json = r#"{"signup": {"required": ["email"], "constraints": {"email": "email"}}}"#;
    let yaml = "signup:\n  required: [email]\n  constraints:\n    email: email\n";
    let (_json_dir, json_path) = write_profile_file("profiles.json", json);
    let (_yaml_dir, yaml_path) = write_profile_file("profiles.yml", yaml);

    let mut loader = ProfileLoader::new();
    let from_json = loader.load_profile(&json_path, "signup").unwrap();
    let from_yaml = loader.load_profile(&yaml_path, "signup").unwrap();

    let input = record(&[("email", "nope")]);
    let json_results = evaluate(&from_json, &input).unwrap();
    let yaml_results = evaluate(&from_yaml, &input).unwrap();
    assert_eq!(json_results.invalid(), yaml_results.invalid());
    assert_eq!(loader.cache_stats().total_entries, 2);
}

#[test]
fn test_unsupported_extension() {
    let (_dir, path) = write_profile_file("profiles.toml", "signup = {}");
    let err = ProfileLoader::new().load(&path).unwrap_err();
    assert!(matches!(err, LoaderError::UnsupportedFormat { .. }));
}

#[test]
fn test_missing_file_reports_path() {
    let (dir, _path) = write_profile_file("profiles.yaml", SIGNUP_YAML);
    let missing = dir.path().join("absent.yaml");
    let err = ProfileLoader::new().load(&missing).unwrap_err();
    assert!(matches!(err, LoaderError::IoError { .. }));
    assert_eq!(err.path(), &missing);
}
