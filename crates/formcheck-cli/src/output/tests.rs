// Tests for check-report formatting and the output writer

use super::*;
use formcheck_core::{evaluate, FieldValue, Profile, Record};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

fn sample_report(with_messages: bool) -> CheckReport {
    let profile = Profile::builder()
        .required(["email", "name"])
        .optional(["password", "phone"])
        .constraint("phone", "phone")
        .build();

    let mut input = Record::new();
    input.insert("email".into(), FieldValue::scalar("ada@example.com"));
    input.insert("password".into(), FieldValue::scalar("hunter2"));
    input.insert("phone".into(), FieldValue::scalar("12"));
    input.insert("extra".into(), FieldValue::scalar("x"));

    let mut results = evaluate(&profile, &input).unwrap();
    let messages = if with_messages {
        Some(results.messages(None).unwrap())
    } else {
        None
    };

    CheckReport {
        profile: "signup".to_string(),
        success: results.success(),
        results,
        messages,
    }
}

fn writer(format: OutputFormat) -> (OutputWriter, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let writer = OutputWriter::with_writer(format, false, false, Box::new(buffer.clone()));
    (writer, buffer)
}

#[test]
fn test_human_report_sections() {
    let (mut out, buffer) = writer(OutputFormat::Human);
    out.check_report(&sample_report(false), true).unwrap();
    let text = buffer.contents();

    assert!(text.starts_with("Profile 'signup': ✗ record rejected"));
    assert!(text.contains("=== Valid ===\n  email: ada@example.com\n  password: ***"));
    assert!(text.contains("=== Missing ===\n  name"));
    assert!(text.contains("=== Invalid ===\n  phone: phone"));
    assert!(text.contains("=== Unknown ===\n  extra"));
    assert!(!text.contains("hunter2"));
    assert!(!text.contains("=== Messages ==="));
}

#[test]
fn test_human_report_unredacted() {
    let (mut out, buffer) = writer(OutputFormat::Human);
    out.check_report(&sample_report(false), false).unwrap();
    assert!(buffer.contents().contains("password: hunter2"));
}

#[test]
fn test_human_report_messages() {
    let (mut out, buffer) = writer(OutputFormat::Human);
    out.check_report(&sample_report(true), true).unwrap();
    let text = buffer.contents();
    assert!(text.contains("=== Messages ==="));
    assert!(text.contains("  name: "));
    assert!(text.contains("Missing"));
}

#[test]
fn test_json_report_is_unredacted_data() {
    let (mut out, buffer) = writer(OutputFormat::Json);
    out.check_report(&sample_report(false), true).unwrap();

    let value: serde_json::Value = serde_json::from_str(buffer.contents().trim()).unwrap();
    assert_eq!(value["profile"], "signup");
    assert_eq!(value["success"], false);
    assert_eq!(value["valid"]["password"], "hunter2");
    assert_eq!(value["missing"][0], "name");
    assert_eq!(value["invalid"]["phone"][0], "phone");
    assert_eq!(value["unknown"][0], "extra");
    assert!(value.get("messages").is_none());
}

#[test]
fn test_yaml_report() {
    let (mut out, buffer) = writer(OutputFormat::Yaml);
    out.check_report(&sample_report(true), true).unwrap();

    let value: serde_yaml::Value = serde_yaml::from_str(&buffer.contents()).unwrap();
    assert_eq!(value["profile"], serde_yaml::Value::from("signup"));
    assert!(value["messages"].is_mapping());
}

#[test]
fn test_table_layout() {
    let (mut out, buffer) = writer(OutputFormat::Human);
    out.table(
        &["NAME", "REQUIRED"],
        vec![
            vec!["signup".to_string(), "2".to_string()],
            vec!["contact_form".to_string(), "0".to_string()],
        ],
    )
    .unwrap();

    let lines: Vec<String> = buffer.contents().lines().map(str::to_string).collect();
    assert_eq!(lines[0], "NAME         │ REQUIRED");
    assert_eq!(lines[2], "signup       │ 2");
    assert_eq!(lines[3], "contact_form │ 0");
}

#[test]
fn test_table_and_info_skipped_for_machine_formats() {
    let (mut out, buffer) = writer(OutputFormat::Json);
    out.info("loading").unwrap();
    out.table(&["NAME"], vec![vec!["signup".to_string()]]).unwrap();
    assert!(buffer.contents().is_empty());
}
