//! Benchmarks for profile evaluation
//!
//! Measures the evaluation pipeline for small and wide records, the cost of
//! regexp-driven rules, and profile parsing from JSON.
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use formcheck_core::{FieldValue, Profile, Record, Registry, Validator};
use serde_json::{json, Value};
use std::sync::Arc;

fn signup_profile_json() -> Value {
    json!({
        "required": ["email", "first_name", "last_name"],
        "optional": ["phone", "zip", "state"],
        "filters": ["trim"],
        "field_filters": { "first_name": "ucfirst", "last_name": "ucfirst" },
        "constraints": {
            "email": "email",
            "zip": "zip",
            "state": "state",
            "phone": ["phone", { "constraint": "length_between", "params": [7, 20] }]
        },
        "untaint_all_constraints": true
    })
}

fn signup_record() -> Record {
    let mut input = Record::new();
    input.insert("email".into(), FieldValue::scalar(" user@example.com "));
    input.insert("first_name".into(), FieldValue::scalar("ada"));
    input.insert("last_name".into(), FieldValue::scalar("lovelace"));
    input.insert("phone".into(), FieldValue::scalar("555-123-4567"));
    input.insert("zip".into(), FieldValue::scalar("02134"));
    input.insert("state".into(), FieldValue::scalar("MA"));
    input.insert("referrer".into(), FieldValue::scalar("newsletter"));
    input
}

fn wide_record(fields: usize) -> Record {
    (0..fields)
        .map(|i| (format!("item_{}", i), FieldValue::scalar(format!(" {} ", i))))
        .collect()
}

fn wide_profile() -> Profile {
    Profile::builder()
        .optional_regexp("/^item_/")
        .filter("trim")
        .constraint_regexp("/^item_/", "/^[0-9]+$/")
        .build()
}

fn bench_signup(c: &mut Criterion) {
    let validator = Validator::with_builtins();
    let profile = match Profile::from_value(&signup_profile_json()) {
        Ok(profile) => profile,
        Err(e) => panic!("benchmark profile rejected: {}", e),
    };
    let input = signup_record();

    c.bench_function("evaluate_signup", |b| {
        b.iter(|| validator.evaluate(black_box(&profile), black_box(&input)))
    });
}

fn bench_wide_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("wide_records");
    let validator = Validator::new(Arc::new(Registry::with_builtins()));
    let profile = wide_profile();

    for size in [10usize, 100, 1000] {
        let input = wide_record(size);
        group.bench_with_input(BenchmarkId::new("regexp_rules", size), &input, |b, input| {
            b.iter(|| validator.evaluate(black_box(&profile), black_box(input)))
        });
    }

    group.finish();
}

fn bench_profile_parsing(c: &mut Criterion) {
    let value = signup_profile_json();

    c.bench_function("profile_from_value", |b| {
        b.iter(|| Profile::from_value(black_box(&value)))
    });
}

criterion_group!(benches, bench_signup, bench_wide_records, bench_profile_parsing);
criterion_main!(benches);
