//! Conversion from JSON-shaped profile data
//!
//! Profile data uses plain strings wherever it can: filter and constraint
//! names, delimited patterns (`/^addr_/i`) and field-name params. Structured
//! constraints are objects with a `constraint` (or `constraint_method`) key.
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

use super::constraint::{ConstraintSpec, Param, StructuredConstraint};
use super::{Dependency, FilterSpec, Profile, RequireSome};
use crate::input::record_from_json;
use crate::messages::MessageConfig;
use crate::pattern::FieldPattern;
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Every option key a profile may carry
pub const KNOWN_PROFILE_KEYS: &[&str] = &[
    "constraint_method_regexp_map",
    "constraint_methods",
    "constraint_regexp_map",
    "constraints",
    "defaults",
    "dependencies",
    "dependency_groups",
    "field_filter_regexp_map",
    "field_filters",
    "filters",
    "missing_optional_valid",
    "msgs",
    "optional",
    "optional_regexp",
    "require_some",
    "required",
    "required_regexp",
    "untaint_all_constraints",
    "untaint_constraint_fields",
    "untaint_regexp_map",
    "validator_packages",
];

const STRUCTURED_KEYS: &[&str] = &["constraint", "constraint_method", "name", "params", "is_method"];

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

fn many<T>(value: Option<OneOrMany<T>>) -> Vec<T> {
    value.map(OneOrMany::into_vec).unwrap_or_default()
}

/// Boolean option, also accepting 0/1 and "0"/"1"
#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Flag {
    fn is_set(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(n) => *n != 0,
            Self::Text(s) => !(s.is_empty() || s == "0"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDependency {
    Fields(OneOrMany<String>),
    ByValue(BTreeMap<String, OneOrMany<String>>),
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawProfile {
    required: Option<OneOrMany<String>>,
    optional: Option<OneOrMany<String>>,
    required_regexp: Option<FieldPattern>,
    optional_regexp: Option<FieldPattern>,
    require_some: BTreeMap<String, Vec<Value>>,
    dependencies: BTreeMap<String, RawDependency>,
    dependency_groups: BTreeMap<String, Vec<String>>,
    defaults: Option<Map<String, Value>>,
    filters: Option<OneOrMany<String>>,
    field_filters: BTreeMap<String, OneOrMany<String>>,
    field_filter_regexp_map: BTreeMap<String, OneOrMany<String>>,
    constraints: BTreeMap<String, Value>,
    constraint_methods: BTreeMap<String, Value>,
    constraint_regexp_map: BTreeMap<String, Value>,
    constraint_method_regexp_map: BTreeMap<String, Value>,
    untaint_all_constraints: Option<Flag>,
    untaint_constraint_fields: Option<OneOrMany<String>>,
    untaint_regexp_map: Option<OneOrMany<FieldPattern>>,
    missing_optional_valid: Option<Flag>,
    validator_packages: Option<OneOrMany<String>>,
    msgs: MessageConfig,
}

/// Check option keys, then convert profile data into a [`Profile`]
pub(crate) fn profile_from_value(value: &Value) -> Result<Profile> {
    let object = value
        .as_object()
        .ok_or_else(|| Error::invalid_profile("profile must be a mapping of options"))?;

    if let Some(key) = object
        .keys()
        .find(|key| !KNOWN_PROFILE_KEYS.contains(&key.as_str()))
    {
        return Err(Error::UnknownProfileKey { key: key.clone() });
    }

    let raw: RawProfile = serde_json::from_value(value.clone())
        .map_err(|e| Error::invalid_profile(e.to_string()))?;

    let mut constraints = parse_constraint_map(raw.constraints, false)?;
    for (field, specs) in parse_constraint_map(raw.constraint_methods, true)? {
        constraints.entry(field).or_default().extend(specs);
    }

    let mut constraint_regexp_map = parse_constraint_regexp_map(raw.constraint_regexp_map, false)?;
    constraint_regexp_map.extend(parse_constraint_regexp_map(
        raw.constraint_method_regexp_map,
        true,
    )?);

    let require_some = raw
        .require_some
        .into_iter()
        .map(|(group, items)| {
            let items = items
                .iter()
                .map(|item| scalar_text(item, "require_some"))
                .collect::<Result<Vec<_>>>()?;
            Ok((group, RequireSome::from_list(items)))
        })
        .collect::<Result<BTreeMap<_, _>>>()?;

    let dependencies = raw
        .dependencies
        .into_iter()
        .map(|(field, dep)| {
            let dep = match dep {
                RawDependency::Fields(fields) => Dependency::Fields(fields.into_vec()),
                RawDependency::ByValue(map) => Dependency::ByValue(
                    map.into_iter()
                        .map(|(value, fields)| (value, fields.into_vec()))
                        .collect(),
                ),
            };
            (field, dep)
        })
        .collect();

    let defaults = match raw.defaults {
        Some(map) => record_from_json(&Value::Object(map))
            .map_err(|e| Error::invalid_profile(format!("defaults: {}", e)))?,
        None => BTreeMap::new(),
    };

    Ok(Profile {
        required: many(raw.required),
        optional: many(raw.optional),
        required_regexp: raw.required_regexp,
        optional_regexp: raw.optional_regexp,
        require_some,
        dependencies,
        dependency_groups: raw.dependency_groups,
        defaults,
        filters: named_filters(many(raw.filters)),
        field_filters: raw
            .field_filters
            .into_iter()
            .map(|(field, names)| (field, named_filters(names.into_vec())))
            .collect(),
        field_filter_regexp_map: raw
            .field_filter_regexp_map
            .into_iter()
            .map(|(pattern, names)| (FieldPattern::legacy(pattern), named_filters(names.into_vec())))
            .collect(),
        constraints,
        constraint_regexp_map,
        untaint_all_constraints: raw.untaint_all_constraints.is_some_and(|f| f.is_set()),
        untaint_constraint_fields: many(raw.untaint_constraint_fields),
        untaint_regexp_map: many(raw.untaint_regexp_map),
        missing_optional_valid: raw.missing_optional_valid.is_some_and(|f| f.is_set()),
        validator_packages: many(raw.validator_packages),
        msgs: raw.msgs,
    })
}

fn named_filters(names: Vec<String>) -> Vec<FilterSpec> {
    names.into_iter().map(FilterSpec::Named).collect()
}

fn scalar_text(value: &Value, option: &str) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(if *b { "1" } else { "0" }.to_string()),
        other => Err(Error::invalid_profile(format!(
            "{}: expected a string or number, found {}",
            option, other
        ))),
    }
}

fn parse_constraint_map(
    map: BTreeMap<String, Value>,
    as_method: bool,
) -> Result<BTreeMap<String, Vec<ConstraintSpec>>> {
    map.into_iter()
        .map(|(field, value)| Ok((field, parse_constraint_list(&value, as_method)?)))
        .collect()
}

fn parse_constraint_regexp_map(
    map: BTreeMap<String, Value>,
    as_method: bool,
) -> Result<Vec<(FieldPattern, Vec<ConstraintSpec>)>> {
    map.into_iter()
        .map(|(pattern, value)| {
            Ok((
                FieldPattern::legacy(pattern),
                parse_constraint_list(&value, as_method)?,
            ))
        })
        .collect()
}

/// One constraint or an ordered list of them
pub(crate) fn parse_constraint_list(value: &Value, as_method: bool) -> Result<Vec<ConstraintSpec>> {
    let specs = match value {
        Value::Array(items) => items
            .iter()
            .map(parse_constraint)
            .collect::<Result<Vec<_>>>()?,
        other => vec![parse_constraint(other)?],
    };

    Ok(if as_method {
        specs.into_iter().map(ConstraintSpec::as_method).collect()
    } else {
        specs
    })
}

fn parse_constraint(value: &Value) -> Result<ConstraintSpec> {
    match value {
        Value::String(text) => Ok(ConstraintSpec::parse(text)),
        Value::Object(object) => parse_structured(object),
        other => Err(Error::invalid_profile(format!(
            "constraint must be a name, pattern or structured constraint, found {}",
            other
        ))),
    }
}

fn parse_structured(object: &Map<String, Value>) -> Result<ConstraintSpec> {
    if let Some(key) = object
        .keys()
        .find(|key| !STRUCTURED_KEYS.contains(&key.as_str()))
    {
        return Err(Error::invalid_profile(format!(
            "unknown structured constraint key '{}'",
            key
        )));
    }

    let (inner, forced_method) = match (object.get("constraint"), object.get("constraint_method")) {
        (Some(Value::String(text)), None) => (ConstraintSpec::parse(text), None),
        (None, Some(Value::String(name))) => (ConstraintSpec::named(name.as_str()), Some(true)),
        (Some(_), Some(_)) => {
            return Err(Error::invalid_profile(
                "structured constraint has both 'constraint' and 'constraint_method'",
            ))
        }
        (None, None) => {
            return Err(Error::invalid_profile(
                "structured constraint needs 'constraint' or 'constraint_method'",
            ))
        }
        _ => {
            return Err(Error::invalid_profile(
                "'constraint' must be a name or pattern string",
            ))
        }
    };

    let name = match object.get("name") {
        None | Some(Value::Null) => None,
        Some(Value::String(name)) => Some(name.clone()),
        Some(other) => {
            return Err(Error::invalid_profile(format!(
                "constraint name must be a string, found {}",
                other
            )))
        }
    };

    let display_name = name.clone().unwrap_or_else(|| inner.declared_name());
    let params = match object.get("params") {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .map(|item| parse_param(item, &display_name))
                .collect::<Result<Vec<_>>>()?,
        ),
        Some(_) => {
            return Err(Error::invalid_params(display_name, "params must be a list"));
        }
    };

    let is_method = match object.get("is_method") {
        None | Some(Value::Null) => forced_method,
        Some(value) => {
            let flag: Flag = serde_json::from_value(value.clone())
                .map_err(|e| Error::invalid_profile(format!("is_method: {}", e)))?;
            Some(flag.is_set() || forced_method.unwrap_or(false))
        }
    };

    Ok(ConstraintSpec::Structured(StructuredConstraint {
        constraint: Box::new(inner),
        name,
        params,
        is_method,
    }))
}

fn parse_param(value: &Value, constraint: &str) -> Result<Param> {
    match value {
        Value::String(field) => Ok(Param::Field(field.clone())),
        Value::Number(n) => Ok(Param::Literal(n.to_string())),
        Value::Bool(b) => Ok(Param::Literal(if *b { "1" } else { "0" }.to_string())),
        Value::Object(object) if object.len() == 1 => {
            match (object.get("literal"), object.get("field")) {
                (Some(literal), None) => Ok(Param::Literal(scalar_text(literal, "params")?)),
                (None, Some(Value::String(field))) => Ok(Param::Field(field.clone())),
                _ => Err(Error::invalid_params(
                    constraint,
                    "param objects take a single 'literal' or 'field' key",
                )),
            }
        }
        other => Err(Error::invalid_params(
            constraint,
            format!("unsupported param {}", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_key_rejected() {
        let err = Profile::from_value(&json!({"required": ["a"], "requried": ["b"]})).unwrap_err();
        match err {
            Error::UnknownProfileKey { key } => assert_eq!(key, "requried"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_scalar_or_list_options() {
        let profile = Profile::from_value(&json!({
            "required": "email",
            "optional": ["name", "phone"],
            "filters": "trim",
            "missing_optional_valid": 1,
        }))
        .unwrap();

        assert_eq!(profile.required, vec!["email"]);
        assert_eq!(profile.optional.len(), 2);
        assert_eq!(profile.filters.len(), 1);
        assert!(profile.missing_optional_valid);
        assert!(!profile.untaint_all_constraints);
    }

    #[test]
    fn test_require_some_with_numeric_count() {
        let profile = Profile::from_value(&json!({
            "require_some": {"contact": [2, "email", "phone", "fax"]}
        }))
        .unwrap();

        let group = &profile.require_some["contact"];
        assert_eq!(group.minimum, 2);
        assert_eq!(group.members, vec!["email", "phone", "fax"]);
    }

    #[test]
    fn test_dependency_forms() {
        let profile = Profile::from_value(&json!({
            "dependencies": {
                "cc_no": ["cc_type", "cc_exp"],
                "pay_type": {"check": "check_no", "card": ["cc_no", "cc_exp"]},
            }
        }))
        .unwrap();

        assert!(matches!(profile.dependencies["cc_no"], Dependency::Fields(_)));
        assert!(matches!(profile.dependencies["pay_type"], Dependency::ByValue(_)));
    }

    #[test]
    fn test_structured_constraint() {
        let profile = Profile::from_value(&json!({
            "constraints": {
                "cc_no": {
                    "constraint": "cc_number",
                    "name": "card",
                    "params": ["cc_no", "cc_type", {"literal": "strict"}],
                },
                "zip": ["zip", "/^\\d{5}$/"],
            }
        }))
        .unwrap();

        match &profile.constraints["cc_no"][0] {
            ConstraintSpec::Structured(s) => {
                assert_eq!(s.name.as_deref(), Some("card"));
                let params = s.params.as_ref().unwrap();
                assert_eq!(params[0], Param::field("cc_no"));
                assert_eq!(params[2], Param::literal("strict"));
            }
            other => panic!("unexpected constraint: {other:?}"),
        }
        assert_eq!(profile.constraints["zip"].len(), 2);
    }

    #[test]
    fn test_params_must_be_a_list() {
        let err = Profile::from_value(&json!({
            "constraints": {"pw": {"constraint": "min_length", "params": {"len": 8}}}
        }))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidParams { .. }));
    }

    #[test]
    fn test_constraint_methods_are_methods() {
        let profile = Profile::from_value(&json!({
            "constraints": {"pw": "min_length"},
            "constraint_methods": {"pw": "max_length"},
        }))
        .unwrap();

        let specs = &profile.constraints["pw"];
        assert_eq!(specs.len(), 2);
        match &specs[1] {
            ConstraintSpec::Structured(s) => assert_eq!(s.is_method, Some(true)),
            other => panic!("unexpected constraint: {other:?}"),
        }
    }

    #[test]
    fn test_regexp_maps_and_messages() {
        let profile = Profile::from_value(&json!({
            "field_filter_regexp_map": {"/_name$/": "ucfirst"},
            "constraint_regexp_map": {"/_zip$/": "zip"},
            "untaint_regexp_map": "/^cc_/",
            "msgs": {"any_errors": "err__", "format": "%s"},
        }))
        .unwrap();

        assert_eq!(profile.field_filter_regexp_map[0].0.source(), "/_name$/");
        assert_eq!(profile.constraint_regexp_map.len(), 1);
        assert_eq!(profile.untaint_regexp_map.len(), 1);
        assert_eq!(profile.msgs.any_errors.as_deref(), Some("err__"));
    }

    #[test]
    fn test_defaults_and_non_object_profile() {
        let profile = Profile::from_value(&json!({"defaults": {"country": "US", "qty": 1}})).unwrap();
        assert_eq!(profile.defaults["qty"], crate::FieldValue::scalar("1"));

        assert!(Profile::from_value(&json!(["required"])).is_err());
    }
}
