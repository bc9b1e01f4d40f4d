//! Constraint compilation and evaluation
//!
//! Every constraint the profile declares is compiled before the working set
//! is touched, so an unknown name or a bad pattern aborts the evaluation even
//! when the field it belongs to was never submitted.
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

use crate::callable::{param_str, ConstraintFn, MethodFn, PlainFn};
use crate::context::ConstraintContext;
use crate::input::{InputSource, Record};
use crate::pattern::matching_fields;
use crate::profile::{ConstraintSpec, Param, Profile, ANONYMOUS_CONSTRAINT};
use crate::registry::Registry;
use crate::{FieldValue, ParamValue, Result, Verdict};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

#[derive(Clone)]
enum Callable {
    Pattern(Regex),
    Plain(PlainFn),
    Method(MethodFn),
}

/// A constraint resolved to something invocable
#[derive(Clone)]
pub(super) struct CompiledConstraint {
    name: String,
    callable: Callable,
    params: Option<Vec<Param>>,
}

impl CompiledConstraint {
    pub(super) fn compile(spec: &ConstraintSpec, registry: &Registry) -> Result<Self> {
        match spec {
            ConstraintSpec::Named(name) => Ok(Self {
                name: name.clone(),
                callable: Callable::from(registry.constraint(name)?),
                params: None,
            }),
            ConstraintSpec::Pattern(pattern) => Ok(Self {
                name: pattern.source().to_string(),
                callable: Callable::Pattern(pattern.compile()?),
                params: None,
            }),
            ConstraintSpec::Callable { name, func } => Ok(Self {
                name: name.clone().unwrap_or_else(|| ANONYMOUS_CONSTRAINT.to_string()),
                callable: Callable::from(func.clone()),
                params: None,
            }),
            ConstraintSpec::Structured(structured) => {
                let mut compiled = Self::compile(&structured.constraint, registry)?;
                if let Some(name) = &structured.name {
                    compiled.name = name.clone();
                }
                if let Some(params) = &structured.params {
                    compiled.params = Some(params.clone());
                }
                if structured.is_method == Some(true) && !matches!(compiled.callable, Callable::Method(_)) {
                    trace!(constraint = %compiled.name, "method flag ignored; constraint takes no context");
                }
                Ok(compiled)
            }
        }
    }

    /// Resolve declared params against the working set as it is now
    fn resolve_params(&self, field: &str, element: &str, working: &Record) -> Vec<ParamValue> {
        match &self.params {
            None => match self.callable {
                Callable::Method(_) => Vec::new(),
                _ => vec![Some(FieldValue::scalar(element))],
            },
            Some(params) => params
                .iter()
                .map(|param| match param {
                    Param::Field(name) if name == field => Some(FieldValue::scalar(element)),
                    Param::Field(name) => working.get(name).cloned(),
                    Param::Literal(value) => Some(FieldValue::scalar(value.as_str())),
                })
                .collect(),
        }
    }

    /// Run against one element; also returns a failure name set by a method
    fn invoke(
        &self,
        field: &str,
        element: &str,
        input: &dyn InputSource,
        classified: &BTreeSet<String>,
        working: &mut Record,
    ) -> Result<(Verdict, Option<String>)> {
        let params = self.resolve_params(field, element, working);
        match &self.callable {
            Callable::Pattern(regex) => {
                let subject = param_str(&params, 0).unwrap_or_default();
                let verdict = match regex.find(subject) {
                    Some(m) if !m.as_str().is_empty() => Verdict::Matched(m.as_str().to_string()),
                    _ => Verdict::Rejected,
                };
                Ok((verdict, None))
            }
            Callable::Plain(f) => Ok((f(&params)?, None)),
            Callable::Method(f) => {
                let mut ctx =
                    ConstraintContext::new(field, element, input, working).with_classified(classified);
                let verdict = f(&mut ctx, &params)?;
                Ok((verdict, ctx.take_constraint_name()))
            }
        }
    }
}

impl From<ConstraintFn> for Callable {
    fn from(func: ConstraintFn) -> Self {
        match func {
            ConstraintFn::Plain(f) => Self::Plain(f),
            ConstraintFn::Method(f) => Self::Method(f),
        }
    }
}

/// All constraints of a profile, compiled
pub(super) struct ConstraintPlan {
    by_field: BTreeMap<String, Vec<CompiledConstraint>>,
    by_pattern: Vec<(Regex, Vec<CompiledConstraint>)>,
}

impl ConstraintPlan {
    pub(super) fn compile(profile: &Profile, registry: &Registry) -> Result<Self> {
        let compile_all = |specs: &[ConstraintSpec]| {
            specs
                .iter()
                .map(|spec| CompiledConstraint::compile(spec, registry))
                .collect::<Result<Vec<_>>>()
        };

        let by_field = profile
            .constraints
            .iter()
            .map(|(field, specs)| Ok((field.clone(), compile_all(specs)?)))
            .collect::<Result<BTreeMap<_, _>>>()?;
        let by_pattern = profile
            .constraint_regexp_map
            .iter()
            .map(|(pattern, specs)| Ok((pattern.compile()?, compile_all(specs)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { by_field, by_pattern })
    }

    /// Per-field lists with pattern-mapped constraints appended
    pub(super) fn expand(&self, working: &Record) -> BTreeMap<String, Vec<CompiledConstraint>> {
        let mut expanded = self.by_field.clone();
        for (regex, constraints) in &self.by_pattern {
            for field in matching_fields(regex, working.keys()) {
                trace!(field = %field, pattern = regex.as_str(), "attaching mapped constraints");
                expanded
                    .entry(field)
                    .or_default()
                    .extend(constraints.iter().cloned());
            }
        }
        expanded
    }
}

/// Which fields take the value a constraint matched
pub(super) struct UntaintPolicy {
    all: bool,
    fields: BTreeSet<String>,
    patterns: Vec<Regex>,
}

impl UntaintPolicy {
    pub(super) fn from_profile(profile: &Profile) -> Result<Self> {
        Ok(Self {
            all: profile.untaint_all_constraints,
            fields: profile.untaint_constraint_fields.iter().cloned().collect(),
            patterns: profile
                .untaint_regexp_map
                .iter()
                .map(|pattern| pattern.compile())
                .collect::<Result<Vec<_>>>()?,
        })
    }

    fn applies(&self, field: &str) -> bool {
        self.all
            || self.fields.contains(field)
            || self.patterns.iter().any(|regex| regex.is_match(field))
    }
}

/// Run every attached constraint; failing fields leave the working set.
///
/// Returns the invalid map: field to failed constraint names in declaration
/// order, each constraint reported at most once however many list elements
/// it rejected. Methods cannot write fields in `classified` or fields already
/// found invalid.
pub(super) fn evaluate_constraints(
    attached: &BTreeMap<String, Vec<CompiledConstraint>>,
    untaint: &UntaintPolicy,
    classified: &BTreeSet<String>,
    input: &dyn InputSource,
    working: &mut Record,
) -> Result<BTreeMap<String, Vec<String>>> {
    let mut invalid = BTreeMap::new();
    let mut closed = classified.clone();

    for (field, constraints) in attached {
        if !working.contains_key(field) {
            continue;
        }
        let untaint_field = untaint.applies(field);
        let mut failures: Vec<String> = Vec::new();

        for constraint in constraints {
            let mut failed_as: Option<String> = None;
            let mut index = 0;

            // the field is re-read for every element; a method may have rewritten it
            while let Some(element) = working.get(field).and_then(|value| value.element(index)) {
                if element.is_empty() {
                    index += 1;
                    continue;
                }
                let element = element.to_string();
                let (verdict, renamed) = constraint.invoke(field, &element, input, &closed, working)?;

                match verdict {
                    Verdict::Matched(replacement) => {
                        if untaint_field {
                            if let Some(value) = working.get_mut(field) {
                                value.set_element(index, replacement);
                            }
                        }
                    }
                    Verdict::Rejected => {
                        trace!(field = %field, constraint = %constraint.name, "constraint rejected value");
                        if failed_as.is_none() {
                            failed_as = Some(renamed.unwrap_or_else(|| constraint.name.clone()));
                        }
                    }
                }
                index += 1;
            }

            failures.extend(failed_as);
        }

        if !failures.is_empty() {
            debug!(field = %field, failures = ?failures, "field invalid");
            working.remove(field);
            closed.insert(field.clone());
            invalid.insert(field.clone(), failures);
        }
    }

    Ok(invalid)
}
