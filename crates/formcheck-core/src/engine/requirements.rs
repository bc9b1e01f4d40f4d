//! Required-ness resolution, empties, unknown fields, defaults and missing
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

use crate::input::Record;
use crate::profile::Profile;
use crate::{FieldValue, Result};
use std::collections::BTreeSet;
use tracing::trace;

/// Field sets that decide what is known and what is required
#[derive(Debug, Default)]
pub(super) struct Requirements {
    pub(super) required: BTreeSet<String>,
    pub(super) optional: BTreeSet<String>,
    pub(super) require_some_members: BTreeSet<String>,
}

impl Requirements {
    /// Declared sets plus regexp matches against the post-filter key set
    pub(super) fn resolve(profile: &Profile, working: &Record) -> Result<Self> {
        let mut required: BTreeSet<String> = profile.required.iter().cloned().collect();
        let mut optional: BTreeSet<String> = profile.optional.iter().cloned().collect();

        if let Some(pattern) = &profile.required_regexp {
            required.extend(pattern.matching_fields(working.keys())?);
        }
        if let Some(pattern) = &profile.optional_regexp {
            optional.extend(pattern.matching_fields(working.keys())?);
        }

        let require_some_members = profile
            .require_some
            .values()
            .flat_map(|group| group.members.iter().cloned())
            .collect();

        Ok(Self {
            required,
            optional,
            require_some_members,
        })
    }

    /// Whether a field is declared in any way
    pub(super) fn is_known(&self, field: &str) -> bool {
        self.required.contains(field)
            || self.optional.contains(field)
            || self.require_some_members.contains(field)
    }

    /// Add fields required by present triggers and touched dependency groups
    pub(super) fn add_dependencies(&mut self, profile: &Profile, working: &Record) {
        for (trigger, dependency) in &profile.dependencies {
            let Some(value) = working.get(trigger).filter(|value| !value.is_empty()) else {
                continue;
            };
            let dependents = dependency.triggered_by(value);
            if !dependents.is_empty() {
                trace!(trigger = %trigger, dependents = ?dependents, "dependency triggered");
            }
            self.required.extend(dependents);
        }

        for (group, members) in &profile.dependency_groups {
            let touched = members
                .iter()
                .any(|member| working.get(member).is_some_and(|value| !value.is_empty()));
            if touched {
                trace!(group = %group, "dependency group triggered");
                self.required.extend(members.iter().cloned());
            }
        }
    }
}

/// Drop empty scalars; lists keep their shape with emptied elements left as ""
pub(super) fn strip_empty(working: &mut Record) {
    working.retain(|_, value| match value {
        FieldValue::Scalar(scalar) => !scalar.is_empty(),
        FieldValue::List(values) => !values.is_empty(),
    });
}

/// Remove and return fields the profile does not declare
pub(super) fn partition_unknown(requirements: &Requirements, working: &mut Record) -> BTreeSet<String> {
    let unknown: BTreeSet<String> = working
        .keys()
        .filter(|field| !requirements.is_known(field))
        .cloned()
        .collect();
    for field in &unknown {
        working.remove(field);
    }
    unknown
}

/// Insert defaults for absent fields; unknown fields stay out
pub(super) fn apply_defaults(profile: &Profile, unknown: &BTreeSet<String>, working: &mut Record) {
    for (field, value) in &profile.defaults {
        if !working.contains_key(field) && !unknown.contains(field) {
            working.insert(field.clone(), value.clone());
        }
    }
}

/// Absent required fields, plus the names of unsatisfied require_some groups
pub(super) fn missing_fields(
    profile: &Profile,
    requirements: &Requirements,
    working: &Record,
) -> BTreeSet<String> {
    let mut missing: BTreeSet<String> = requirements
        .required
        .iter()
        .filter(|field| !working.contains_key(*field))
        .cloned()
        .collect();

    for (group, spec) in &profile.require_some {
        let present = spec
            .members
            .iter()
            .filter(|member| working.contains_key(*member))
            .count();
        if present < spec.minimum {
            trace!(group = %group, present, minimum = spec.minimum, "require_some group unsatisfied");
            missing.insert(group.clone());
        }
    }

    missing
}
