//! Filter resolution and application
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

use crate::callable::FilterFn;
use crate::input::Record;
use crate::pattern::matching_fields;
use crate::profile::{FilterSpec, Profile};
use crate::registry::Registry;
use crate::{FieldValue, Result};
use tracing::trace;

fn resolve(registry: &Registry, specs: &[FilterSpec]) -> Result<Vec<FilterFn>> {
    specs
        .iter()
        .map(|spec| match spec {
            FilterSpec::Named(name) => registry.filter(name),
            FilterSpec::Func(f) => Ok(f.clone()),
        })
        .collect()
}

fn run(filters: &[FilterFn], value: &mut FieldValue) {
    value.map_each(|element| {
        filters
            .iter()
            .fold(element.to_string(), |current, filter| filter(&current))
    });
}

/// Apply unconditional, per-field, then pattern-mapped filters.
///
/// Every filter reference is resolved first, so an unknown filter name fails
/// the evaluation whether or not any field would reach it.
pub(super) fn apply_filters(registry: &Registry, profile: &Profile, working: &mut Record) -> Result<()> {
    let unconditional = resolve(registry, &profile.filters)?;
    let per_field = profile
        .field_filters
        .iter()
        .map(|(field, specs)| Ok((field, resolve(registry, specs)?)))
        .collect::<Result<Vec<_>>>()?;
    let by_pattern = profile
        .field_filter_regexp_map
        .iter()
        .map(|(pattern, specs)| Ok((pattern.compile()?, resolve(registry, specs)?)))
        .collect::<Result<Vec<_>>>()?;

    if !unconditional.is_empty() {
        for value in working.values_mut() {
            run(&unconditional, value);
        }
    }

    for (field, filters) in &per_field {
        if let Some(value) = working.get_mut(field.as_str()) {
            run(filters, value);
        }
    }

    for (regex, filters) in &by_pattern {
        for field in matching_fields(regex, working.keys()) {
            trace!(field = %field, pattern = regex.as_str(), "applying mapped filters");
            if let Some(value) = working.get_mut(&field) {
                run(filters, value);
            }
        }
    }

    Ok(())
}
